//! Termination of the process behind a matched connection.

use crate::model::{ConnectionRecord, Owner, TerminateOutcome};
use crate::process::ProcessTerminator;

/// Terminate the owner of `record` without asking for confirmation.
///
/// A record whose owner the OS did not reveal cannot be targeted and is
/// reported as `PermissionDenied`. A socket no process holds has nothing to
/// signal and is reported as `NotFound`. There is no follow-up check that
/// the process actually died.
pub fn terminate_owner(
    record: &ConnectionRecord,
    terminator: &dyn ProcessTerminator,
) -> TerminateOutcome {
    match record.owner {
        Owner::Pid(pid) => terminator.terminate(pid),
        Owner::Hidden => {
            log::info!(
                "No visible owner for {}:{}, cannot terminate",
                record.local_ip,
                record.local_port
            );
            TerminateOutcome::PermissionDenied
        }
        Owner::Unowned => {
            log::info!(
                "{}:{} is held by the kernel in state {}, nothing to terminate",
                record.local_ip,
                record.local_port,
                record.state
            );
            TerminateOutcome::NotFound
        }
    }
}
