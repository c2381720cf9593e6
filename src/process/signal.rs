use crate::model::TerminateOutcome;

/// Send SIGKILL to `pid`.
///
/// Best effort: success means the kernel accepted the signal, not that the
/// process is gone.
pub fn kill(pid: u32) -> TerminateOutcome {
    let Some(raw_pid) = super::to_pid_t(pid) else {
        log::warn!("Refusing to signal pid {pid}");
        return TerminateOutcome::NotFound;
    };

    if unsafe { libc::kill(raw_pid, libc::SIGKILL) } == 0 {
        log::info!("Sent SIGKILL to pid {pid}");
        return TerminateOutcome::Terminated;
    }

    let err = std::io::Error::last_os_error();
    match err.raw_os_error() {
        Some(libc::EPERM) => {
            log::info!("SIGKILL to pid {pid} refused: {err}");
            TerminateOutcome::PermissionDenied
        }
        Some(libc::ESRCH) => TerminateOutcome::NotFound,
        _ => {
            log::warn!("kill({pid}, SIGKILL) failed: {err}");
            TerminateOutcome::NotFound
        }
    }
}
