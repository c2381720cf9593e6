// Linux process names — read from /proc/<pid>/comm.

use std::fs;
use std::io;
use std::path::Path;

use crate::model::ProcessLookup;

pub fn resolve_process(pid: u32) -> ProcessLookup {
    if super::to_pid_t(pid).is_none() {
        return ProcessLookup::NotFound;
    }
    read_comm(Path::new("/proc"), pid)
}

/// Read `<proc_root>/<pid>/comm`.
///
/// A process that exited since the snapshot has no /proc entry and reports
/// NotFound. With `hidepid` mounts the entry is unreadable: AccessDenied.
pub(crate) fn read_comm(proc_root: &Path, pid: u32) -> ProcessLookup {
    let path = proc_root.join(pid.to_string()).join("comm");
    match fs::read_to_string(&path) {
        Ok(s) => ProcessLookup::Found(s.trim().to_string()),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => ProcessLookup::AccessDenied,
        Err(e) => {
            if e.kind() != io::ErrorKind::NotFound {
                log::debug!("{}: {e}", path.display());
            }
            ProcessLookup::NotFound
        }
    }
}
