// macOS process names — libproc proc_name(), with kill(pid, 0) to tell a
// vanished process apart from one we may not inspect.

use crate::model::ProcessLookup;
use crate::system::macos::process_name;

pub fn resolve_process(pid: u32) -> ProcessLookup {
    let Some(raw_pid) = super::to_pid_t(pid) else {
        return ProcessLookup::NotFound;
    };

    if let Some(name) = process_name(raw_pid)
        && !name.is_empty()
    {
        return ProcessLookup::Found(name);
    }

    // Signal 0 performs the permission and existence checks only.
    if unsafe { libc::kill(raw_pid, 0) } == 0 {
        return ProcessLookup::AccessDenied;
    }
    match std::io::Error::last_os_error().raw_os_error() {
        Some(libc::EPERM) => ProcessLookup::AccessDenied,
        _ => ProcessLookup::NotFound,
    }
}
