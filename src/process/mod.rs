// Process resolution and termination.
//
// On Linux: names come from /proc/<pid>/comm.
// On macOS: names come from libproc proc_name().
// Termination is kill(2) with SIGKILL on every Unix.

#[cfg(target_os = "linux")]
pub(crate) mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(unix)]
mod signal;

use crate::model::{ProcessLookup, TerminateOutcome};

/// Looks pids up in the live process table.
pub trait ProcessResolver {
    fn resolve(&self, pid: u32) -> ProcessLookup;
}

/// Requests termination of a live process.
pub trait ProcessTerminator {
    fn terminate(&self, pid: u32) -> TerminateOutcome;
}

/// Resolver and terminator backed by the host OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcesses;

impl ProcessResolver for SystemProcesses {
    fn resolve(&self, pid: u32) -> ProcessLookup {
        resolve_process(pid)
    }
}

impl ProcessTerminator for SystemProcesses {
    fn terminate(&self, pid: u32) -> TerminateOutcome {
        terminate(pid)
    }
}

/// Convert a pid to `pid_t`, refusing 0 and values that would wrap negative.
///
/// kill(0, ..) and kill(-n, ..) address process groups, never one process.
pub(crate) fn to_pid_t(pid: u32) -> Option<i32> {
    i32::try_from(pid).ok().filter(|&p| p > 0)
}

#[cfg(target_os = "linux")]
pub fn resolve_process(pid: u32) -> ProcessLookup {
    linux::resolve_process(pid)
}

#[cfg(target_os = "macos")]
pub fn resolve_process(pid: u32) -> ProcessLookup {
    macos::resolve_process(pid)
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
pub fn resolve_process(_pid: u32) -> ProcessLookup {
    ProcessLookup::NotFound
}

#[cfg(unix)]
pub fn terminate(pid: u32) -> TerminateOutcome {
    signal::kill(pid)
}

#[cfg(not(unix))]
pub fn terminate(_pid: u32) -> TerminateOutcome {
    TerminateOutcome::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pid_zero_is_rejected() {
        assert_eq!(to_pid_t(0), None);
    }

    #[test]
    fn pid_beyond_pid_t_is_rejected() {
        assert_eq!(to_pid_t(u32::MAX), None);
        assert_eq!(to_pid_t(i32::MAX as u32 + 1), None);
    }

    #[test]
    fn ordinary_pid_converts() {
        assert_eq!(to_pid_t(4321), Some(4321));
    }

    #[cfg(any(target_os = "linux", target_os = "macos"))]
    #[test]
    fn own_process_resolves() {
        let lookup = resolve_process(std::process::id());
        assert!(matches!(lookup, ProcessLookup::Found(ref name) if !name.is_empty()));
    }

    #[test]
    fn pid_zero_never_resolves() {
        assert_eq!(resolve_process(0), ProcessLookup::NotFound);
    }
}
