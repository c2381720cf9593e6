// Connection snapshot provider.
//
// On Linux: reads /proc/net/{tcp,tcp6,udp,udp6} and maps socket inodes to
// pids through /proc/<pid>/fd.
// On macOS: walks every visible process's socket fds through libproc.
//
// Both platforms export:
//   - list_connections() -> Result<Snapshot, OpfError>

pub mod procfs;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "macos")]
pub(crate) mod macos;

use crate::error::OpfError;
use crate::model::Snapshot;

/// Source of point-in-time socket snapshots.
pub trait ConnectionSource {
    fn list_connections(&self) -> Result<Snapshot, OpfError>;
}

/// Snapshot provider backed by the host OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemConnections;

impl ConnectionSource for SystemConnections {
    fn list_connections(&self) -> Result<Snapshot, OpfError> {
        list_connections()
    }
}

#[cfg(target_os = "linux")]
pub fn list_connections() -> Result<Snapshot, OpfError> {
    linux::list_connections()
}

#[cfg(target_os = "macos")]
pub fn list_connections() -> Result<Snapshot, OpfError> {
    macos::list_connections()
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
pub fn list_connections() -> Result<Snapshot, OpfError> {
    Err(OpfError::Platform(format!(
        "unsupported platform: {}",
        std::env::consts::OS
    )))
}
