// Linux snapshot — reads /proc to build the socket list and its owners.
//
// 1. Parse /proc/net/tcp[6] and /proc/net/udp[6] → rows with socket inodes
// 2. Iterate /proc/<pid>/fd/ → readlink → match "socket:[INODE]" → inode → pid
// 3. Attach the owner to every row: its pid, hidden, or none at all (inode 0)

use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::Path;

use super::procfs::{self, ProcNetEntry};
use crate::error::OpfError;
use crate::model::{Owner, Protocol, Snapshot};

/// Socket tables in snapshot order. The IPv6 tables are absent when the
/// kernel runs without IPv6.
const PROC_NET_TABLES: [(&str, Protocol, bool); 4] = [
    ("/proc/net/tcp", Protocol::Tcp, false),
    ("/proc/net/tcp6", Protocol::Tcp, true),
    ("/proc/net/udp", Protocol::Udp, false),
    ("/proc/net/udp6", Protocol::Udp, true),
];

pub fn list_connections() -> Result<Snapshot, OpfError> {
    let mut entries: Vec<ProcNetEntry> = Vec::new();

    for (path, protocol, is_v6) in PROC_NET_TABLES {
        match fs::read_to_string(path) {
            Ok(content) => entries.extend(procfs::parse_proc_net(&content, protocol, is_v6)),
            Err(e) if is_v6 && e.kind() == io::ErrorKind::NotFound => {
                log::debug!("{path} not present, skipping IPv6 {protocol} sockets");
            }
            Err(e) => return Err(OpfError::Platform(format!("read {path}: {e}"))),
        }
    }

    let wanted: HashSet<u64> = entries
        .iter()
        .map(|e| e.inode)
        .filter(|&inode| inode != 0)
        .collect();
    let owners = map_inodes_to_pids(Path::new("/proc"), &wanted)?;

    let records: Vec<_> = entries
        .into_iter()
        .map(|entry| entry.into_record(&owners))
        .collect();

    let visible = records
        .iter()
        .filter(|r| matches!(r.owner, Owner::Pid(_)))
        .count();
    let unowned = records
        .iter()
        .filter(|r| r.owner == Owner::Unowned)
        .count();
    log::info!(
        "Snapshot: {} sockets, {visible} with a visible owner, {unowned} held by the kernel",
        records.len()
    );

    Ok(Snapshot::new(records))
}

/// Scan `<proc_root>/<pid>/fd/` directories to map socket inodes to pids.
///
/// Pids are visited in ascending order and the first pid holding an inode
/// owns it, so a socket shared across fork() maps to the same pid on every
/// run. Processes whose fd directory is unreadable (other users' processes
/// without privilege) are skipped and their sockets stay hidden.
pub fn map_inodes_to_pids(
    proc_root: &Path,
    wanted: &HashSet<u64>,
) -> Result<HashMap<u64, u32>, OpfError> {
    let mut result = HashMap::new();
    if wanted.is_empty() {
        return Ok(result);
    }

    let mut pids: Vec<u32> = fs::read_dir(proc_root)
        .map_err(OpfError::Procfs)?
        .flatten()
        .filter_map(|entry| entry.file_name().to_str()?.parse().ok())
        .collect();
    pids.sort_unstable();

    let mut unreadable = 0usize;
    for pid in pids {
        let fd_dir = proc_root.join(pid.to_string()).join("fd");

        // May fail with EACCES for other users' processes, or ENOENT if the
        // process exited during the walk.
        let fd_entries = match fs::read_dir(&fd_dir) {
            Ok(d) => d,
            Err(_) => {
                unreadable += 1;
                continue;
            }
        };

        for fd_entry in fd_entries.flatten() {
            let Ok(link) = fs::read_link(fd_entry.path()) else {
                continue;
            };
            if let Some(inode) = procfs::parse_socket_inode(&link.to_string_lossy())
                && wanted.contains(&inode)
            {
                result.entry(inode).or_insert(pid);
            }
        }

        if result.len() == wanted.len() {
            break;
        }
    }

    if unreadable > 0 {
        log::debug!("Skipped {unreadable} processes with unreadable fd tables");
    }

    Ok(result)
}
