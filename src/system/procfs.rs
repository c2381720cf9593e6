//! Parsers for the Linux `/proc/net/{tcp,tcp6,udp,udp6}` tables.
//!
//! These operate on strings only, so they compile and are tested on every
//! platform even though only the Linux provider reads real procfs files.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::model::{ConnectionRecord, Owner, Protocol, SocketState};

/// One row of a `/proc/net/*` socket table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcNetEntry {
    pub protocol: Protocol,
    pub local_addr: IpAddr,
    pub local_port: u16,
    pub state: SocketState,
    /// 0 when no process holds the socket (e.g. TIME_WAIT).
    pub inode: u64,
}

impl ProcNetEntry {
    /// Attach the owner found by the fd walk in `owners` (inode → pid).
    pub fn into_record(self, owners: &HashMap<u64, u32>) -> ConnectionRecord {
        let owner = owner_of(self.inode, owners);
        ConnectionRecord {
            protocol: self.protocol,
            local_ip: self.local_addr,
            local_port: self.local_port,
            state: self.state,
            owner,
        }
    }
}

/// Inode 0 means the kernel holds the socket itself. A non-zero inode that
/// no readable fd table references belongs to a process we cannot see.
pub fn owner_of(inode: u64, owners: &HashMap<u64, u32>) -> Owner {
    if inode == 0 {
        return Owner::Unowned;
    }
    owners.get(&inode).map_or(Owner::Hidden, |&pid| Owner::Pid(pid))
}

/// Parse the content of a /proc/net/* file (tcp, tcp6, udp, udp6).
///
/// Each line after the header has the format:
///   sl  local_address rem_address st tx_queue:rx_queue ... inode ...
///
/// Fields are whitespace-separated. We need fields 1 (local), 2 (remote),
/// 3 (state) and 9 (inode). Malformed rows are skipped.
pub fn parse_proc_net(content: &str, protocol: Protocol, is_v6: bool) -> Vec<ProcNetEntry> {
    let parse_addr = if is_v6 { parse_addr_v6 } else { parse_addr_v4 };
    let mut entries = Vec::new();

    for line in content.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 10 {
            continue;
        }

        let Some((local_addr, local_port)) = parse_addr(fields[1]) else {
            continue;
        };
        let Some((_, remote_port)) = parse_addr(fields[2]) else {
            continue;
        };
        let Ok(hex_state) = u8::from_str_radix(fields[3], 16) else {
            continue;
        };
        let Ok(inode) = fields[9].parse::<u64>() else {
            continue;
        };

        let state = match protocol {
            Protocol::Tcp => tcp_state_from_hex(hex_state),
            Protocol::Udp => udp_state(remote_port),
        };

        entries.push(ProcNetEntry {
            protocol,
            local_addr,
            local_port,
            state,
            inode,
        });
    }

    entries
}

/// Parse an IPv4 address from /proc/net/tcp format: "AABBCCDD:PORT"
///
/// The hex address is in host byte order (little-endian on x86/ARM).
pub fn parse_addr_v4(s: &str) -> Option<(IpAddr, u16)> {
    let (addr_hex, port_hex) = s.split_once(':')?;
    if addr_hex.len() != 8 {
        return None;
    }
    let raw = u32::from_str_radix(addr_hex, 16).ok()?;
    // The kernel prints the raw in-memory word, so native byte order recovers
    // the network-order octets.
    let ip = Ipv4Addr::from(raw.to_ne_bytes());
    let port = u16::from_str_radix(port_hex, 16).ok()?;
    Some((IpAddr::V4(ip), port))
}

/// Parse an IPv6 address from /proc/net/tcp6 format: "00000000000000000000000001000000:PORT"
///
/// The 32-char hex is 4 groups of 8 chars, each in host byte order.
pub fn parse_addr_v6(s: &str) -> Option<(IpAddr, u16)> {
    let (addr_hex, port_hex) = s.split_once(':')?;
    if addr_hex.len() != 32 {
        return None;
    }
    let port = u16::from_str_radix(port_hex, 16).ok()?;

    let mut octets = [0u8; 16];
    for (i, group) in octets.chunks_exact_mut(4).enumerate() {
        let chunk = addr_hex.get(i * 8..(i + 1) * 8)?;
        let raw = u32::from_str_radix(chunk, 16).ok()?;
        group.copy_from_slice(&raw.to_ne_bytes());
    }

    Some((IpAddr::V6(Ipv6Addr::from(octets)), port))
}

/// Parse a readlink result like "socket:[12345]" → Some(12345)
pub fn parse_socket_inode(link: &str) -> Option<u64> {
    let s = link.strip_prefix("socket:[")?;
    let s = s.strip_suffix(']')?;
    s.parse().ok()
}

/// Convert a Linux /proc/net/tcp hex state to a `SocketState`.
///
/// State values from include/net/tcp_states.h:
///   01=ESTABLISHED, 02=SYN_SENT, 03=SYN_RECV, 04=FIN_WAIT1,
///   05=FIN_WAIT2, 06=TIME_WAIT, 07=CLOSE, 08=CLOSE_WAIT,
///   09=LAST_ACK, 0A=LISTEN, 0B=CLOSING
pub fn tcp_state_from_hex(hex_state: u8) -> SocketState {
    match hex_state {
        0x01 => SocketState::Established,
        0x02 => SocketState::SynSent,
        0x03 => SocketState::SynReceived,
        0x04 => SocketState::FinWait1,
        0x05 => SocketState::FinWait2,
        0x06 => SocketState::TimeWait,
        0x07 => SocketState::Closed,
        0x08 => SocketState::CloseWait,
        0x09 => SocketState::LastAck,
        0x0A => SocketState::Listen,
        0x0B => SocketState::Closing,
        _ => SocketState::Closed,
    }
}

/// UDP sockets have no real state machine; a connected socket has a peer port.
pub fn udp_state(remote_port: u16) -> SocketState {
    if remote_port == 0 {
        SocketState::Bound
    } else {
        SocketState::Connected
    }
}
