// macOS snapshot — walks every visible process's socket fds through libproc.
//
// Processes we are not allowed to inspect are skipped entirely, so their
// sockets do not appear in the snapshot.

use std::ffi::CStr;
use std::mem;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::error::OpfError;
use crate::model::{ConnectionRecord, Owner, Protocol, Snapshot, SocketState};

// libproc constants
const PROC_ALL_PIDS: u32 = 1;
const PROC_PIDLISTFDS: i32 = 1;
const PROC_PIDFDSOCKETINFO: i32 = 3;
const PROX_FDTYPE_SOCKET: u32 = 2;

// Socket families
const AF_INET: i32 = 2;
const AF_INET6: i32 = 30;

// Socket types
const SOCK_STREAM: i32 = 1;
const SOCK_DGRAM: i32 = 2;

// TCP states from the kernel
const TCPS_CLOSED: i32 = 0;
const TCPS_LISTEN: i32 = 1;
const TCPS_SYN_SENT: i32 = 2;
const TCPS_SYN_RECEIVED: i32 = 3;
const TCPS_ESTABLISHED: i32 = 4;
const TCPS_CLOSE_WAIT: i32 = 5;
const TCPS_FIN_WAIT_1: i32 = 6;
const TCPS_CLOSING: i32 = 7;
const TCPS_LAST_ACK: i32 = 8;
const TCPS_FIN_WAIT_2: i32 = 9;
const TCPS_TIME_WAIT: i32 = 10;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct proc_fdinfo {
    proc_fd: i32,
    proc_fdtype: u32,
}

const _: () = assert!(mem::size_of::<proc_fdinfo>() == 8);

#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct proc_fileinfo {
    fi_openflags: u32,
    fi_status: u32,
    fi_offset: i64,
    fi_type: i32,
    fi_guardflags: u32,
}

const _: () = assert!(mem::size_of::<proc_fileinfo>() == 24);

// in_sockinfo — matches macOS <sys/proc_info.h> (80 bytes).
// IPv4 addresses are in in4in6 format: 12 bytes padding + 4 bytes IPv4 address.
#[repr(C)]
#[derive(Clone, Copy)]
struct in_sockinfo {
    insi_fport: i32, // foreign port (network byte order in lower 16 bits)
    insi_lport: i32, // local port (network byte order in lower 16 bits)
    insi_gencnt: u64,
    insi_flags: u32,
    insi_flow: u32,
    insi_vflag: u8,
    insi_ip_ttl: u8,
    _rfu_1: u32,
    insi_faddr: [u8; 16],
    insi_laddr: [u8; 16],
    _tail: [u8; 16],
}

const _: () = assert!(mem::size_of::<in_sockinfo>() == 80);

// tcp_sockinfo — matches macOS <sys/proc_info.h> (120 bytes)
#[repr(C)]
#[derive(Clone, Copy)]
struct tcp_sockinfo {
    tcpsi_ini: in_sockinfo,
    tcpsi_state: i32,
    tcpsi_timer: [i32; 4],
    tcpsi_mss: i32,
    tcpsi_flags: u32,
    _rfu_1: u32,
    tcpsi_tp: u64,
}

const _: () = assert!(mem::size_of::<tcp_sockinfo>() == 120);

#[repr(C)]
#[derive(Clone, Copy)]
struct sockbuf_info {
    sbi_cc: u32,
    sbi_hiwat: u32,
    sbi_mbcnt: u32,
    sbi_mbmax: u32,
    sbi_lowat: u32,
    sbi_flags: i16,
    sbi_timeo: i16,
}

// socket_info — matches macOS <sys/proc_info.h> (768 bytes).
// soi_stat is opaque; soi_proto is the protocol union (528 bytes).
#[repr(C)]
#[derive(Clone, Copy)]
struct socket_info {
    _soi_stat: [u8; 136],
    soi_so: u64,
    soi_pcb: u64,
    soi_type: i32,
    soi_protocol: i32,
    soi_family: i32,
    soi_options: i16,
    soi_linger: i16,
    soi_state: i16,
    soi_qlen: i16,
    soi_incqlen: i16,
    soi_qlimit: i16,
    soi_timeo: i16,
    soi_error: u16,
    soi_oobmark: u32,
    soi_rcv: sockbuf_info,
    soi_snd: sockbuf_info,
    soi_kind: i32,
    _rfu_1: u32,
    soi_proto: [u8; 528],
}

const _: () = assert!(mem::size_of::<socket_info>() == 768);

#[repr(C)]
#[derive(Clone, Copy)]
struct socket_fdinfo {
    pfi: proc_fileinfo,
    psi: socket_info,
}

const _: () = assert!(mem::size_of::<socket_fdinfo>() == 792);

unsafe extern "C" {
    fn proc_listpids(
        type_: u32,
        typeinfo: u32,
        buffer: *mut libc::c_void,
        buffersize: libc::c_int,
    ) -> libc::c_int;

    fn proc_pidinfo(
        pid: libc::c_int,
        flavor: libc::c_int,
        arg: u64,
        buffer: *mut libc::c_void,
        buffersize: libc::c_int,
    ) -> libc::c_int;

    fn proc_pidfdinfo(
        pid: libc::c_int,
        fd: libc::c_int,
        flavor: libc::c_int,
        buffer: *mut libc::c_void,
        buffersize: libc::c_int,
    ) -> libc::c_int;

    fn proc_name(pid: libc::c_int, buffer: *mut libc::c_char, buffersize: u32) -> libc::c_int;
}

pub fn list_connections() -> Result<Snapshot, OpfError> {
    let pids = list_pids()?;
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for pid in pids {
        match list_socket_fds(pid) {
            Ok(fds) => {
                for fd in fds {
                    if let Some(record) = socket_record(pid, fd) {
                        records.push(record);
                    }
                }
            }
            Err(e) => {
                skipped += 1;
                log::debug!("pid {pid}: {e}");
            }
        }
    }

    log::info!(
        "Snapshot: {} sockets, {} processes not inspectable",
        records.len(),
        skipped
    );

    Ok(Snapshot::new(records))
}

fn list_pids() -> Result<Vec<i32>, OpfError> {
    let mut buf_size = 4096 * mem::size_of::<i32>();
    let mut buffer: Vec<i32> = vec![0; buf_size / mem::size_of::<i32>()];

    loop {
        let ret = unsafe {
            proc_listpids(
                PROC_ALL_PIDS,
                0,
                buffer.as_mut_ptr() as *mut libc::c_void,
                buf_size as libc::c_int,
            )
        };

        if ret <= 0 {
            return Err(OpfError::Platform(format!(
                "proc_listpids failed: {}",
                std::io::Error::last_os_error()
            )));
        }

        let count = ret as usize / mem::size_of::<i32>();

        if count >= buffer.len() {
            // Buffer might be too small, double it
            buf_size *= 2;
            buffer.resize(buf_size / mem::size_of::<i32>(), 0);
            continue;
        }

        buffer.truncate(count);
        buffer.retain(|&pid| pid > 0);
        return Ok(buffer);
    }
}

/// Socket file descriptors of `pid`. Fails for processes we may not inspect.
fn list_socket_fds(pid: i32) -> Result<Vec<i32>, OpfError> {
    let buf_size = 4096 * mem::size_of::<proc_fdinfo>();
    let mut buffer: Vec<u8> = vec![0; buf_size];

    let ret = unsafe {
        proc_pidinfo(
            pid,
            PROC_PIDLISTFDS,
            0,
            buffer.as_mut_ptr() as *mut libc::c_void,
            buf_size as libc::c_int,
        )
    };

    if ret <= 0 {
        return Err(OpfError::Libproc(format!(
            "proc_pidinfo(PROC_PIDLISTFDS): {}",
            std::io::Error::last_os_error()
        )));
    }

    let count = ret as usize / mem::size_of::<proc_fdinfo>();
    let fds = (0..count)
        .map(|i| {
            let offset = i * mem::size_of::<proc_fdinfo>();
            unsafe { std::ptr::read_unaligned(buffer[offset..].as_ptr() as *const proc_fdinfo) }
        })
        .filter(|info| info.proc_fdtype == PROX_FDTYPE_SOCKET)
        .map(|info| info.proc_fd)
        .collect();

    Ok(fds)
}

fn socket_record(pid: i32, fd: i32) -> Option<ConnectionRecord> {
    let mut info: socket_fdinfo = unsafe { mem::zeroed() };

    let ret = unsafe {
        proc_pidfdinfo(
            pid,
            fd,
            PROC_PIDFDSOCKETINFO,
            &mut info as *mut _ as *mut libc::c_void,
            mem::size_of::<socket_fdinfo>() as libc::c_int,
        )
    };

    // The socket may have closed since the fd listing.
    if ret <= 0 {
        return None;
    }

    let family = info.psi.soi_family;
    if family != AF_INET && family != AF_INET6 {
        return None;
    }

    let (protocol, inp, tcp_state) = match info.psi.soi_type {
        SOCK_STREAM => {
            let tcp: tcp_sockinfo = unsafe {
                std::ptr::read_unaligned(info.psi.soi_proto.as_ptr() as *const tcp_sockinfo)
            };
            (Protocol::Tcp, tcp.tcpsi_ini, Some(tcp.tcpsi_state))
        }
        SOCK_DGRAM => {
            let inp: in_sockinfo = unsafe {
                std::ptr::read_unaligned(info.psi.soi_proto.as_ptr() as *const in_sockinfo)
            };
            (Protocol::Udp, inp, None)
        }
        _ => return None,
    };

    let (local_ip, local_port) = extract_address(&inp, family, true);
    let (_, remote_port) = extract_address(&inp, family, false);

    let state = match tcp_state {
        Some(s) => tcp_state_to_socket_state(s),
        None if remote_port == 0 => SocketState::Bound,
        None => SocketState::Connected,
    };

    Some(ConnectionRecord {
        protocol,
        local_ip,
        local_port,
        state,
        owner: Owner::Pid(pid as u32),
    })
}

fn extract_address(inp: &in_sockinfo, family: i32, is_local: bool) -> (IpAddr, u16) {
    let port = if is_local {
        u16::from_be(inp.insi_lport as u16)
    } else {
        u16::from_be(inp.insi_fport as u16)
    };

    let addr_bytes = if is_local {
        &inp.insi_laddr
    } else {
        &inp.insi_faddr
    };

    let addr = if family == AF_INET {
        // in4in6 format: IPv4 lives in bytes 12..16
        IpAddr::V4(Ipv4Addr::new(
            addr_bytes[12],
            addr_bytes[13],
            addr_bytes[14],
            addr_bytes[15],
        ))
    } else {
        IpAddr::V6(Ipv6Addr::from(*addr_bytes))
    };

    (addr, port)
}

/// Convert kernel TCP state to our SocketState
fn tcp_state_to_socket_state(state: i32) -> SocketState {
    match state {
        TCPS_CLOSED => SocketState::Closed,
        TCPS_LISTEN => SocketState::Listen,
        TCPS_SYN_SENT => SocketState::SynSent,
        TCPS_SYN_RECEIVED => SocketState::SynReceived,
        TCPS_ESTABLISHED => SocketState::Established,
        TCPS_CLOSE_WAIT => SocketState::CloseWait,
        TCPS_FIN_WAIT_1 => SocketState::FinWait1,
        TCPS_CLOSING => SocketState::Closing,
        TCPS_LAST_ACK => SocketState::LastAck,
        TCPS_FIN_WAIT_2 => SocketState::FinWait2,
        TCPS_TIME_WAIT => SocketState::TimeWait,
        _ => SocketState::Closed,
    }
}

/// Process name via libproc. `None` when the call fails for any reason.
pub(crate) fn process_name(pid: i32) -> Option<String> {
    let mut name_buf = [0u8; 256];
    let ret = unsafe {
        proc_name(
            pid,
            name_buf.as_mut_ptr() as *mut libc::c_char,
            name_buf.len() as u32,
        )
    };
    if ret <= 0 {
        return None;
    }
    let cstr = CStr::from_bytes_until_nul(&name_buf).ok()?;
    Some(cstr.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tcp_state_mapping() {
        assert_eq!(tcp_state_to_socket_state(TCPS_LISTEN), SocketState::Listen);
        assert_eq!(
            tcp_state_to_socket_state(TCPS_ESTABLISHED),
            SocketState::Established
        );
        assert_eq!(tcp_state_to_socket_state(99), SocketState::Closed);
    }

    #[test]
    fn ipv4_address_from_in4in6() {
        let mut inp: in_sockinfo = unsafe { mem::zeroed() };
        inp.insi_laddr[12..16].copy_from_slice(&[127, 0, 0, 1]);
        inp.insi_lport = (8080u16).to_be() as i32;
        let (addr, port) = extract_address(&inp, AF_INET, true);
        assert_eq!(addr, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(port, 8080);
    }

    #[test]
    fn own_process_name_resolves() {
        let pid = std::process::id() as i32;
        assert!(process_name(pid).is_some_and(|n| !n.is_empty()));
    }
}
