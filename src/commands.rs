//! One function per subcommand.
//!
//! Each takes its validated configuration plus the OS collaborators, so the
//! whole command path runs against fakes in tests.

use std::io::Write;

use crate::action;
use crate::cli::{CheckConfig, Invocation, Report, ScanConfig};
use crate::error::OpfError;
use crate::model::{Owner, TerminateOutcome};
use crate::output;
use crate::pipeline;
use crate::process::{ProcessResolver, ProcessTerminator};
use crate::system::ConnectionSource;

pub const PERMISSION_DENIED_MSG: &str = "You do not have permission to kill this process";
pub const NO_OWNER_MSG: &str = "No process owns this socket";

fn pid_label(owner: Owner) -> String {
    owner.pid().map_or_else(|| "-".to_string(), |p| p.to_string())
}

/// Run a resolved invocation against the given collaborators.
pub fn execute(
    invocation: &Invocation,
    source: &dyn ConnectionSource,
    resolver: &dyn ProcessResolver,
    terminator: &dyn ProcessTerminator,
    writer: &mut impl Write,
) -> Result<(), OpfError> {
    match invocation {
        Invocation::Scan(config) => run_scan(config, source, resolver, writer),
        Invocation::CheckPort(config) => {
            run_checkport(config, source, resolver, terminator, writer)
        }
    }
}

/// `opf scan`: list open ports, optionally filtered and enriched.
pub fn run_scan(
    config: &ScanConfig,
    source: &dyn ConnectionSource,
    resolver: &dyn ProcessResolver,
    writer: &mut impl Write,
) -> Result<(), OpfError> {
    let snapshot = source.list_connections()?;
    let result = pipeline::scan(&snapshot, config.ip, config.enrichment, resolver);
    log::debug!(
        "scan: {} of {} sockets retained",
        result.len(),
        snapshot.len()
    );
    output::write_scan(&result, config.format, writer)
}

/// `opf checkport`: report whether ip:port is bound, and optionally kill
/// its owner.
pub fn run_checkport(
    config: &CheckConfig,
    source: &dyn ConnectionSource,
    resolver: &dyn ProcessResolver,
    terminator: &dyn ProcessTerminator,
    writer: &mut impl Write,
) -> Result<(), OpfError> {
    let snapshot = source.list_connections()?;
    let found = pipeline::check(&snapshot, config.ip, config.port);
    if let Some(record) = found {
        log::debug!(
            "checkport: {} {}:{} {} owner {:?}",
            record.protocol,
            record.local_ip,
            record.local_port,
            record.state,
            record.owner
        );
    }

    match (config.report, found) {
        (Report::Flag, found) => {
            writeln!(writer, "{}", u8::from(found.is_some())).map_err(OpfError::Output)?;
        }
        (Report::Verbose, Some(record)) => {
            let owner = pipeline::lookup_owner(record, resolver);
            writeln!(writer, "Port is open").map_err(OpfError::Output)?;
            writeln!(
                writer,
                "IP: {}  Port: {}  PID: {}  Process Name: {}",
                record.local_ip,
                record.local_port,
                pid_label(record.owner),
                owner.verbose_name()
            )
            .map_err(OpfError::Output)?;
        }
        (Report::Verbose, None) => {
            writeln!(writer, "Port is closed").map_err(OpfError::Output)?;
        }
    }

    // Killing a closed port is a silent no-op.
    if let (true, Some(record)) = (config.kill, found) {
        let outcome = action::terminate_owner(record, terminator);
        let pid = pid_label(record.owner);
        match (outcome, record.owner) {
            (TerminateOutcome::Terminated, _) if config.report == Report::Verbose => {
                writeln!(writer, "Killed process {pid}").map_err(OpfError::Output)?;
            }
            (TerminateOutcome::Terminated, _) => {}
            (TerminateOutcome::PermissionDenied, _) => {
                writeln!(writer, "{PERMISSION_DENIED_MSG}").map_err(OpfError::Output)?;
            }
            (TerminateOutcome::NotFound, Owner::Unowned) => {
                writeln!(writer, "{NO_OWNER_MSG}").map_err(OpfError::Output)?;
            }
            (TerminateOutcome::NotFound, _) => {
                writeln!(writer, "Process {pid} already exited").map_err(OpfError::Output)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::model::{
        ConnectionRecord, Enrichment, ProcessLookup, Protocol, Snapshot, SocketState,
    };
    use std::net::{IpAddr, Ipv4Addr};

    struct FixedSource(Vec<ConnectionRecord>);

    impl ConnectionSource for FixedSource {
        fn list_connections(&self) -> Result<Snapshot, OpfError> {
            Ok(Snapshot::new(self.0.clone()))
        }
    }

    struct FailingSource;

    impl ConnectionSource for FailingSource {
        fn list_connections(&self) -> Result<Snapshot, OpfError> {
            Err(OpfError::Platform("sandboxed".to_string()))
        }
    }

    struct FakeProcesses;

    impl ProcessResolver for FakeProcesses {
        fn resolve(&self, pid: u32) -> ProcessLookup {
            match pid {
                100 => ProcessLookup::Found("web".to_string()),
                200 => ProcessLookup::AccessDenied,
                _ => ProcessLookup::NotFound,
            }
        }
    }

    impl ProcessTerminator for FakeProcesses {
        fn terminate(&self, pid: u32) -> TerminateOutcome {
            match pid {
                100 => TerminateOutcome::Terminated,
                200 => TerminateOutcome::PermissionDenied,
                _ => TerminateOutcome::NotFound,
            }
        }
    }

    fn rec(ip: [u8; 4], port: u16, state: SocketState, owner: Owner) -> ConnectionRecord {
        ConnectionRecord {
            protocol: Protocol::Tcp,
            local_ip: IpAddr::V4(Ipv4Addr::from(ip)),
            local_port: port,
            state,
            owner,
        }
    }

    fn source() -> FixedSource {
        use SocketState::{Listen, TimeWait};
        FixedSource(vec![
            rec([127, 0, 0, 1], 8080, Listen, Owner::Pid(100)),
            rec([10, 0, 0, 1], 22, Listen, Owner::Pid(200)),
            rec([10, 0, 0, 1], 22, Listen, Owner::Pid(100)),
            rec([10, 0, 0, 2], 53, Listen, Owner::Pid(300)),
            rec([127, 0, 0, 1], 46033, TimeWait, Owner::Unowned),
            rec([10, 0, 0, 3], 631, Listen, Owner::Hidden),
        ])
    }

    fn check(ip: [u8; 4], port: u16, report: Report, kill: bool) -> String {
        let config = CheckConfig {
            ip: IpAddr::V4(Ipv4Addr::from(ip)),
            port,
            report,
            kill,
        };
        let mut buf = Vec::new();
        run_checkport(&config, &source(), &FakeProcesses, &FakeProcesses, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn checkport_flag_open_and_closed() {
        assert_eq!(check([127, 0, 0, 1], 8080, Report::Flag, false), "1\n");
        assert_eq!(check([1, 2, 3, 4], 9999, Report::Flag, false), "0\n");
    }

    #[test]
    fn checkport_verbose_closed() {
        assert_eq!(
            check([1, 2, 3, 4], 9999, Report::Verbose, false),
            "Port is closed\n"
        );
    }

    #[test]
    fn checkport_verbose_open_names_owner() {
        assert_eq!(
            check([127, 0, 0, 1], 8080, Report::Verbose, false),
            "Port is open\nIP: 127.0.0.1  Port: 8080  PID: 100  Process Name: web\n"
        );
    }

    #[test]
    fn checkport_verbose_uses_first_duplicate_and_shows_denial() {
        assert_eq!(
            check([10, 0, 0, 1], 22, Report::Verbose, false),
            "Port is open\nIP: 10.0.0.1  Port: 22  PID: 200  Process Name: access denied\n"
        );
    }

    #[test]
    fn checkport_kill_permission_denied_is_reported() {
        assert_eq!(
            check([10, 0, 0, 1], 22, Report::Flag, true),
            "1\nYou do not have permission to kill this process\n"
        );
    }

    #[test]
    fn checkport_kill_success_is_quiet_unless_verbose() {
        assert_eq!(check([127, 0, 0, 1], 8080, Report::Flag, true), "1\n");
        let verbose = check([127, 0, 0, 1], 8080, Report::Verbose, true);
        assert!(verbose.ends_with("Killed process 100\n"));
    }

    #[test]
    fn checkport_kill_vanished_process() {
        assert_eq!(
            check([10, 0, 0, 2], 53, Report::Flag, true),
            "1\nProcess 300 already exited\n"
        );
    }

    #[test]
    fn checkport_verbose_owner_exited_after_snapshot() {
        assert_eq!(
            check([10, 0, 0, 2], 53, Report::Verbose, false),
            "Port is open\nIP: 10.0.0.2  Port: 53  PID: 300  Process Name: unknown\n"
        );
    }

    #[test]
    fn checkport_time_wait_socket_has_no_owner() {
        assert_eq!(
            check([127, 0, 0, 1], 46033, Report::Verbose, true),
            "Port is open\n\
             IP: 127.0.0.1  Port: 46033  PID: -  Process Name: unknown\n\
             No process owns this socket\n"
        );
        assert_eq!(
            check([127, 0, 0, 1], 46033, Report::Flag, true),
            "1\nNo process owns this socket\n"
        );
    }

    #[test]
    fn checkport_hidden_owner_is_access_denied() {
        assert_eq!(
            check([10, 0, 0, 3], 631, Report::Verbose, true),
            "Port is open\n\
             IP: 10.0.0.3  Port: 631  PID: -  Process Name: access denied\n\
             You do not have permission to kill this process\n"
        );
    }

    #[test]
    fn checkport_kill_closed_port_is_noop() {
        assert_eq!(check([1, 2, 3, 4], 9999, Report::Flag, true), "0\n");
    }

    #[test]
    fn scan_reports_total() {
        let config = ScanConfig {
            ip: Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1))),
            enrichment: Enrichment::Off,
            format: OutputFormat::Table,
        };
        let mut buf = Vec::new();
        run_scan(&config, &source(), &FakeProcesses, &mut buf).unwrap();
        let output = String::from_utf8(buf).unwrap();
        assert!(output.ends_with("Total open ports: 2\n"));
    }

    #[test]
    fn platform_error_aborts() {
        let invocation = Invocation::Scan(ScanConfig {
            ip: None,
            enrichment: Enrichment::Off,
            format: OutputFormat::Table,
        });
        let mut buf = Vec::new();
        let result = execute(
            &invocation,
            &FailingSource,
            &FakeProcesses,
            &FakeProcesses,
            &mut buf,
        );
        assert!(matches!(result, Err(OpfError::Platform(_))));
        assert!(buf.is_empty());
    }
}
