use std::net::IpAddr;

use clap::{Args, Parser, Subcommand};

use crate::model::Enrichment;

#[derive(Parser, Debug)]
#[command(name = "opf", version, about = "Finds open ports on your system")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Scans for open ports
    Scan(ScanArgs),
    /// Checks if the given port is open. Prints 1 if it is open, 0 if it is closed.
    Checkport(CheckportArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// IP address to scan
    #[arg(short, long, value_parser = validate_ip)]
    pub ip: Option<IpAddr>,

    /// Check details of the process using the port
    #[arg(short = 'c', long, visible_alias = "checkprocess")]
    pub check_process: bool,

    /// Output the data in JSON format
    #[arg(short, long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CheckportArgs {
    /// IP address to check
    #[arg(short, long, value_parser = validate_ip)]
    pub ip: IpAddr,

    /// Port to check
    #[arg(short, long, value_parser = validate_port)]
    pub port: u16,

    /// Print details of the process using the port
    #[arg(short, long)]
    pub verbose: bool,

    /// Attempt to kill the process using the port. WARNING: This will kill
    /// the process without any confirmation.
    #[arg(short, long)]
    pub kill: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

/// How `checkport` reports its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    /// A bare `1` or `0`.
    Flag,
    /// `Port is open`/`Port is closed` plus owner details.
    Verbose,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    pub ip: Option<IpAddr>,
    pub enrichment: Enrichment,
    pub format: OutputFormat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    pub ip: IpAddr,
    pub port: u16,
    pub report: Report,
    pub kill: bool,
}

/// A fully validated request, ready to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Scan(ScanConfig),
    CheckPort(CheckConfig),
}

fn validate_ip(s: &str) -> Result<IpAddr, String> {
    s.trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a valid IPv4 or IPv6 address"))
}

fn validate_port(s: &str) -> Result<u16, String> {
    s.parse()
        .map_err(|_| format!("'{s}' is not a valid port (0-65535)"))
}

impl Cli {
    /// Resolve the subcommand into its configuration.
    pub fn resolve(self) -> Invocation {
        match self.command {
            Command::Scan(s) => Invocation::Scan(ScanConfig {
                ip: s.ip,
                enrichment: if s.check_process {
                    Enrichment::ProcessNames
                } else {
                    Enrichment::Off
                },
                format: if s.json {
                    OutputFormat::Json
                } else {
                    OutputFormat::Table
                },
            }),
            Command::Checkport(c) => Invocation::CheckPort(CheckConfig {
                ip: c.ip,
                port: c.port,
                report: if c.verbose {
                    Report::Verbose
                } else {
                    Report::Flag
                },
                kill: c.kill,
            }),
        }
    }
}
