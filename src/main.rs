use std::io::{self, Write};

use clap::Parser;

use opf::cli::Cli;
use opf::commands;
use opf::error::OpfError;
use opf::process::SystemProcesses;
use opf::system::SystemConnections;

fn exit_code(err: &OpfError) -> i32 {
    match err {
        OpfError::Platform(_) | OpfError::Procfs(_) | OpfError::Libproc(_) => 1,
        OpfError::Output(_) => 4,
    }
}

fn main() {
    env_logger::init();

    // Argument errors exit here through clap, before any OS access.
    let invocation = Cli::parse().resolve();
    log::debug!("{invocation:?}");

    match run(&invocation) {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(exit_code(&e));
        }
    }
}

fn run(invocation: &opf::cli::Invocation) -> Result<(), OpfError> {
    let mut stdout = io::stdout().lock();
    commands::execute(
        invocation,
        &SystemConnections,
        &SystemProcesses,
        &SystemProcesses,
        &mut stdout,
    )?;
    stdout.flush().map_err(OpfError::Output)
}
