use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::common::{LogArgs, Result};

/// Kinto transaction admission tool
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct MainCmd {
    /// The command to run
    #[command(subcommand)]
    pub command: Command,

    /// Logging configuration
    #[command(flatten)]
    pub log_args: LogArgs,
}

/// Subcommands of the kinto-admit CLI tool
#[derive(Subcommand, Debug)]
#[command(infer_subcommands = true)]
pub enum Command {
    /// Decide whether a transaction is admitted at a block height
    Check(crate::check::Cmd),
    /// Print the epoch table of a network configuration
    Schedule(crate::schedule::Cmd),
}

impl MainCmd {
    /// Execute the main command. A rejected transaction exits with code 1.
    pub fn run(&self) -> Result<ExitCode> {
        self.log_args.init()?;
        match &self.command {
            Command::Check(cmd) => {
                let decision = cmd.run()?;
                Ok(if decision.is_allowed() { ExitCode::SUCCESS } else { ExitCode::FAILURE })
            }
            Command::Schedule(cmd) => {
                cmd.run()?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}
