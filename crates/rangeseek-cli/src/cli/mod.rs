//! CLI for rangeseek.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use rangeseek_core::config;

use commands::{run_checksum, run_completions, run_probe, run_read, RangeArgs};

/// Top-level CLI for rangeseek.
#[derive(Debug, Parser)]
#[command(name = "rangeseek")]
#[command(about = "Random access to remote HTTP resources via range requests", long_about = None)]
pub struct Cli {
    /// Trace-level logging for rangeseek (ignored when RUST_LOG is set).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Probe a URL: size, validator and the first bytes.
    Probe {
        /// Direct HTTP/HTTPS URL.
        url: String,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Copy a byte range of the resource to stdout.
    Read {
        #[command(flatten)]
        range: RangeArgs,
    },

    /// Compute SHA-256 of a byte range of the resource.
    Checksum {
        #[command(flatten)]
        range: RangeArgs,
    },

    /// Print a shell completion script.
    Completions {
        shell: Shell,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        if let CliCommand::Completions { shell } = self.command {
            return run_completions(shell);
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match self.command {
            CliCommand::Probe { url, json } => run_probe(&cfg, &url, json)?,
            CliCommand::Read { range } => run_read(&cfg, &range)?,
            CliCommand::Checksum { range } => run_checksum(&cfg, &range)?,
            CliCommand::Completions { .. } => {}
        }

        Ok(())
    }
}
