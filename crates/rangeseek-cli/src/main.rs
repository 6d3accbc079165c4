use clap::Parser;
use rangeseek_core::logging;

mod cli;

use crate::cli::Cli;

fn main() {
    let cli = Cli::parse();

    // Fall back to stderr if the state dir is unusable.
    if logging::init_logging(cli.verbose).is_err() {
        logging::init_logging_stderr(cli.verbose);
    }

    if let Err(err) = cli.run() {
        eprintln!("rangeseek error: {:#}", err);
        std::process::exit(1);
    }
}
