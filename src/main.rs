use clap::Parser;
use std::process::ExitCode;

use renewalradar::cli::{Cli, error::error_line};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version also arrive here
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(err) = renewalradar::run(cli) {
        eprintln!("{}", error_line(&err));
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
