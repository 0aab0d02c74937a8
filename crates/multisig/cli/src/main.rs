use colored::Colorize;
use std::process::ExitCode;

fn main() -> ExitCode {
    match multisig_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
