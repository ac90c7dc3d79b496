use clap::Parser;
use etfrotor::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
