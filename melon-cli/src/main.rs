//! Command-line entry point: parses flags, runs the pipeline, and maps the
//! result to a process exit code — 0 on a clean run, 1 on any grammar error
//! or unresolved conflict, matching the original tool's `melon->error_cnt`
//! gate in `main.c`.

use clap::Parser;
use melon_cli::cli::Cli;

fn main() {
    let cli = Cli::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Error);
    }
    builder.init();

    std::process::exit(melon_cli::run(&cli));
}
