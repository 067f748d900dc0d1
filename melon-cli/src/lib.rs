//! Library half of the `melon` binary: flag parsing, the grammar front end,
//! the emitter, and the pipeline that drives the core crates. Kept separate
//! from `main.rs` so integration tests can exercise a run without spawning
//! a subprocess.

pub mod cli;
pub mod emit;
pub mod frontend;
pub mod pipeline;

use clap::Parser;

/// Runs the whole CLI from parsed arguments (as `main` would from `argv`)
/// and returns the process exit code.
pub fn run_with_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::parse_from(args);
    run(&cli)
}

/// Runs the pipeline for an already-parsed [`cli::Cli`], logging along the
/// way, and returns the process exit code.
pub fn run(cli: &cli::Cli) -> i32 {
    if cli.version {
        println!("melon {}", env!("CARGO_PKG_VERSION"));
        return 0;
    }

    if cli.input.is_none() {
        eprintln!("melon: a grammar file is required unless -v/--version is given");
        return 2;
    }

    match pipeline::run(cli) {
        Ok(summary) => {
            if !cli.quiet {
                if let Some(report_path) = &summary.report_path {
                    log::info!("wrote report to {}", report_path.display());
                }
                log::info!("wrote parser to {}", summary.parser_path.display());
            }
            if summary.error_cnt > 0 {
                eprintln!("melon: {} error(s)", summary.error_cnt);
            }
            if summary.conflict_cnt > 0 {
                eprintln!("melon: {} parsing conflict(s)", summary.conflict_cnt);
            }
            // The exit code is error_cnt + nconflict, clamped to a valid
            // process exit code (values above 255 are an OS limit).
            (summary.error_cnt + summary.conflict_cnt).min(255) as i32
        }
        Err(err) => {
            eprintln!("melon: {err}");
            1
        }
    }
}
