//! Command-line surface (§6.1). A plain `clap` derive struct; version printing
//! is handled by hand rather than `clap`'s own `-V` so the flag stays `-v`
//! (see SPEC_FULL.md's REDESIGN FLAGS entry on the `-x`/`-v` disagreement).

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "melon", disable_version_flag = true, about = "An LALR(1) parser table generator.")]
pub struct Cli {
    /// Grammar file to process. Omit only together with -v/--version.
    pub input: Option<PathBuf>,

    /// Print only the basis configurations in the report.
    #[arg(short, long)]
    pub basis: bool,

    /// Disable default-action compression.
    #[arg(short = 'c', long = "compress-disabled")]
    pub compress_disabled: bool,

    /// Directory for the generated parser and report file. Defaults to the
    /// input file's own directory.
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Override the driver template path.
    #[arg(short, long, value_name = "PATH")]
    pub template: Option<PathBuf>,

    /// Suppress non-error log output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the version number and exit.
    #[arg(short = 'v', long = "version")]
    pub version: bool,
}
