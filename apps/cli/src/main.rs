//! Sensebound CLI — dictionary-page sense extraction tool.
//!
//! Extracts part-of-speech entries, numbered senses, and usage examples
//! from rendered dictionary HTML, and compares runs for regressions.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
