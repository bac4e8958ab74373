//! # gvrs-nx CLI
//!
//! Binary entry point of the `gvrs-nx` command-line tool. It parses the
//! arguments with `clap` and dispatches to a command; the plugins themselves
//! live in the library crate.

mod cli;
mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<ExitCode> {
    let cli = cli::Cli::parse();
    cli.execute()
}
