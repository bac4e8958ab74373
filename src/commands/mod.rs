//! # CLI Command Implementations
//!
//! Each subcommand of `gvrs-nx` lives in its own file, with an `Args` struct
//! derived with `clap` and an `execute` function that calls into the
//! `gvrs_nx` library and maps the outcome to an exit code.

pub mod completions;
pub mod preset;
pub mod publint;
