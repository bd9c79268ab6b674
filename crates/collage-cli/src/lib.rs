#![forbid(unsafe_code)]

//! Command-line front end for the collage layout engine.

pub mod cli;
pub mod error;

pub use cli::{Cli, Commands, PieceSpec, run, run_from_env};
pub use error::{CliError, Result};
