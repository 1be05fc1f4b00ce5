//! Attest CLI library.
//!
//! Operator front-end for the governance layer: loads the résumé and
//! availability record, runs model responses through the pipeline and
//! renders facts, profiles and audit trails as tables or JSON.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;

pub use cli::{Cli, Command};
pub use config::{Config, OutputFormat};
pub use error::{CliError, Result};
pub use output::Formatter;
