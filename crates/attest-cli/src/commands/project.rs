//! Project command implementation.

use super::open_knowledge;
use crate::cli::ProjectArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use attest_knowledge::audit_project;

/// Execute the project command.
pub fn execute_project(args: ProjectArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    if args.name.trim().is_empty() {
        return Err(CliError::InvalidInput("Project name is empty".to_string()));
    }

    let base = open_knowledge(config)?;
    let audit = audit_project(base.snapshot().profile(), &args.name);
    println!("{}", formatter.format_project(&audit)?);
    Ok(())
}
