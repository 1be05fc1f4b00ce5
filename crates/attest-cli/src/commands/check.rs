//! Check command implementation.

use super::open_knowledge;
use crate::cli::CheckArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use attest_gatekeeper::Governor;
use std::fs;
use std::io;

/// Execute the check command.
pub fn execute_check(args: CheckArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let response = match &args.response {
        Some(path) => fs::read_to_string(path)?,
        None => io::read_to_string(io::stdin())?,
    };

    println!("{}", check_report(&args.query, &response, config, formatter)?);
    Ok(())
}

/// Run `response` through the pipeline and render the evaluation.
pub fn check_report(
    query: &str,
    response: &str,
    config: &Config,
    formatter: &Formatter,
) -> Result<String> {
    if response.trim().is_empty() {
        return Err(CliError::InvalidInput("Response text is empty".to_string()));
    }

    let base = open_knowledge(config)?;
    let snapshot = base.snapshot();
    let facts = snapshot.facts();
    let governor = Governor::new(config.governance.clone())?;

    let evaluation = governor.evaluate(query, response, &facts);
    formatter.format_evaluation(&evaluation)
}
