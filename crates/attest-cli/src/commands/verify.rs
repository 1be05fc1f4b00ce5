//! Verify-employment command implementation.

use super::open_knowledge;
use crate::cli::VerifyEmploymentArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use attest_gatekeeper::Governor;

/// Execute the verify-employment command.
pub fn execute_verify_employment(
    args: VerifyEmploymentArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    if args.employer.trim().is_empty() {
        return Err(CliError::InvalidInput("Employer name is empty".to_string()));
    }

    let base = open_knowledge(config)?;
    let facts = base.snapshot().facts();
    let governor = Governor::new(config.governance.clone())?;

    let check = governor.verify_employment(
        &args.employer,
        args.role.as_deref(),
        args.dates.as_deref(),
        &facts,
    );
    println!("{}", formatter.format_employment(&check)?);
    Ok(())
}
