//! Facts command implementation.

use super::open_knowledge;
use crate::cli::FactsArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use attest_domain::FactKind;

/// Execute the facts command.
pub fn execute_facts(args: FactsArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let kind = args.kind.as_deref().map(parse_kind).transpose()?;

    let base = open_knowledge(config)?;
    let facts = base.snapshot().facts();
    println!("{}", formatter.format_facts(&facts, kind)?);
    Ok(())
}

fn parse_kind(name: &str) -> Result<FactKind> {
    FactKind::parse(name).ok_or_else(|| {
        let known: Vec<&str> = FactKind::ALL.iter().map(|k| k.as_str()).collect();
        CliError::InvalidInput(format!(
            "Unknown fact kind '{}' (expected one of {})",
            name,
            known.join(", ")
        ))
    })
}
