//! Profile command implementation.

use super::open_knowledge;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the profile command.
pub fn execute_profile(config: &Config, formatter: &Formatter) -> Result<()> {
    let base = open_knowledge(config)?;
    println!("{}", formatter.format_profile(base.snapshot().profile())?);
    Ok(())
}
