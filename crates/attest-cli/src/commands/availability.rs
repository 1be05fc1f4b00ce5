//! Availability command implementation.

use super::open_knowledge;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;

/// Execute the availability command.
pub fn execute_availability(config: &Config, formatter: &Formatter) -> Result<()> {
    let base = open_knowledge(config)?;
    println!("{}", formatter.format_availability(&base.availability_report())?);
    Ok(())
}
