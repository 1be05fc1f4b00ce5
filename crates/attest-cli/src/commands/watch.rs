//! Watch command implementation.

use super::open_knowledge;
use crate::cli::WatchArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use attest_knowledge::ReloadWorker;
use std::sync::Arc;
use std::time::Duration;

/// Execute the watch command.
pub async fn execute_watch(args: WatchArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let interval = match args.interval {
        Some(0) => {
            return Err(CliError::InvalidInput(
                "Interval must be greater than 0".to_string(),
            ))
        }
        Some(secs) => Duration::from_secs(secs),
        None => config.knowledge.reload_interval(),
    };

    let base = Arc::new(open_knowledge(config)?);
    println!(
        "{}",
        formatter.info(&format!(
            "Watching {} and {} every {}s ({} facts loaded)",
            config.knowledge.resume_path.display(),
            config.knowledge.availability_path.display(),
            interval.as_secs(),
            base.snapshot().facts().len()
        ))
    );

    let mut worker = ReloadWorker::with_interval(Arc::clone(&base), interval);
    match args.cycles {
        Some(cycles) => worker.run_cycles(cycles).await,
        None => worker.run().await,
    }

    println!("{}", formatter.reload_summary(worker.stats(), base.version()));
    Ok(())
}
