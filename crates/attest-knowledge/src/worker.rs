//! Background worker that keeps the knowledge base current

use crate::base::KnowledgeBase;
use crate::config::KnowledgeConfig;
use std::sync::Arc;
use tokio::time::{interval, Duration};

/// Counters for one worker's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReloadStats {
    /// Change checks performed
    pub checks: u64,
    /// Checks that swapped in a new snapshot
    pub reloads: u64,
}

/// Polls the knowledge source and swaps snapshots when it changes
///
/// # Examples
///
/// ```no_run
/// use attest_knowledge::{KnowledgeBase, KnowledgeConfig, ReloadWorker};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = KnowledgeConfig::default();
///     let kb = Arc::new(KnowledgeBase::open(&config)?);
///     let mut worker = ReloadWorker::new(Arc::clone(&kb), &config);
///
///     // Run until Ctrl+C
///     worker.run().await;
///     Ok(())
/// }
/// ```
pub struct ReloadWorker {
    base: Arc<KnowledgeBase>,
    interval: Duration,
    stats: ReloadStats,
}

impl ReloadWorker {
    /// Create a worker polling at the configured interval
    pub fn new(base: Arc<KnowledgeBase>, config: &KnowledgeConfig) -> Self {
        Self::with_interval(base, config.reload_interval())
    }

    /// Create a worker with an explicit interval
    pub fn with_interval(base: Arc<KnowledgeBase>, interval: Duration) -> Self {
        Self {
            base,
            interval,
            stats: ReloadStats::default(),
        }
    }

    /// Run until a shutdown signal (Ctrl+C) is received
    pub async fn run(&mut self) {
        let mut ticker = interval(self.interval);

        tracing::info!("Reload worker started (interval: {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => self.check(),
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Shutdown signal received, stopping reload worker");
                    break;
                }
            }
        }

        tracing::info!(
            "Reload worker stopped after {} checks ({} reloads)",
            self.stats.checks,
            self.stats.reloads
        );
    }

    /// Run a fixed number of checks
    pub async fn run_cycles(&mut self, cycles: usize) {
        let mut ticker = interval(self.interval);

        for cycle in 0..cycles {
            ticker.tick().await;
            tracing::debug!("Reload check {}/{}", cycle + 1, cycles);
            self.check();
        }
    }

    fn check(&mut self) {
        self.stats.checks += 1;
        if self.base.reload() {
            self.stats.reloads += 1;
        }
    }

    /// Counters so far
    pub fn stats(&self) -> ReloadStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::KnowledgeSource;
    use attest_domain::traits::FactSource;
    use attest_domain::FactKind;
    use std::fs;

    fn base_in(dir: &std::path::Path) -> Arc<KnowledgeBase> {
        fs::write(dir.join("resume.txt"), "SKILLS\nRust\n").unwrap();
        let source = KnowledgeSource::new(dir.join("resume.txt"), dir.join("availability.json"));
        Arc::new(KnowledgeBase::new(source).unwrap())
    }

    #[tokio::test]
    async fn test_run_cycles_without_change() {
        let dir = tempfile::tempdir().unwrap();
        let mut worker = ReloadWorker::with_interval(base_in(dir.path()), Duration::from_millis(5));

        worker.run_cycles(3).await;

        assert_eq!(worker.stats(), ReloadStats { checks: 3, reloads: 0 });
    }

    #[tokio::test]
    async fn test_run_cycles_picks_up_change() {
        let dir = tempfile::tempdir().unwrap();
        let kb = base_in(dir.path());
        let mut worker = ReloadWorker::with_interval(Arc::clone(&kb), Duration::from_millis(5));

        fs::write(dir.path().join("availability.json"), r#"{"status": "available"}"#).unwrap();
        worker.run_cycles(2).await;

        assert_eq!(worker.stats().reloads, 1);
        assert_eq!(kb.version(), 2);
        assert_eq!(kb.fact_set().count(FactKind::Availability), 1);
    }
}
