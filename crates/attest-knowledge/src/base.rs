//! Shared, versioned knowledge snapshots
//!
//! Readers take an `Arc<Snapshot>` and keep it for as long as they need a
//! consistent view. A reload builds a complete new snapshot first and only
//! then swaps the shared pointer; an existing snapshot is never modified.

use crate::availability::{Availability, AvailabilityReport};
use crate::config::KnowledgeConfig;
use crate::error::{KnowledgeError, Result};
use crate::extractor::{facts_from, Extractor};
use crate::profile::Profile;
use attest_domain::traits::FactSource;
use attest_domain::FactSet;
use chrono::{DateTime, Utc};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Raw contents read from the knowledge source files
#[derive(Debug, Clone, PartialEq)]
pub struct SourceContents {
    /// Résumé text; `None` when unavailable
    pub resume: Option<String>,
    /// Parsed availability record
    pub availability: Availability,
    /// Hash of the raw bytes of both files
    pub fingerprint: u64,
}

/// The résumé and availability files backing a knowledge base
#[derive(Debug, Clone)]
pub struct KnowledgeSource {
    resume_path: PathBuf,
    availability_path: PathBuf,
    max_bytes: u64,
}

impl KnowledgeSource {
    /// Create a source from explicit paths
    pub fn new(resume_path: impl Into<PathBuf>, availability_path: impl Into<PathBuf>) -> Self {
        Self {
            resume_path: resume_path.into(),
            availability_path: availability_path.into(),
            max_bytes: KnowledgeConfig::default().max_source_bytes,
        }
    }

    /// Create a source from configuration
    pub fn from_config(config: &KnowledgeConfig) -> Self {
        Self {
            resume_path: config.resume_path.clone(),
            availability_path: config.availability_path.clone(),
            max_bytes: config.max_source_bytes,
        }
    }

    /// Résumé path
    pub fn resume_path(&self) -> &Path {
        &self.resume_path
    }

    /// Availability record path
    pub fn availability_path(&self) -> &Path {
        &self.availability_path
    }

    /// Read both files
    ///
    /// Never fails: an unreadable résumé becomes `None` (degrade mode) and an
    /// unreadable availability record becomes unknown. Problems are logged.
    pub fn read(&self) -> SourceContents {
        let resume = match self.read_file(&self.resume_path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Knowledge source unavailable: {}", e);
                None
            }
        };
        let availability_raw = match self.read_file(&self.availability_path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Availability record unavailable: {}", e);
                None
            }
        };
        let availability = match &availability_raw {
            Some(json) => Availability::from_json_or_unknown(json),
            None => Availability::unknown(),
        };

        let mut hasher = DefaultHasher::new();
        resume.hash(&mut hasher);
        availability_raw.hash(&mut hasher);

        SourceContents {
            resume,
            availability,
            fingerprint: hasher.finish(),
        }
    }

    /// `Ok(None)` for a missing file, `Err` for anything else that went wrong
    fn read_file(&self, path: &Path) -> Result<Option<String>> {
        let size = match std::fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(KnowledgeError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        if size > self.max_bytes {
            return Err(KnowledgeError::TooLarge {
                path: path.to_path_buf(),
                size,
                max: self.max_bytes,
            });
        }
        std::fs::read_to_string(path)
            .map(Some)
            .map_err(|source| KnowledgeError::Read {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// One immutable version of the knowledge source
#[derive(Debug)]
pub struct Snapshot {
    version: u64,
    loaded_at: DateTime<Utc>,
    fingerprint: u64,
    profile: Profile,
    availability: Availability,
    facts: Arc<FactSet>,
}

impl Snapshot {
    /// Build a snapshot from raw contents
    pub fn build(extractor: &Extractor, contents: SourceContents, version: u64) -> Self {
        let profile = contents
            .resume
            .as_deref()
            .map(|text| extractor.extract_profile(text))
            .unwrap_or_default();
        let facts = facts_from(&profile, &contents.availability);

        Self {
            version,
            loaded_at: Utc::now(),
            fingerprint: contents.fingerprint,
            profile,
            availability: contents.availability,
            facts: Arc::new(facts),
        }
    }

    /// Monotonic version, starting at 1
    pub fn version(&self) -> u64 {
        self.version
    }

    /// When the snapshot was built
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Structured profile
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Availability record
    pub fn availability(&self) -> &Availability {
        &self.availability
    }

    /// Shared handle to the fact set
    pub fn facts(&self) -> Arc<FactSet> {
        Arc::clone(&self.facts)
    }
}

/// Process-wide knowledge shared by every session
///
/// # Examples
///
/// ```no_run
/// use attest_knowledge::{KnowledgeBase, KnowledgeConfig};
///
/// let kb = KnowledgeBase::open(&KnowledgeConfig::default()).unwrap();
/// let snapshot = kb.snapshot();
/// println!("v{}: {} facts", snapshot.version(), snapshot.facts().len());
///
/// // Later, after the résumé changed on disk
/// if kb.reload() {
///     println!("now at v{}", kb.version());
/// }
/// ```
pub struct KnowledgeBase {
    source: KnowledgeSource,
    extractor: Extractor,
    default_timezone: String,
    current: RwLock<Arc<Snapshot>>,
}

impl KnowledgeBase {
    /// Load the knowledge source described by `config`
    ///
    /// A missing résumé is not an error; the base starts with an empty fact
    /// set and the policy engine runs in degrade mode.
    pub fn open(config: &KnowledgeConfig) -> Result<Self> {
        config.validate().map_err(KnowledgeError::Config)?;
        let mut kb = Self::new(KnowledgeSource::from_config(config))?;
        kb.default_timezone = config.default_timezone.clone();
        Ok(kb)
    }

    /// Load from an explicit source with default settings
    pub fn new(source: KnowledgeSource) -> Result<Self> {
        let extractor = Extractor::new()?;
        let first = Snapshot::build(&extractor, source.read(), 1);
        tracing::info!(
            "Knowledge base loaded from {} ({} facts)",
            source.resume_path().display(),
            first.facts.len()
        );

        Ok(Self {
            source,
            extractor,
            default_timezone: KnowledgeConfig::default().default_timezone,
            current: RwLock::new(Arc::new(first)),
        })
    }

    /// The current snapshot
    pub fn snapshot(&self) -> Arc<Snapshot> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    /// Version of the current snapshot
    pub fn version(&self) -> u64 {
        self.snapshot().version
    }

    /// The backing source
    pub fn source(&self) -> &KnowledgeSource {
        &self.source
    }

    /// Availability report for the current snapshot
    pub fn availability_report(&self) -> AvailabilityReport {
        self.snapshot().availability.report(&self.default_timezone)
    }

    /// Re-read the source and swap in a new snapshot if it changed
    ///
    /// Returns whether a swap happened.
    pub fn reload(&self) -> bool {
        let contents = self.source.read();
        if contents.fingerprint == self.snapshot().fingerprint {
            tracing::debug!("Knowledge source unchanged");
            return false;
        }
        self.swap(contents);
        true
    }

    /// Re-read the source and swap unconditionally
    pub fn force_reload(&self) -> Arc<Snapshot> {
        self.swap(self.source.read())
    }

    fn swap(&self, contents: SourceContents) -> Arc<Snapshot> {
        // Build outside the lock; readers keep the old snapshot meanwhile
        let mut next = Snapshot::build(&self.extractor, contents, 0);

        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        next.version = guard.version + 1;
        let next = Arc::new(next);
        *guard = Arc::clone(&next);
        drop(guard);

        tracing::info!(
            "Knowledge base reloaded: v{} ({} facts)",
            next.version,
            next.facts.len()
        );
        next
    }
}

impl FactSource for KnowledgeBase {
    fn fact_set(&self) -> Arc<FactSet> {
        self.snapshot().facts()
    }
}
