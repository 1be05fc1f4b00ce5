//! Command implementations.

pub mod availability;
pub mod check;
pub mod facts;
pub mod profile;
pub mod project;
pub mod verify;
pub mod watch;

pub use self::availability::execute_availability;
pub use self::check::execute_check;
pub use self::facts::execute_facts;
pub use self::profile::execute_profile;
pub use self::project::execute_project;
pub use self::verify::execute_verify_employment;
pub use self::watch::execute_watch;

use crate::config::Config;
use crate::error::Result;
use attest_knowledge::KnowledgeBase;

/// Load the knowledge base the configuration points at.
pub(crate) fn open_knowledge(config: &Config) -> Result<KnowledgeBase> {
    Ok(KnowledgeBase::open(&config.knowledge)?)
}
