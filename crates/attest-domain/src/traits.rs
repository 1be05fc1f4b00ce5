//! Seams between the knowledge layer and the governance layer

use crate::fact::FactSet;
use std::sync::Arc;

/// Anything that can hand out the current fact set
///
/// Implementations must return a complete, immutable snapshot. Callers hold
/// the returned `Arc` for the duration of one evaluation, so a concurrent
/// reload never changes the facts underneath them.
pub trait FactSource: Send + Sync {
    /// The fact set of the current snapshot
    fn fact_set(&self) -> Arc<FactSet>;
}

impl FactSource for Arc<FactSet> {
    fn fact_set(&self) -> Arc<FactSet> {
        Arc::clone(self)
    }
}
