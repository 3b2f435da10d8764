//! Build units and the session-scoped handles that refer to them.

use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

use crate::core::settings::DependencySettings;

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Process-unique identifier for one pipeline construction session.
///
/// Handles carry the session id of the pipeline that issued them, so a
/// handle leaked across pipelines is rejected instead of silently resolving
/// to an unrelated unit with the same slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SessionId(u64);

impl SessionId {
    /// Allocates the next session id.
    pub(crate) fn next() -> Self {
        Self(SESSION_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle to a build unit registered in a pipeline session.
///
/// Handles are small and copyable; they stay valid for the lifetime of the
/// session that created them and are rejected by any other session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnitRef {
    pub(crate) session: SessionId,
    pub(crate) index: usize,
}

/// Mutable per-unit state held by the session table.
#[derive(Debug, Clone)]
pub(crate) struct UnitData {
    /// Project-unique unit id.
    pub(crate) id: String,
    /// Dependency map keyed by target unit index.
    ///
    /// Insertion order is the read-side order of the finished dependency
    /// list. Overwriting an existing key keeps its original position.
    pub(crate) dependencies: IndexMap<usize, DependencySettings>,
}

impl UnitData {
    pub(crate) fn new(id: String) -> Self {
        Self {
            id,
            dependencies: IndexMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ids_are_unique() {
        let a = SessionId::next();
        let b = SessionId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut unit = UnitData::new("A".to_string());
        unit.dependencies.insert(3, DependencySettings::default());
        unit.dependencies.insert(7, DependencySettings::default());
        unit.dependencies
            .insert(3, DependencySettings::new().with_run_on_same_agent(true));

        let keys: Vec<usize> = unit.dependencies.keys().copied().collect();
        assert_eq!(keys, vec![3, 7]);
        assert!(unit.dependencies[&3].run_on_same_agent);
    }
}
