//! Stage handles and the per-stage records kept by the session table.

use std::collections::BTreeSet;
use std::fmt;

use crate::core::unit::{SessionId, UnitRef};

/// The variant of a stage node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    /// A single build unit wrapped as a stage.
    Leaf,
    /// Children run one after another.
    Sequential,
    /// Children run side by side.
    Parallel,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf => write!(f, "leaf"),
            Self::Sequential => write!(f, "sequential"),
            Self::Parallel => write!(f, "parallel"),
        }
    }
}

/// Handle to a stage created in a pipeline session.
///
/// The handle is issued while the stage body may still be executing; every
/// use as an append child or dependency target re-checks that the stage has
/// sealed by then.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Stage {
    pub(crate) session: SessionId,
    pub(crate) index: usize,
}

/// Per-stage record in the session table.
///
/// `entry` and `exit` are meaningful only once `sealed` is true; until then
/// the record exists so that handles can be issued and checked.
#[derive(Debug, Clone)]
pub(crate) struct StageRecord {
    pub(crate) kind: StageKind,
    pub(crate) sealed: bool,
    /// Units an incoming edge from a later sibling fans out to.
    pub(crate) entry: BTreeSet<usize>,
    /// Units a later sibling fans in from.
    pub(crate) exit: BTreeSet<usize>,
}

impl StageRecord {
    /// Opens a compound record whose frontier sets are filled in at seal.
    pub(crate) fn open(kind: StageKind) -> Self {
        Self {
            kind,
            sealed: false,
            entry: BTreeSet::new(),
            exit: BTreeSet::new(),
        }
    }

    /// Creates a sealed leaf record for one unit.
    pub(crate) fn leaf(unit_index: usize) -> Self {
        let mut set = BTreeSet::new();
        set.insert(unit_index);
        Self {
            kind: StageKind::Leaf,
            sealed: true,
            entry: set.clone(),
            exit: set,
        }
    }
}

/// A target of an explicit dependency request.
///
/// Units resolve to themselves; stages resolve to their exit set, captured
/// at the moment of the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyTarget {
    /// Depend on one build unit.
    Unit(UnitRef),
    /// Depend on every unit in a sealed stage's exit set.
    Stage(Stage),
}

impl From<UnitRef> for DependencyTarget {
    fn from(unit: UnitRef) -> Self {
        Self::Unit(unit)
    }
}

impl From<&UnitRef> for DependencyTarget {
    fn from(unit: &UnitRef) -> Self {
        Self::Unit(*unit)
    }
}

impl From<Stage> for DependencyTarget {
    fn from(stage: Stage) -> Self {
        Self::Stage(stage)
    }
}

impl From<&Stage> for DependencyTarget {
    fn from(stage: &Stage) -> Self {
        Self::Stage(*stage)
    }
}
