//! Hooks into the construction process.
//!
//! A [`ConstructionObserver`] receives a callback for every mutation the
//! session table performs: units registered, edges set, stages sealed and
//! the final freeze. The default observer ignores everything; install a
//! [`TracingObserver`] to forward events to the `tracing` subscriber, or a
//! [`CollectingObserver`] to capture them for inspection in tests.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::core::settings::DependencySettings;
use crate::stages::stage::StageKind;

/// How a dependency edge came to be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeOrigin {
    /// Derived from stage nesting when a child was appended.
    Implicit,
    /// Requested through a `depends_on` call.
    Explicit,
}

impl fmt::Display for EdgeOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Implicit => write!(f, "implicit"),
            Self::Explicit => write!(f, "explicit"),
        }
    }
}

/// Observer of pipeline construction events.
///
/// All methods have empty default bodies, so implementations override only
/// the events they care about. Observers are called synchronously from the
/// construction path and should return quickly.
pub trait ConstructionObserver {
    /// A build unit was registered in the session.
    fn unit_registered(&mut self, id: &str) {
        let _ = id;
    }

    /// A dependency edge was created or overwritten.
    ///
    /// Implicit wiring that found the edge already present does not report;
    /// only actual writes to the dependency map arrive here.
    fn dependency_set(
        &mut self,
        source: &str,
        target: &str,
        settings: &DependencySettings,
        origin: EdgeOrigin,
    ) {
        let _ = (source, target, settings, origin);
    }

    /// A stage sealed with the given entry and exit set sizes.
    fn stage_sealed(&mut self, kind: StageKind, entry: usize, exit: usize) {
        let _ = (kind, entry, exit);
    }

    /// The pipeline froze into its final graph.
    fn finished(&mut self, units: usize, edges: usize) {
        let _ = (units, edges);
    }
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl ConstructionObserver for NoOpObserver {}

/// Observer that forwards construction events to `tracing`.
///
/// Unit registrations and seals log at debug level; individual edges log
/// at trace level, since large fan-ins produce one event per edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TracingObserver {
    /// Creates a new tracing observer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ConstructionObserver for TracingObserver {
    fn unit_registered(&mut self, id: &str) {
        debug!(unit = %id, "build unit registered");
    }

    fn dependency_set(
        &mut self,
        source: &str,
        target: &str,
        settings: &DependencySettings,
        origin: EdgeOrigin,
    ) {
        trace!(
            source = %source,
            target = %target,
            origin = %origin,
            settings = %settings,
            "dependency set"
        );
    }

    fn stage_sealed(&mut self, kind: StageKind, entry: usize, exit: usize) {
        debug!(kind = %kind, entry, exit, "stage sealed");
    }

    fn finished(&mut self, units: usize, edges: usize) {
        debug!(units, edges, "pipeline frozen");
    }
}

/// One recorded construction event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstructionEvent {
    /// A build unit was registered.
    UnitRegistered {
        /// The unit's id.
        id: String,
    },
    /// A dependency edge was created or overwritten.
    DependencySet {
        /// Id of the depending unit.
        source: String,
        /// Id of the unit depended on.
        target: String,
        /// Settings the edge carries after this write.
        settings: DependencySettings,
        /// Whether nesting or a `depends_on` call produced the write.
        origin: EdgeOrigin,
    },
    /// A stage sealed.
    StageSealed {
        /// The stage variant.
        kind: StageKind,
        /// Size of the final entry set.
        entry: usize,
        /// Size of the final exit set.
        exit: usize,
    },
    /// The pipeline froze.
    Finished {
        /// Number of registered units.
        units: usize,
        /// Number of dependency edges.
        edges: usize,
    },
}

/// Observer that records every event into a shared buffer.
///
/// Clones share the same buffer, so keep one clone outside the pipeline to
/// read events back after `finish` has consumed the observer installed in
/// the pipeline.
#[derive(Debug, Clone, Default)]
pub struct CollectingObserver {
    events: Rc<RefCell<Vec<ConstructionEvent>>>,
}

impl CollectingObserver {
    /// Creates an observer with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    #[must_use]
    pub fn events(&self) -> Vec<ConstructionEvent> {
        self.events.borrow().clone()
    }

    /// Number of events recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    /// Returns true if no events were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    fn record(&self, event: ConstructionEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl ConstructionObserver for CollectingObserver {
    fn unit_registered(&mut self, id: &str) {
        self.record(ConstructionEvent::UnitRegistered { id: id.to_string() });
    }

    fn dependency_set(
        &mut self,
        source: &str,
        target: &str,
        settings: &DependencySettings,
        origin: EdgeOrigin,
    ) {
        self.record(ConstructionEvent::DependencySet {
            source: source.to_string(),
            target: target.to_string(),
            settings: *settings,
            origin,
        });
    }

    fn stage_sealed(&mut self, kind: StageKind, entry: usize, exit: usize) {
        self.record(ConstructionEvent::StageSealed { kind, entry, exit });
    }

    fn finished(&mut self, units: usize, edges: usize) {
        self.record(ConstructionEvent::Finished { units, edges });
    }
}
