//! The session table and the single funnel for dependency writes.
//!
//! [`PipelineCore`] owns every unit and stage record created during one
//! construction session. All edge mutations flow through two entry points
//! with deliberately different semantics:
//!
//! * [`PipelineCore::submit_implicit`] creates an edge only if the source
//!   has no edge to that target yet. Wiring derived from nesting never
//!   disturbs anything already recorded.
//! * [`PipelineCore::submit_explicit`] writes unconditionally. A
//!   `depends_on` request wins over implicit wiring no matter which side
//!   executed first; unit-level requests apply immediately, stage-level
//!   requests are buffered by the builder and drained here at seal time.
//!
//! Overwriting an edge keeps its original position in the unit's
//! dependency list, so the read-side order always reflects first
//! insertion.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::core::settings::DependencySettings;
use crate::core::unit::{SessionId, UnitData, UnitRef};
use crate::errors::{
    DuplicateIdError, StagewireError, UnknownTargetError, UnsealedStageReferenceError,
};
use crate::observability::{ConstructionObserver, EdgeOrigin};
use crate::stages::stage::{DependencyTarget, Stage, StageKind, StageRecord};

/// One stage-level dependency request waiting for its stage to seal.
///
/// Targets are already resolved to unit indices; stage targets contributed
/// the exit set they had when the request was made.
#[derive(Debug, Clone)]
pub(crate) struct PendingExplicit {
    pub(crate) targets: BTreeSet<usize>,
    pub(crate) settings: DependencySettings,
}

/// Session-wide construction state.
pub(crate) struct PipelineCore {
    session: SessionId,
    pub(crate) name: String,
    pub(crate) units: Vec<UnitData>,
    index_by_id: HashMap<String, usize>,
    stages: Vec<StageRecord>,
    observer: Box<dyn ConstructionObserver>,
}

impl PipelineCore {
    pub(crate) fn new(name: String, observer: Box<dyn ConstructionObserver>) -> Self {
        Self {
            session: SessionId::next(),
            name,
            units: Vec::new(),
            index_by_id: HashMap::new(),
            stages: Vec::new(),
            observer,
        }
    }

    pub(crate) fn set_observer(&mut self, observer: Box<dyn ConstructionObserver>) {
        self.observer = observer;
    }

    /// Registers a new build unit under a project-unique id.
    pub(crate) fn create_unit(&mut self, id: &str) -> Result<UnitRef, StagewireError> {
        if self.index_by_id.contains_key(id) {
            return Err(DuplicateIdError::new(id).into());
        }
        let index = self.units.len();
        self.units.push(UnitData::new(id.to_string()));
        self.index_by_id.insert(id.to_string(), index);
        self.observer.unit_registered(id);
        Ok(UnitRef {
            session: self.session,
            index,
        })
    }

    /// Resolves a unit handle, rejecting handles from other sessions.
    pub(crate) fn check_unit(&self, unit: &UnitRef) -> Result<usize, StagewireError> {
        if unit.session != self.session || unit.index >= self.units.len() {
            return Err(UnknownTargetError::unit().into());
        }
        Ok(unit.index)
    }

    /// Resolves a stage handle to its record, rejecting foreign handles
    /// and stages whose body has not yet closed.
    pub(crate) fn sealed_stage(&self, stage: &Stage) -> Result<&StageRecord, StagewireError> {
        if stage.session != self.session {
            return Err(UnknownTargetError::stage().into());
        }
        let record = self
            .stages
            .get(stage.index)
            .ok_or_else(UnknownTargetError::stage)?;
        if !record.sealed {
            return Err(UnsealedStageReferenceError::new(record.kind.to_string()).into());
        }
        Ok(record)
    }

    /// Opens an unsealed compound record and returns its index.
    pub(crate) fn open_stage(&mut self, kind: StageKind) -> usize {
        let index = self.stages.len();
        self.stages.push(StageRecord::open(kind));
        index
    }

    /// Creates a sealed leaf record for one unit and returns its index.
    pub(crate) fn push_leaf(&mut self, unit_index: usize) -> usize {
        let index = self.stages.len();
        self.stages.push(StageRecord::leaf(unit_index));
        self.observer.stage_sealed(StageKind::Leaf, 1, 1);
        index
    }

    /// Handle for the record at `index` in this session.
    pub(crate) fn stage_handle(&self, index: usize) -> Stage {
        Stage {
            session: self.session,
            index,
        }
    }

    /// Seals a record with its final frontier sets, then drains the
    /// stage-level requests buffered in its body. Every request applies to
    /// every unit of the final entry set, in the order recorded.
    pub(crate) fn seal_stage(
        &mut self,
        index: usize,
        entry: BTreeSet<usize>,
        exit: BTreeSet<usize>,
        pending: Vec<PendingExplicit>,
    ) {
        let record = &mut self.stages[index];
        record.sealed = true;
        record.entry = entry;
        record.exit = exit;
        let kind = record.kind;
        let sources = record.entry.clone();
        let (entry_len, exit_len) = (record.entry.len(), record.exit.len());

        for request in pending {
            self.submit_explicit(&sources, &request.targets, request.settings);
        }
        self.observer.stage_sealed(kind, entry_len, exit_len);
    }

    /// Creates the edge `source -> target` unless one already exists.
    pub(crate) fn submit_implicit(
        &mut self,
        source: usize,
        target: usize,
        settings: DependencySettings,
    ) {
        if self.units[source].dependencies.contains_key(&target) {
            return;
        }
        self.units[source].dependencies.insert(target, settings);
        let Self {
            units, observer, ..
        } = self;
        observer.dependency_set(
            &units[source].id,
            &units[target].id,
            &settings,
            EdgeOrigin::Implicit,
        );
    }

    /// Writes the edges `source -> target` for the cross product of the
    /// two sets, overwriting existing edges in place.
    pub(crate) fn submit_explicit(
        &mut self,
        sources: &BTreeSet<usize>,
        targets: &BTreeSet<usize>,
        settings: DependencySettings,
    ) {
        let Self {
            units, observer, ..
        } = self;
        for &source in sources {
            for &target in targets {
                units[source].dependencies.insert(target, settings);
                observer.dependency_set(
                    &units[source].id,
                    &units[target].id,
                    &settings,
                    EdgeOrigin::Explicit,
                );
            }
        }
    }

    /// Resolves dependency targets to a unit index set.
    ///
    /// Handles are checked against this session now; stage targets must be
    /// sealed and contribute their current exit set.
    pub(crate) fn resolve_targets(
        &self,
        targets: &[DependencyTarget],
    ) -> Result<BTreeSet<usize>, StagewireError> {
        let mut resolved = BTreeSet::new();
        for target in targets {
            match target {
                DependencyTarget::Unit(unit) => {
                    resolved.insert(self.check_unit(unit)?);
                }
                DependencyTarget::Stage(stage) => {
                    resolved.extend(self.sealed_stage(stage)?.exit.iter().copied());
                }
            }
        }
        Ok(resolved)
    }

    pub(crate) fn unit_id(&self, index: usize) -> &str {
        &self.units[index].id
    }

    pub(crate) fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub(crate) fn edge_count(&self) -> usize {
        self.units.iter().map(|unit| unit.dependencies.len()).sum()
    }

    pub(crate) fn emit_finished(&mut self) {
        let (units, edges) = (self.unit_count(), self.edge_count());
        self.observer.finished(units, edges);
    }
}

impl fmt::Debug for PipelineCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineCore")
            .field("name", &self.name)
            .field("units", &self.units.len())
            .field("stages", &self.stages.len())
            .finish_non_exhaustive()
    }
}
