//! Pipeline construction sessions.
//!
//! A [`Pipeline`] is the root of one construction session. Build units are
//! registered on it, stages are composed through its factories, and
//! [`Pipeline::finish`] freezes the result into an immutable
//! [`DependencyGraph`](crate::graph::DependencyGraph).
//!
//! Top-level stages are intentionally inert: the pipeline has no frontier,
//! so nothing wires one top-level stage to the next. Cross-stage edges are
//! requested explicitly, usually by appending an earlier sealed stage
//! inside a later block or through `depends_on`.

pub(crate) mod resolver;

use tracing::debug;

use crate::core::unit::UnitRef;
use crate::errors::StagewireError;
use crate::graph::DependencyGraph;
use crate::observability::{ConstructionObserver, NoOpObserver};
use crate::pipeline::resolver::PipelineCore;
use crate::stages::builder::{CompoundStage, UnitConfig};
use crate::stages::stage::{Stage, StageKind};

/// A pipeline under construction.
///
/// The pipeline hands out copyable handles for everything it creates;
/// handles from one pipeline are rejected by every other. Construction is
/// strictly single threaded and every operation either succeeds or leaves
/// the session unusable, so errors should abort the build.
#[derive(Debug)]
pub struct Pipeline {
    core: PipelineCore,
}

impl Pipeline {
    /// Opens a fresh construction session.
    #[must_use]
    pub fn new(name: &str) -> Self {
        debug!(pipeline = %name, "pipeline session opened");
        Self {
            core: PipelineCore::new(name.to_string(), Box::new(NoOpObserver)),
        }
    }

    /// Replaces the construction observer.
    #[must_use]
    pub fn with_observer(mut self, observer: Box<dyn ConstructionObserver>) -> Self {
        self.core.set_observer(observer);
        self
    }

    /// The pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// Number of build units registered so far.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.core.unit_count()
    }

    /// Registers a new build unit without placing it in any stage.
    ///
    /// The id must be unique within the session. The unit participates in
    /// the finished graph even if it is never appended anywhere.
    pub fn create_unit(&mut self, id: &str) -> Result<UnitRef, StagewireError> {
        self.core.create_unit(id)
    }

    /// Places an already-registered unit at top level.
    ///
    /// Units are registered once, at creation; attaching is idempotent and
    /// never duplicates, and no implicit wiring happens at top level. The
    /// call still validates that the handle belongs to this session.
    pub fn attach(&mut self, unit: &UnitRef) -> Result<(), StagewireError> {
        self.core.check_unit(unit).map(|_| ())
    }

    /// Runs a configuration closure against a unit, outside any stage.
    ///
    /// No appending and no implicit wiring happens; this is the way to put
    /// explicit dependencies on a unit that sits at top level.
    pub fn configure_unit<F>(&mut self, unit: &UnitRef, config: F) -> Result<(), StagewireError>
    where
        F: FnOnce(&mut UnitConfig<'_>) -> Result<(), StagewireError>,
    {
        let index = self.core.check_unit(unit)?;
        let mut scope = UnitConfig::new(&mut self.core, index);
        config(&mut scope)
    }

    /// Wraps a single unit as a sealed leaf stage.
    pub fn leaf(&mut self, unit: &UnitRef) -> Result<Stage, StagewireError> {
        let index = self.core.check_unit(unit)?;
        let record = self.core.push_leaf(index);
        Ok(self.core.stage_handle(record))
    }

    /// Builds a top-level sequential stage and seals it.
    ///
    /// The body receives the stage's builder; the returned handle is
    /// usable as an append child or dependency target from then on.
    pub fn sequential<F>(&mut self, body: F) -> Result<Stage, StagewireError>
    where
        F: FnOnce(&mut CompoundStage<'_>) -> Result<(), StagewireError>,
    {
        self.compound(StageKind::Sequential, body)
    }

    /// Builds a top-level parallel stage and seals it.
    pub fn parallel<F>(&mut self, body: F) -> Result<Stage, StagewireError>
    where
        F: FnOnce(&mut CompoundStage<'_>) -> Result<(), StagewireError>,
    {
        self.compound(StageKind::Parallel, body)
    }

    /// Freezes the session into its final dependency graph.
    #[must_use]
    pub fn finish(mut self) -> DependencyGraph {
        self.core.emit_finished();
        debug!(
            pipeline = %self.core.name,
            units = self.core.unit_count(),
            edges = self.core.edge_count(),
            "pipeline frozen"
        );
        DependencyGraph::from_core(self.core)
    }

    fn compound<F>(&mut self, kind: StageKind, body: F) -> Result<Stage, StagewireError>
    where
        F: FnOnce(&mut CompoundStage<'_>) -> Result<(), StagewireError>,
    {
        let mut stage = CompoundStage::open(&mut self.core, kind, None);
        body(&mut stage)?;
        let (record, _, _) = stage.seal();
        Ok(self.core.stage_handle(record))
    }
}
