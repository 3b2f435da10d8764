//! Builders handed to stage bodies during construction.
//!
//! A [`CompoundStage`] is the mutable view of one open sequential or
//! parallel block. Children land through it one at a time, and each append
//! performs its implicit wiring against the block's frontier at that
//! moment. When the body returns, the block seals: its entry and exit sets
//! become final and any stage-level dependency requests recorded in the
//! body are applied to the entry units.
//!
//! A [`UnitConfig`] is the matching view of one build unit, used to attach
//! explicit dependencies directly to it. Explicit requests always
//! overwrite whatever implicit wiring put on the same edge.

use std::collections::BTreeSet;

use crate::core::settings::DependencySettings;
use crate::core::unit::UnitRef;
use crate::errors::StagewireError;
use crate::pipeline::resolver::{PendingExplicit, PipelineCore};
use crate::stages::frontier::Frontier;
use crate::stages::stage::{DependencyTarget, Stage, StageKind};

/// Mutable builder for one open compound stage.
///
/// Instances are created by the pipeline's stage factories and by the
/// nested-stage methods below; user code only ever sees one by reference
/// inside a body closure.
#[derive(Debug)]
pub struct CompoundStage<'a> {
    core: &'a mut PipelineCore,
    kind: StageKind,
    record: usize,
    frontier: Option<Frontier>,
    entry: BTreeSet<usize>,
    exit: BTreeSet<usize>,
    entry_fixed: bool,
    pending: Vec<PendingExplicit>,
}

impl<'a> CompoundStage<'a> {
    /// Opens a builder over a fresh unsealed record.
    pub(crate) fn open(
        core: &'a mut PipelineCore,
        kind: StageKind,
        frontier: Option<Frontier>,
    ) -> Self {
        let record = core.open_stage(kind);
        Self {
            core,
            kind,
            record,
            frontier,
            entry: BTreeSet::new(),
            exit: BTreeSet::new(),
            entry_fixed: false,
            pending: Vec::new(),
        }
    }

    /// Seals the record and applies buffered stage-level dependencies.
    ///
    /// Returns the record index with the final entry and exit sets.
    pub(crate) fn seal(self) -> (usize, BTreeSet<usize>, BTreeSet<usize>) {
        self.core.seal_stage(
            self.record,
            self.entry.clone(),
            self.exit.clone(),
            self.pending,
        );
        (self.record, self.entry, self.exit)
    }

    /// The variant of the stage under construction.
    #[must_use]
    pub fn kind(&self) -> StageKind {
        self.kind
    }

    /// Handle to the stage under construction.
    ///
    /// The handle only becomes usable once the body has returned and the
    /// stage has sealed; using it earlier, from a nested body, fails with
    /// an unsealed-stage error.
    #[must_use]
    pub fn as_stage(&self) -> Stage {
        self.core.stage_handle(self.record)
    }

    /// Appends an already-registered build unit as the next child.
    pub fn unit(&mut self, unit: &UnitRef) -> Result<(), StagewireError> {
        self.append_unit(unit, None)
    }

    /// Appends a build unit, overriding the settings of the implicit edges
    /// this particular append creates.
    pub fn unit_with(
        &mut self,
        unit: &UnitRef,
        settings: DependencySettings,
    ) -> Result<(), StagewireError> {
        self.append_unit(unit, Some(settings))
    }

    /// Registers a new build unit and appends it as the next child.
    pub fn create_unit(&mut self, id: &str) -> Result<UnitRef, StagewireError> {
        let unit = self.core.create_unit(id)?;
        self.append_unit(&unit, None)?;
        Ok(unit)
    }

    /// Appends a build unit and then runs a configuration closure against
    /// it, so that explicit dependencies recorded there overwrite the
    /// implicit wiring this append performed.
    pub fn configure_unit<F>(&mut self, unit: &UnitRef, config: F) -> Result<(), StagewireError>
    where
        F: FnOnce(&mut UnitConfig<'_>) -> Result<(), StagewireError>,
    {
        self.configure_unit_inner(unit, None, config)
    }

    /// Same as [`CompoundStage::configure_unit`] with append settings for
    /// the implicit edges.
    pub fn configure_unit_with<F>(
        &mut self,
        unit: &UnitRef,
        settings: DependencySettings,
        config: F,
    ) -> Result<(), StagewireError>
    where
        F: FnOnce(&mut UnitConfig<'_>) -> Result<(), StagewireError>,
    {
        self.configure_unit_inner(unit, Some(settings), config)
    }

    /// Appends a previously sealed stage as the next child.
    ///
    /// The child's entry units are wired against the current frontier; its
    /// recorded entry and exit sets are reused as-is, so a stage appended
    /// in two places fans in and out identically in both.
    pub fn append(&mut self, stage: &Stage) -> Result<(), StagewireError> {
        self.append_stage(stage, None)
    }

    /// Appends a sealed stage, overriding the settings of the fan-in edges
    /// this particular append creates.
    pub fn append_with(
        &mut self,
        stage: &Stage,
        settings: DependencySettings,
    ) -> Result<(), StagewireError> {
        self.append_stage(stage, Some(settings))
    }

    /// Opens a nested sequential block as the next child.
    pub fn sequential<F>(&mut self, body: F) -> Result<Stage, StagewireError>
    where
        F: FnOnce(&mut CompoundStage<'_>) -> Result<(), StagewireError>,
    {
        self.compound(StageKind::Sequential, None, body)
    }

    /// Opens a nested sequential block whose fan-in edges carry the given
    /// settings instead of the inherited ones.
    pub fn sequential_with<F>(
        &mut self,
        settings: DependencySettings,
        body: F,
    ) -> Result<Stage, StagewireError>
    where
        F: FnOnce(&mut CompoundStage<'_>) -> Result<(), StagewireError>,
    {
        self.compound(StageKind::Sequential, Some(settings), body)
    }

    /// Opens a nested parallel block as the next child.
    pub fn parallel<F>(&mut self, body: F) -> Result<Stage, StagewireError>
    where
        F: FnOnce(&mut CompoundStage<'_>) -> Result<(), StagewireError>,
    {
        self.compound(StageKind::Parallel, None, body)
    }

    /// Opens a nested parallel block whose fan-in edges carry the given
    /// settings instead of the inherited ones.
    pub fn parallel_with<F>(
        &mut self,
        settings: DependencySettings,
        body: F,
    ) -> Result<Stage, StagewireError>
    where
        F: FnOnce(&mut CompoundStage<'_>) -> Result<(), StagewireError>,
    {
        self.compound(StageKind::Parallel, Some(settings), body)
    }

    /// Records a stage-level dependency on a unit or sealed stage.
    ///
    /// The request is buffered and applied when this stage seals, to every
    /// unit in the final entry set. Targets are resolved immediately, so a
    /// stage target contributes the exit set it has right now.
    pub fn depends_on(
        &mut self,
        target: impl Into<DependencyTarget>,
    ) -> Result<(), StagewireError> {
        self.push_pending(&[target.into()], DependencySettings::default())
    }

    /// Records a stage-level dependency carrying the given settings.
    pub fn depends_on_with(
        &mut self,
        target: impl Into<DependencyTarget>,
        settings: DependencySettings,
    ) -> Result<(), StagewireError> {
        self.push_pending(&[target.into()], settings)
    }

    /// Records one stage-level dependency request on several targets at
    /// once, all carrying the same settings.
    pub fn depends_on_each(
        &mut self,
        targets: &[DependencyTarget],
        settings: DependencySettings,
    ) -> Result<(), StagewireError> {
        self.push_pending(targets, settings)
    }

    fn append_unit(
        &mut self,
        unit: &UnitRef,
        supplied: Option<DependencySettings>,
    ) -> Result<(), StagewireError> {
        let index = self.core.check_unit(unit)?;
        if let Some(frontier) = &self.frontier {
            let settings = frontier.effective(supplied);
            for &target in &frontier.units {
                self.core.submit_implicit(index, target, settings);
            }
        }
        let child = BTreeSet::from([index]);
        self.note_child(&child, &child);
        Ok(())
    }

    fn append_stage(
        &mut self,
        stage: &Stage,
        supplied: Option<DependencySettings>,
    ) -> Result<(), StagewireError> {
        let record = self.core.sealed_stage(stage)?;
        let entry = record.entry.clone();
        let exit = record.exit.clone();
        if let Some(frontier) = &self.frontier {
            let settings = frontier.effective(supplied);
            for &source in &entry {
                for &target in &frontier.units {
                    self.core.submit_implicit(source, target, settings);
                }
            }
        }
        self.note_child(&entry, &exit);
        Ok(())
    }

    fn compound<F>(
        &mut self,
        kind: StageKind,
        supplied: Option<DependencySettings>,
        body: F,
    ) -> Result<Stage, StagewireError>
    where
        F: FnOnce(&mut CompoundStage<'_>) -> Result<(), StagewireError>,
    {
        let child_frontier = Frontier::inherited(self.frontier.as_ref(), supplied);
        let mut child = CompoundStage::open(&mut *self.core, kind, child_frontier);
        body(&mut child)?;
        let (record, entry, exit) = child.seal();
        self.note_child(&entry, &exit);
        Ok(self.core.stage_handle(record))
    }

    fn configure_unit_inner<F>(
        &mut self,
        unit: &UnitRef,
        supplied: Option<DependencySettings>,
        config: F,
    ) -> Result<(), StagewireError>
    where
        F: FnOnce(&mut UnitConfig<'_>) -> Result<(), StagewireError>,
    {
        self.append_unit(unit, supplied)?;
        let index = self.core.check_unit(unit)?;
        let mut scope = UnitConfig::new(&mut *self.core, index);
        config(&mut scope)
    }

    fn push_pending(
        &mut self,
        targets: &[DependencyTarget],
        settings: DependencySettings,
    ) -> Result<(), StagewireError> {
        let resolved = self.core.resolve_targets(targets)?;
        self.pending.push(PendingExplicit {
            targets: resolved,
            settings,
        });
        Ok(())
    }

    /// Folds a freshly sealed child into this stage's bookkeeping.
    ///
    /// Sequential blocks fix their entry on the first child and advance the
    /// frontier to the child's exit; parallel blocks keep the frontier they
    /// captured at open and union the child's sets into their own.
    fn note_child(&mut self, entry: &BTreeSet<usize>, exit: &BTreeSet<usize>) {
        match self.kind {
            StageKind::Sequential => {
                if !self.entry_fixed {
                    self.entry = entry.clone();
                    self.entry_fixed = true;
                }
                self.frontier = Some(Frontier::advanced(exit.clone()));
                self.exit = exit.clone();
            }
            StageKind::Parallel => {
                self.entry.extend(entry.iter().copied());
                self.exit.extend(exit.iter().copied());
            }
            // leaf records are sealed at creation and never open a builder
            StageKind::Leaf => {}
        }
    }
}

/// Mutable view of one build unit for attaching explicit dependencies.
#[derive(Debug)]
pub struct UnitConfig<'a> {
    core: &'a mut PipelineCore,
    unit: usize,
}

impl UnitConfig<'_> {
    /// The id of the unit being configured.
    #[must_use]
    pub fn id(&self) -> &str {
        self.core.unit_id(self.unit)
    }

    /// Adds an explicit dependency with default settings.
    ///
    /// Explicit requests are applied immediately and overwrite any existing
    /// edge to the same target, whatever put it there.
    pub fn depends_on(
        &mut self,
        target: impl Into<DependencyTarget>,
    ) -> Result<(), StagewireError> {
        self.submit(&[target.into()], DependencySettings::default())
    }

    /// Adds an explicit dependency carrying the given settings.
    pub fn depends_on_with(
        &mut self,
        target: impl Into<DependencyTarget>,
        settings: DependencySettings,
    ) -> Result<(), StagewireError> {
        self.submit(&[target.into()], settings)
    }

    /// Adds explicit dependencies on several targets, all carrying the
    /// same settings.
    pub fn depends_on_each(
        &mut self,
        targets: &[DependencyTarget],
        settings: DependencySettings,
    ) -> Result<(), StagewireError> {
        self.submit(targets, settings)
    }

    pub(crate) fn new(core: &mut PipelineCore, unit: usize) -> UnitConfig<'_> {
        UnitConfig { core, unit }
    }

    fn submit(
        &mut self,
        targets: &[DependencyTarget],
        settings: DependencySettings,
    ) -> Result<(), StagewireError> {
        let resolved = self.core.resolve_targets(targets)?;
        let sources = BTreeSet::from([self.unit]);
        self.core.submit_explicit(&sources, &resolved, settings);
        Ok(())
    }
}
