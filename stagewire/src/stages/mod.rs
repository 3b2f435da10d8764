//! Stage nodes and the builders that assemble them.
//!
//! A stage is one node of the nesting tree: a leaf wrapping a single build
//! unit, or a sequential/parallel block wrapping an ordered list of child
//! stages. Stages exist only during construction; the finished graph keeps
//! units and edges and drops the tree.

pub mod builder;
pub mod frontier;
pub mod stage;

pub use builder::{CompoundStage, UnitConfig};
pub use stage::{DependencyTarget, Stage, StageKind};
