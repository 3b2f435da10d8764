//! # Stagewire
//!
//! Stage composition and snapshot-dependency wiring for CI pipeline graphs.
//!
//! Stagewire turns nested sequential and parallel stage blocks into a flat
//! snapshot-dependency graph over build units:
//!
//! - **Implicit wiring**: appending a child inside a block derives its
//!   dependency edges from the surrounding structure
//! - **Explicit overrides**: `depends_on` requests always win over derived
//!   edges, whichever side executes first
//! - **Session-scoped handles**: cheap copyable references, checked against
//!   the pipeline that issued them
//! - **Frozen results**: construction ends in an immutable, serializable
//!   [`DependencyGraph`](graph::DependencyGraph)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stagewire::prelude::*;
//!
//! let mut pipeline = Pipeline::new("build-and-test");
//! let compile = pipeline.create_unit("Compile")?;
//! let unit_tests = pipeline.create_unit("UnitTests")?;
//! let int_tests = pipeline.create_unit("IntegrationTests")?;
//! let package = pipeline.create_unit("Package")?;
//!
//! pipeline.sequential(|stage| {
//!     stage.unit(&compile)?;
//!     stage.parallel(|tests| {
//!         tests.unit(&unit_tests)?;
//!         tests.unit(&int_tests)
//!     })?;
//!     stage.unit(&package)
//! })?;
//!
//! let graph = pipeline.finish();
//! assert_eq!(graph.dependencies_of("Package").unwrap().len(), 2);
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod core;
pub mod errors;
pub mod graph;
pub mod observability;
pub mod pipeline;
pub mod stages;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{DependencySettings, OnDependencyCancel, ReuseBuilds, UnitRef};
    pub use crate::errors::{
        DuplicateIdError, StagewireError, UnknownTargetError, UnsealedStageReferenceError,
    };
    pub use crate::graph::{DependencyEdge, DependencyGraph, UnitEntry};
    pub use crate::observability::{
        CollectingObserver, ConstructionEvent, ConstructionObserver, EdgeOrigin, NoOpObserver,
        TracingObserver,
    };
    pub use crate::pipeline::Pipeline;
    pub use crate::stages::{CompoundStage, DependencyTarget, Stage, StageKind, UnitConfig};
}
