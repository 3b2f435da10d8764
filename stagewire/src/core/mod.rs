//! Core value types shared across the library.

pub mod settings;
pub mod unit;

pub use settings::{DependencySettings, OnDependencyCancel, ReuseBuilds};
pub use unit::UnitRef;
