//! Snapshot-dependency settings.
//!
//! Every dependency edge in the finished graph carries one
//! [`DependencySettings`] value describing how the depending unit treats the
//! dependency at execution time. The settings are opaque to the wiring
//! logic itself; they are attached to edges, merged by overwrite and read
//! back out, never interpreted.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reaction of the depending unit when the dependency is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnDependencyCancel {
    /// Mark the depending unit with a build problem. This is the default.
    AddProblem,
    /// Cancel the depending unit as well.
    Cancel,
    /// Run the depending unit regardless.
    Ignore,
}

impl Default for OnDependencyCancel {
    fn default() -> Self {
        Self::AddProblem
    }
}

impl fmt::Display for OnDependencyCancel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddProblem => write!(f, "add_problem"),
            Self::Cancel => write!(f, "cancel"),
            Self::Ignore => write!(f, "ignore"),
        }
    }
}

/// Which finished builds of the dependency may be reused instead of
/// triggering a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReuseBuilds {
    /// Reuse any finished build. This is the default.
    Any,
    /// Reuse only successful builds.
    Successful,
    /// Never reuse; always run the dependency again.
    No,
}

impl Default for ReuseBuilds {
    fn default() -> Self {
        Self::Any
    }
}

impl fmt::Display for ReuseBuilds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Successful => write!(f, "successful"),
            Self::No => write!(f, "no"),
        }
    }
}

/// Settings attached to a single snapshot-dependency edge.
///
/// A fresh value compares equal to [`DependencySettings::default`], which is
/// what implicit wiring attaches when no settings were supplied for the
/// append that produced the edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySettings {
    /// Run the depending unit on the same agent as the dependency.
    /// Defaults to `false`.
    #[serde(default)]
    pub run_on_same_agent: bool,
    /// Reaction when the dependency is cancelled. Defaults to
    /// [`OnDependencyCancel::AddProblem`].
    #[serde(default)]
    pub on_dependency_cancel: OnDependencyCancel,
    /// Reuse policy for finished dependency builds. Defaults to
    /// [`ReuseBuilds::Any`].
    #[serde(default)]
    pub reuse_builds: ReuseBuilds,
}

impl DependencySettings {
    /// Creates settings with all fields at their defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the depending unit must run on the dependency's agent.
    #[must_use]
    pub fn with_run_on_same_agent(mut self, value: bool) -> Self {
        self.run_on_same_agent = value;
        self
    }

    /// Sets the reaction to a cancelled dependency.
    #[must_use]
    pub fn with_on_dependency_cancel(mut self, value: OnDependencyCancel) -> Self {
        self.on_dependency_cancel = value;
        self
    }

    /// Sets the reuse policy for finished dependency builds.
    #[must_use]
    pub fn with_reuse_builds(mut self, value: ReuseBuilds) -> Self {
        self.reuse_builds = value;
        self
    }

    /// Returns true if every field holds its default value.
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for DependencySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "same_agent={}, on_cancel={}, reuse={}",
            self.run_on_same_agent, self.on_dependency_cancel, self.reuse_builds
        )
    }
}
