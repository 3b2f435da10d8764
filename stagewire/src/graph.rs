//! The frozen dependency graph.
//!
//! [`DependencyGraph`] is what a finished session leaves behind: units in
//! creation order, each with its dependency list in first-insertion order.
//! The stage tree is gone by this point; only units and settings-carrying
//! edges remain. The graph is immutable and serializable, with small
//! renderers for Graphviz and plain text output.

use std::collections::HashMap;

use serde::Serialize;

use crate::core::settings::DependencySettings;
use crate::pipeline::resolver::PipelineCore;

/// One snapshot-dependency edge in the finished graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyEdge {
    /// Id of the unit depended on.
    pub target: String,
    /// Settings the edge carries.
    pub settings: DependencySettings,
}

/// One build unit with its finished dependency list.
#[derive(Debug, Clone, Serialize)]
pub struct UnitEntry {
    id: String,
    dependencies: Vec<DependencyEdge>,
}

impl UnitEntry {
    /// The unit's id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Dependencies in the order their edges were first inserted.
    ///
    /// Overwrites do not reorder: an edge keeps the position it got when
    /// implicit wiring or an explicit request first created it.
    #[must_use]
    pub fn dependencies(&self) -> &[DependencyEdge] {
        &self.dependencies
    }
}

/// Immutable result of a finished construction session.
#[derive(Debug, Clone, Serialize)]
pub struct DependencyGraph {
    name: String,
    units: Vec<UnitEntry>,
    #[serde(skip)]
    index_by_id: HashMap<String, usize>,
}

impl DependencyGraph {
    pub(crate) fn from_core(core: PipelineCore) -> Self {
        let ids: Vec<String> = core.units.iter().map(|unit| unit.id.clone()).collect();
        let mut units = Vec::with_capacity(ids.len());
        let mut index_by_id = HashMap::with_capacity(ids.len());

        for (index, unit) in core.units.into_iter().enumerate() {
            let dependencies = unit
                .dependencies
                .iter()
                .map(|(&target, &settings)| DependencyEdge {
                    target: ids[target].clone(),
                    settings,
                })
                .collect();
            index_by_id.insert(unit.id.clone(), index);
            units.push(UnitEntry {
                id: unit.id,
                dependencies,
            });
        }

        Self {
            name: core.name,
            units,
            index_by_id,
        }
    }

    /// The pipeline name the session was opened with.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of build units in the graph.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Returns true if the graph holds no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Total number of dependency edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.units.iter().map(|unit| unit.dependencies.len()).sum()
    }

    /// Units in creation order.
    #[must_use]
    pub fn units(&self) -> &[UnitEntry] {
        &self.units
    }

    /// Unit ids in creation order.
    pub fn unit_ids(&self) -> impl Iterator<Item = &str> {
        self.units.iter().map(UnitEntry::id)
    }

    /// Looks up one unit by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&UnitEntry> {
        self.index_by_id.get(id).map(|&index| &self.units[index])
    }

    /// The dependency list of one unit, by id.
    #[must_use]
    pub fn dependencies_of(&self, id: &str) -> Option<&[DependencyEdge]> {
        self.get(id).map(UnitEntry::dependencies)
    }

    /// Serializes the graph as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Renders the graph in Graphviz dot format.
    ///
    /// Arrows point from a dependency to the unit depending on it, so the
    /// drawing reads in execution order. Settings are not rendered.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("digraph \"{}\" {{\n", self.name));
        out.push_str("  rankdir=LR;\n");
        out.push_str("  node [shape=box, style=rounded];\n");
        for unit in &self.units {
            out.push_str(&format!("  \"{}\";\n", unit.id));
        }
        for unit in &self.units {
            for edge in &unit.dependencies {
                out.push_str(&format!("  \"{}\" -> \"{}\";\n", edge.target, unit.id));
            }
        }
        out.push_str("}\n");
        out
    }

    /// Renders the graph as a plain text summary, one unit per line.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut out = format!("pipeline: {}\n", self.name);
        for (position, unit) in self.units.iter().enumerate() {
            out.push_str(&format!("{:>3}. {}", position + 1, unit.id));
            if !unit.dependencies.is_empty() {
                let targets: Vec<&str> = unit
                    .dependencies
                    .iter()
                    .map(|edge| edge.target.as_str())
                    .collect();
                out.push_str(&format!(" [depends: {}]", targets.join(", ")));
            }
            out.push('\n');
        }
        out
    }
}
