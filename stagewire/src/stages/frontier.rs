//! The wiring frontier.
//!
//! A frontier is the cursor a child is appended against: the set of units
//! the child's entry units must depend on, plus the settings those implicit
//! edges carry when the append supplies none of its own.
//!
//! Sequential blocks advance their frontier to the exit set of each child
//! as it lands; parallel blocks capture the frontier once, when the block
//! itself is appended, and hand that same value to every child. Top-level
//! stages have no frontier at all, which is why nothing wires them.

use std::collections::BTreeSet;

use crate::core::settings::DependencySettings;

/// The fan-in cursor for one open compound stage.
#[derive(Debug, Clone)]
pub(crate) struct Frontier {
    /// Units the next child's entry set fans in from.
    pub(crate) units: BTreeSet<usize>,
    /// Settings for implicit edges when the append supplies none.
    pub(crate) settings: DependencySettings,
}

impl Frontier {
    /// Frontier produced by advancing past a child inside a sequential
    /// block. Internal edges fall back to default settings; the settings
    /// supplied for the enclosing block apply only to its fan-in edges.
    pub(crate) fn advanced(units: BTreeSet<usize>) -> Self {
        Self {
            units,
            settings: DependencySettings::default(),
        }
    }

    /// Frontier a nested compound inherits when it is appended.
    ///
    /// The unit set is the parent's current frontier unchanged; settings
    /// supplied with the append replace the inherited ones for the fan-in
    /// edges the nested block will create.
    pub(crate) fn inherited(
        parent: Option<&Frontier>,
        supplied: Option<DependencySettings>,
    ) -> Option<Self> {
        parent.map(|frontier| Self {
            units: frontier.units.clone(),
            settings: supplied.unwrap_or(frontier.settings),
        })
    }

    /// Settings an implicit edge created against this frontier carries.
    pub(crate) fn effective(&self, supplied: Option<DependencySettings>) -> DependencySettings {
        supplied.unwrap_or(self.settings)
    }
}
