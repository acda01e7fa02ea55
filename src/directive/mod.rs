//! Update directives embedded in model responses
//!
//! Response text -> DirectiveParser -> Vec<Directive> -> DirectiveApplier ->
//! Vec<ChangeSummary>. Parsing is purely syntactic; all name, allegiance and
//! coordinate resolution happens in the applier.

pub mod applier;
pub mod parser;

pub use applier::DirectiveApplier;
pub use parser::DirectiveParser;

use std::fmt;

use crate::core::types::Allegiance;
use crate::inventory::record::{AmmoLevel, AmmoRecord};

/// One structured instruction extracted from a response.
///
/// Text fields carry the raw payload exactly as written (trimmed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    AmmoExpend {
        item_text: String,
        amount: u32,
    },
    AmmoSetRemaining {
        item_text: String,
        amount: u32,
    },
    LoadoutSet {
        item_text: String,
        amount: u32,
    },
    LoadoutAdd {
        item_text: String,
        amount: u32,
    },
    /// `PLATFORM:`/`UNIT:` with `COUNT:`
    LoadoutPlatform {
        platform_text: String,
        count: u32,
    },
    LoadoutClearAll,
    MapAdd {
        name: String,
        coord_text: String,
        allegiance_text: String,
        system: String,
    },
    MapRemove {
        name: String,
    },
    /// `None` clears every allegiance
    MapClear {
        allegiance_text: Option<String>,
    },
}

/// Scope of a map clear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearScope {
    All,
    Only(Allegiance),
}

impl fmt::Display for ClearScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(a) => write!(f, "{}", a),
        }
    }
}

/// Human-readable record of one applied change
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeSummary {
    Ammo {
        type_key: String,
        unit_label: String,
        before: AmmoLevel,
        after: AmmoLevel,
    },
    LoadoutCleared {
        entries: usize,
    },
    UnitPlotted {
        name: String,
        allegiance: Allegiance,
        system: String,
        latitude: f64,
        longitude: f64,
        replaced: bool,
    },
    UnitsRemoved {
        name: String,
        count: usize,
    },
    MapCleared {
        scope: ClearScope,
        count: usize,
    },
}

impl ChangeSummary {
    pub(crate) fn ammo(record: &AmmoRecord, before: AmmoLevel) -> Self {
        Self::Ammo {
            type_key: record.type_key.clone(),
            unit_label: record.unit_label.clone(),
            before,
            after: record.level(),
        }
    }
}

impl fmt::Display for ChangeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ammo {
                type_key,
                unit_label,
                before,
                after,
            } => {
                if before.max == after.max {
                    write!(
                        f,
                        "Updated {}: {} → {} {}",
                        type_key, before.current, after.current, unit_label
                    )
                } else {
                    write!(
                        f,
                        "Loadout {}: {}/{} → {}/{} {}",
                        type_key, before.current, before.max, after.current, after.max, unit_label
                    )
                }
            }
            Self::LoadoutCleared { entries } => {
                write!(f, "Cleared loadout: {} types → 0", entries)
            }
            Self::UnitPlotted {
                name,
                allegiance,
                system,
                latitude,
                longitude,
                replaced,
            } => write!(
                f,
                "{} {} {} ({}) at {:.4}, {:.4}",
                if *replaced { "Re-plotted" } else { "Plotted" },
                allegiance,
                name,
                system,
                latitude,
                longitude
            ),
            Self::UnitsRemoved { name, count } => {
                write!(f, "Removed {} unit(s) named {}", count, name)
            }
            Self::MapCleared { scope, count } => {
                write!(f, "Cleared {} map unit(s) ({})", count, scope)
            }
        }
    }
}
