//! Loadout presets - read-only reference loads
//!
//! A preset is instantiated by copying every entry into an owned
//! [`Inventory`](crate::inventory::Inventory); presets themselves are
//! `'static` and can never be mutated through a session.

/// One ammunition type inside a preset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetEntry {
    pub type_key: &'static str,
    pub max: u32,
    pub unit_label: &'static str,
}

/// Named, immutable loadout template
#[derive(Debug, PartialEq, Eq)]
pub struct LoadoutPreset {
    pub name: &'static str,
    pub entries: &'static [PresetEntry],
}

const fn entry(type_key: &'static str, max: u32, unit_label: &'static str) -> PresetEntry {
    PresetEntry {
        type_key,
        max,
        unit_label,
    }
}

pub const DEFAULT_PRESET_NAME: &str = "MAGTF Fires";

/// Name of the sentinel selection with no backing preset
pub const CUSTOM_PRESET_NAME: &str = "Custom";

pub static PRESETS: &[LoadoutPreset] = &[
    LoadoutPreset {
        name: DEFAULT_PRESET_NAME,
        entries: &[
            entry("GMLRS", 108, "rockets"),
            entry("ATACMS", 12, "missiles"),
            entry("PrSM", 24, "missiles"),
            entry("155mm_HE", 600, "rounds"),
            entry("Excalibur", 36, "rounds"),
            entry("5in_Naval", 600, "rounds"),
            entry("VLS_Cells", 96, "cells"),
            entry("Harpoon_LRASM", 8, "missiles"),
            entry("Mortar_HE", 200, "rounds"),
            entry("Mortar_Illum", 48, "rounds"),
            entry("Mortar_Smoke", 24, "rounds"),
        ],
    },
    LoadoutPreset {
        name: "HIMARS Battery",
        entries: &[
            entry("GMLRS", 108, "rockets"),
            entry("ATACMS", 12, "missiles"),
            entry("PrSM", 24, "missiles"),
        ],
    },
    LoadoutPreset {
        name: "Artillery Battery",
        entries: &[entry("155mm_HE", 600, "rounds"), entry("Excalibur", 36, "rounds")],
    },
    LoadoutPreset {
        name: "DDG",
        entries: &[
            entry("5in_Naval", 600, "rounds"),
            entry("VLS_Cells", 96, "cells"),
            entry("Harpoon_LRASM", 8, "missiles"),
        ],
    },
    LoadoutPreset {
        name: "Mortar Platoon",
        entries: &[
            entry("Mortar_HE", 200, "rounds"),
            entry("Mortar_Illum", 48, "rounds"),
            entry("Mortar_Smoke", 24, "rounds"),
        ],
    },
];

/// Ammunition categories in display order.
///
/// The context serializer walks this table, so it fixes the order of the
/// status block. Types not listed here fall into [`OTHER_CATEGORY`].
pub static AMMO_CATEGORIES: &[(&str, &[&str])] = &[
    ("HIMARS Battery", &["GMLRS", "ATACMS", "PrSM"]),
    ("Artillery Battery", &["155mm_HE", "Excalibur"]),
    ("DDG", &["5in_Naval", "VLS_Cells", "Harpoon_LRASM"]),
    ("Mortar Platoon", &["Mortar_HE", "Mortar_Illum", "Mortar_Smoke"]),
];

pub const OTHER_CATEGORY: &str = "Other";

/// Category a type key is displayed under
pub fn category_of(type_key: &str) -> &'static str {
    AMMO_CATEGORIES
        .iter()
        .find(|(_, keys)| keys.contains(&type_key))
        .map(|(name, _)| *name)
        .unwrap_or(OTHER_CATEGORY)
}

pub fn default_preset() -> &'static LoadoutPreset {
    &PRESETS[0]
}

/// Case-insensitive lookup by preset name
pub fn find_preset(name: &str) -> Option<&'static LoadoutPreset> {
    let name = name.trim();
    PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Which preset backs the current inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetSelection {
    Named(&'static LoadoutPreset),
    Custom,
}

impl PresetSelection {
    /// Resolve a name; "Custom" selects the sentinel
    pub fn from_name(name: &str) -> Option<Self> {
        if name.trim().eq_ignore_ascii_case(CUSTOM_PRESET_NAME) {
            return Some(Self::Custom);
        }
        find_preset(name).map(Self::Named)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Named(p) => p.name,
            Self::Custom => CUSTOM_PRESET_NAME,
        }
    }

    /// Preset a reset restores; Custom falls back to the default preset
    pub fn reset_source(&self) -> &'static LoadoutPreset {
        match self {
            Self::Named(p) => p,
            Self::Custom => default_preset(),
        }
    }
}

impl Default for PresetSelection {
    fn default() -> Self {
        Self::Named(default_preset())
    }
}
