//! Alias resolution - free-text ammunition names to canonical type keys
//!
//! Resolution order, first match wins:
//! 1. exact, case-insensitive alias
//! 2. exact, case-sensitive inventory key, as written or in its
//!    underscored form ("Naval Strike Missile" finds `Naval_Strike_Missile`)
//! 3. substring either way against the alias table, walked in table order
//!
//! Step 3 is lossy on purpose. When aliases overlap ("81mm he" and "he 155"
//! both relate to "he") the earlier table row wins, so the table order below
//! is part of the contract and is pinned by tests.

use crate::inventory::record::Inventory;

/// (alias, canonical type key), in priority order
pub static DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("gmlrs", "GMLRS"),
    ("atacms", "ATACMS"),
    ("prsm", "PrSM"),
    ("precision strike missile", "PrSM"),
    ("155mm", "155mm_HE"),
    ("155mm he", "155mm_HE"),
    ("he 155", "155mm_HE"),
    ("excalibur", "Excalibur"),
    ("m982", "Excalibur"),
    ("5 inch", "5in_Naval"),
    ("5\"", "5in_Naval"),
    ("5in", "5in_Naval"),
    ("naval gun", "5in_Naval"),
    ("vls", "VLS_Cells"),
    ("tomahawk", "VLS_Cells"),
    ("tlam", "VLS_Cells"),
    ("sm-2", "VLS_Cells"),
    ("sm-6", "VLS_Cells"),
    ("harpoon", "Harpoon_LRASM"),
    ("lrasm", "Harpoon_LRASM"),
    ("mortar he", "Mortar_HE"),
    ("81mm he", "Mortar_HE"),
    ("mortar illum", "Mortar_Illum"),
    ("illumination", "Mortar_Illum"),
    ("illum", "Mortar_Illum"),
    ("mortar smoke", "Mortar_Smoke"),
    ("smoke", "Mortar_Smoke"),
];

/// Many-to-one mapping from lowercase phrases to type keys
#[derive(Debug, Clone)]
pub struct AliasTable {
    entries: Vec<(String, String)>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_ALIASES.iter().copied())
    }
}

impl AliasTable {
    /// Build a table; aliases are lowercased, order is preserved
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            entries: pairs
                .into_iter()
                .map(|(alias, key)| (alias.to_lowercase(), key.to_string()))
                .collect(),
        }
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Resolve free text to a canonical key.
    ///
    /// Pure function of `text`, the table and the inventory's key set.
    pub fn resolve(&self, text: &str, inventory: &Inventory) -> Option<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        let lowered = trimmed.to_lowercase();

        if let Some((_, key)) = self.entries.iter().find(|(alias, _)| *alias == lowered) {
            return Some(key.clone());
        }

        if inventory.contains(trimmed) {
            return Some(trimmed.to_string());
        }
        if let Some(key) = normalize_type_key(trimmed).filter(|k| inventory.contains(k)) {
            return Some(key);
        }

        self.entries
            .iter()
            .find(|(alias, _)| lowered.contains(alias.as_str()) || alias.contains(&lowered))
            .map(|(_, key)| key.clone())
    }
}

/// Canonical key for a type nobody has heard of yet: surrounding quotes
/// removed, whitespace runs collapsed to underscores
pub fn normalize_type_key(text: &str) -> Option<String> {
    let stripped = text.trim().trim_matches(|c: char| c == '"' || c == '\'').trim();
    let key = stripped.split_whitespace().collect::<Vec<_>>().join("_");
    (!key.is_empty()).then_some(key)
}
