//! Inventory - per-session ammunition state
//!
//! Records keep insertion order (preset declaration order, then types created
//! by loadout directives) so everything rendered from them is deterministic.
//! The invariant `0 <= current <= max` holds after every operation; inputs
//! that would break it are clamped, never rejected.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::StatusTier;
use crate::directive::ChangeSummary;
use crate::inventory::preset::LoadoutPreset;

/// Unit label given to ammunition types created by a loadout directive
pub const DEFAULT_UNIT_LABEL: &str = "rounds";

/// A current/max pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmoLevel {
    pub current: u32,
    pub max: u32,
}

impl AmmoLevel {
    pub fn new(current: u32, max: u32) -> Self {
        Self { current, max }
    }

    /// Percentage remaining; an empty (max 0) entry reads as 0%
    pub fn percentage(&self) -> f64 {
        if self.max == 0 {
            0.0
        } else {
            self.current as f64 / self.max as f64 * 100.0
        }
    }

    pub fn tier(&self) -> StatusTier {
        StatusTier::from_percentage(self.percentage())
    }
}

/// One ammunition type held by the session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmmoRecord {
    pub type_key: String,
    pub current: u32,
    pub max: u32,
    pub unit_label: String,
}

impl AmmoRecord {
    pub fn level(&self) -> AmmoLevel {
        AmmoLevel::new(self.current, self.max)
    }

    /// Type key with underscores shown as spaces
    pub fn display_name(&self) -> String {
        self.type_key.replace('_', " ")
    }
}

/// A change already resolved to a canonical type key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryChange {
    /// current' = max(0, current - amount)
    Expend { type_key: String, amount: u32 },
    /// current' = clamp(amount, 0, max)
    SetRemaining { type_key: String, amount: u32 },
    /// current' = max' = amount; creates the type if absent
    LoadoutSet { type_key: String, amount: u32 },
    /// current' += amount, max' += amount; creates the type if absent
    LoadoutAdd { type_key: String, amount: u32 },
    /// Every current and max goes to zero
    ClearAll,
}

/// Ammunition inventory for one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    records: Vec<AmmoRecord>,
    #[serde(skip)]
    index: AHashMap<String, usize>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh inventory from a preset, every type at full load
    pub fn from_preset(preset: &LoadoutPreset) -> Self {
        let mut inventory = Self::new();
        for entry in preset.entries {
            inventory.insert(AmmoRecord {
                type_key: entry.type_key.to_string(),
                current: entry.max,
                max: entry.max,
                unit_label: entry.unit_label.to_string(),
            });
        }
        inventory
    }

    fn insert(&mut self, record: AmmoRecord) -> usize {
        if let Some(&idx) = self.index.get(&record.type_key) {
            self.records[idx] = record;
            return idx;
        }
        let idx = self.records.len();
        self.index.insert(record.type_key.clone(), idx);
        self.records.push(record);
        idx
    }

    /// Rebuild the key index (needed after deserializing)
    pub fn reindex(&mut self) {
        self.index = self
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.type_key.clone(), i))
            .collect();
    }

    pub fn get(&self, type_key: &str) -> Option<&AmmoRecord> {
        self.index.get(type_key).map(|&i| &self.records[i])
    }

    pub fn contains(&self, type_key: &str) -> bool {
        self.index.contains_key(type_key)
    }

    /// Records in insertion order
    pub fn records(&self) -> &[AmmoRecord] {
        &self.records
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.type_key.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Apply a resolved change.
    ///
    /// Returns None when the change targets a type the inventory never
    /// issued (expend / set-remaining only) or when nothing was cleared.
    pub fn apply(&mut self, change: InventoryChange) -> Option<ChangeSummary> {
        match change {
            InventoryChange::Expend { type_key, amount } => self.expend(&type_key, amount),
            InventoryChange::SetRemaining { type_key, amount } => {
                self.set_remaining(&type_key, amount)
            }
            InventoryChange::LoadoutSet { type_key, amount } => {
                Some(self.loadout_set(&type_key, amount))
            }
            InventoryChange::LoadoutAdd { type_key, amount } => {
                Some(self.loadout_add(&type_key, amount))
            }
            InventoryChange::ClearAll => self.clear_all(),
        }
    }

    pub fn expend(&mut self, type_key: &str, amount: u32) -> Option<ChangeSummary> {
        let idx = *self.index.get(type_key)?;
        let record = &mut self.records[idx];
        let before = record.level();
        record.current = record.current.saturating_sub(amount);
        Some(ChangeSummary::ammo(record, before))
    }

    /// Also backs manual edits from the UI
    pub fn set_remaining(&mut self, type_key: &str, amount: u32) -> Option<ChangeSummary> {
        let idx = *self.index.get(type_key)?;
        let record = &mut self.records[idx];
        let before = record.level();
        record.current = amount.min(record.max);
        Some(ChangeSummary::ammo(record, before))
    }

    pub fn loadout_set(&mut self, type_key: &str, amount: u32) -> ChangeSummary {
        let idx = self.entry(type_key);
        let record = &mut self.records[idx];
        let before = record.level();
        record.current = amount;
        record.max = amount;
        ChangeSummary::ammo(record, before)
    }

    pub fn loadout_add(&mut self, type_key: &str, amount: u32) -> ChangeSummary {
        let idx = self.entry(type_key);
        let record = &mut self.records[idx];
        let before = record.level();
        record.current = record.current.saturating_add(amount);
        record.max = record.max.saturating_add(amount);
        // saturation on max alone could leave current above it
        record.current = record.current.min(record.max);
        ChangeSummary::ammo(record, before)
    }

    pub fn clear_all(&mut self) -> Option<ChangeSummary> {
        if self.records.is_empty() {
            return None;
        }
        for record in &mut self.records {
            record.current = 0;
            record.max = 0;
        }
        Some(ChangeSummary::LoadoutCleared {
            entries: self.records.len(),
        })
    }

    fn entry(&mut self, type_key: &str) -> usize {
        match self.index.get(type_key) {
            Some(&idx) => idx,
            None => self.insert(AmmoRecord {
                type_key: type_key.to_string(),
                current: 0,
                max: 0,
                unit_label: DEFAULT_UNIT_LABEL.to_string(),
            }),
        }
    }
}
