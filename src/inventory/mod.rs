//! Ammunition inventory: records, presets, alias and platform lookup

pub mod alias;
pub mod platform;
pub mod preset;
pub mod record;

pub use alias::AliasTable;
pub use platform::{PlatformLoad, PlatformTable};
pub use preset::{category_of, default_preset, find_preset, LoadoutPreset, PresetSelection};
pub use record::{AmmoLevel, AmmoRecord, Inventory, InventoryChange};
