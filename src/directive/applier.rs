//! Directive application - resolves raw directive text and mutates state
//!
//! Anything that cannot be resolved (unknown ammunition, unknown platform,
//! bad coordinates, unknown allegiance) is dropped without touching state.

use crate::core::types::Allegiance;
use crate::directive::{ChangeSummary, ClearScope, Directive};
use crate::inventory::alias::{normalize_type_key, AliasTable};
use crate::inventory::platform::PlatformTable;
use crate::inventory::record::{Inventory, InventoryChange};
use crate::map::coord::{parse_coordinates, GridConverter};
use crate::map::{MapModel, MapUnit};

/// Applies parsed directives to an inventory and map
pub struct DirectiveApplier<'a> {
    aliases: &'a AliasTable,
    platforms: PlatformTable,
    grid: Option<&'a dyn GridConverter>,
}

impl<'a> DirectiveApplier<'a> {
    pub fn new(aliases: &'a AliasTable) -> Self {
        Self {
            aliases,
            platforms: PlatformTable::default(),
            grid: None,
        }
    }

    /// Enable grid-reference coordinates in map directives
    pub fn with_grid_converter(mut self, grid: &'a dyn GridConverter) -> Self {
        self.grid = Some(grid);
        self
    }

    /// Apply every directive in order; one summary per real change
    pub fn apply_all(
        &self,
        directives: &[Directive],
        inventory: &mut Inventory,
        map: &mut MapModel,
    ) -> Vec<ChangeSummary> {
        let mut summaries = Vec::new();
        for directive in directives {
            let applied = self.apply(directive, inventory, map);
            if applied.is_empty() {
                tracing::debug!("dropped directive {:?}", directive);
            }
            summaries.extend(applied);
        }
        if !summaries.is_empty() {
            tracing::info!("applied {} change(s) from response", summaries.len());
        }
        summaries
    }

    /// Apply a single directive
    pub fn apply(
        &self,
        directive: &Directive,
        inventory: &mut Inventory,
        map: &mut MapModel,
    ) -> Vec<ChangeSummary> {
        match directive {
            Directive::AmmoExpend { item_text, amount } => self
                .resolve_existing(item_text, inventory)
                .and_then(|type_key| {
                    inventory.apply(InventoryChange::Expend {
                        type_key,
                        amount: *amount,
                    })
                })
                .into_iter()
                .collect(),
            Directive::AmmoSetRemaining { item_text, amount } => self
                .resolve_existing(item_text, inventory)
                .and_then(|type_key| {
                    inventory.apply(InventoryChange::SetRemaining {
                        type_key,
                        amount: *amount,
                    })
                })
                .into_iter()
                .collect(),
            Directive::LoadoutSet { item_text, amount } => self
                .resolve_or_create(item_text, inventory)
                .and_then(|type_key| {
                    inventory.apply(InventoryChange::LoadoutSet {
                        type_key,
                        amount: *amount,
                    })
                })
                .into_iter()
                .collect(),
            Directive::LoadoutAdd { item_text, amount } => self
                .resolve_or_create(item_text, inventory)
                .and_then(|type_key| {
                    inventory.apply(InventoryChange::LoadoutAdd {
                        type_key,
                        amount: *amount,
                    })
                })
                .into_iter()
                .collect(),
            Directive::LoadoutPlatform {
                platform_text,
                count,
            } => self.apply_platform(platform_text, *count, inventory),
            Directive::LoadoutClearAll => inventory
                .apply(InventoryChange::ClearAll)
                .into_iter()
                .collect(),
            Directive::MapAdd {
                name,
                coord_text,
                allegiance_text,
                system,
            } => self
                .plot(name, coord_text, allegiance_text, system, map)
                .into_iter()
                .collect(),
            Directive::MapRemove { name } => {
                let count = map.remove(name);
                (count > 0)
                    .then(|| ChangeSummary::UnitsRemoved {
                        name: name.clone(),
                        count,
                    })
                    .into_iter()
                    .collect()
            }
            Directive::MapClear { allegiance_text } => {
                let Some(scope) = clear_scope(allegiance_text.as_deref()) else {
                    return Vec::new();
                };
                let count = match scope {
                    ClearScope::All => map.clear(None),
                    ClearScope::Only(a) => map.clear(Some(a)),
                };
                (count > 0)
                    .then_some(ChangeSummary::MapCleared { scope, count })
                    .into_iter()
                    .collect()
            }
        }
    }

    fn resolve_existing(&self, item_text: &str, inventory: &Inventory) -> Option<String> {
        self.aliases.resolve(item_text, inventory)
    }

    /// Loadout directives may define new types when resolution fails
    fn resolve_or_create(&self, item_text: &str, inventory: &Inventory) -> Option<String> {
        self.aliases
            .resolve(item_text, inventory)
            .or_else(|| normalize_type_key(item_text))
    }

    fn apply_platform(
        &self,
        platform_text: &str,
        count: u32,
        inventory: &mut Inventory,
    ) -> Vec<ChangeSummary> {
        let Some(platform) = self.platforms.resolve(platform_text) else {
            return Vec::new();
        };
        tracing::debug!("{} resolved to platform {}", platform_text, platform.name);
        platform
            .basic_load
            .iter()
            .map(|(type_key, per_platform)| {
                inventory.loadout_set(type_key, per_platform.saturating_mul(count))
            })
            .collect()
    }

    fn plot(
        &self,
        name: &str,
        coord_text: &str,
        allegiance_text: &str,
        system: &str,
        map: &mut MapModel,
    ) -> Option<ChangeSummary> {
        let allegiance = Allegiance::parse(allegiance_text)?;
        let (latitude, longitude) = parse_coordinates(coord_text, self.grid)?;
        let unit = MapUnit::new(name, latitude, longitude, allegiance, system);
        let replaced = map.add(unit);
        Some(ChangeSummary::UnitPlotted {
            name: name.to_string(),
            allegiance,
            system: system.to_string(),
            latitude,
            longitude,
            replaced,
        })
    }
}

fn clear_scope(allegiance_text: Option<&str>) -> Option<ClearScope> {
    match allegiance_text {
        None => Some(ClearScope::All),
        Some(t) if t.trim().eq_ignore_ascii_case("all") => Some(ClearScope::All),
        Some(t) => Allegiance::parse(t).map(ClearScope::Only),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::preset::default_preset;

    fn apply(text: &str, inventory: &mut Inventory, map: &mut MapModel) -> Vec<ChangeSummary> {
        let aliases = AliasTable::default();
        let directives = crate::directive::DirectiveParser::parse(text);
        DirectiveApplier::new(&aliases).apply_all(&directives, inventory, map)
    }

    #[test]
    fn test_expend_resolves_alias() {
        let mut inv = Inventory::from_preset(default_preset());
        let mut map = MapModel::new();
        let out = apply(
            "[AMMO_UPDATE] ITEM: 81mm HE EXPENDED: 20 [/AMMO_UPDATE]",
            &mut inv,
            &mut map,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(inv.get("Mortar_HE").unwrap().current, 180);
    }

    #[test]
    fn test_expend_unknown_item_dropped() {
        let mut inv = Inventory::from_preset(default_preset());
        let before = inv.clone();
        let mut map = MapModel::new();
        let out = apply(
            "[AMMO_UPDATE] ITEM: Hellfire EXPENDED: 2 [/AMMO_UPDATE]",
            &mut inv,
            &mut map,
        );
        assert!(out.is_empty());
        assert_eq!(inv, before);
    }

    #[test]
    fn test_loadout_set_synthesizes_key() {
        let mut inv = Inventory::new();
        let mut map = MapModel::new();
        apply(
            "[LOADOUT_UPDATE] TYPE: Block V Tomahawk SET: 12 [/LOADOUT_UPDATE]\n\
             [LOADOUT_UPDATE] TYPE: Naval Strike Missile ADD: 8 [/LOADOUT_UPDATE]",
            &mut inv,
            &mut map,
        );
        // "tomahawk" is an alias, so the first lands on VLS_Cells
        assert_eq!(inv.get("VLS_Cells").unwrap().max, 12);
        assert_eq!(inv.get("Naval_Strike_Missile").unwrap().current, 8);
    }

    #[test]
    fn test_platform_count_expands_basic_load() {
        let mut inv = Inventory::new();
        let mut map = MapModel::new();
        let out = apply(
            "[LOADOUT_UPDATE] PLATFORM: HIMARS COUNT: 4 [/LOADOUT_UPDATE]",
            &mut inv,
            &mut map,
        );
        assert_eq!(out.len(), 3);
        assert_eq!(inv.get("GMLRS").unwrap().max, 72);
        assert_eq!(inv.get("ATACMS").unwrap().current, 8);
        assert_eq!(inv.get("PrSM").unwrap().max, 16);

        let out = apply(
            "[LOADOUT_UPDATE] UNIT: Carrier Air Wing COUNT: 1 [/LOADOUT_UPDATE]",
            &mut inv,
            &mut map,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_map_add_remove_clear() {
        let mut inv = Inventory::new();
        let mut map = MapModel::new();
        let out = apply(
            r#"[MAP_UPDATE] ACTION: ADD NAME: "SAM 1" COORD: 15.5, 120.3 FORCE: RED SYSTEM: HQ-9 [/MAP_UPDATE]
[MAP_UPDATE] ACTION: ADD NAME: "SAM 1" COORD: 15.6 120.4 FORCE: red SYSTEM: HQ-9 [/MAP_UPDATE]
[MAP_UPDATE] ACTION: ADD NAME: "Btry A" COORD: 14.9, 120.1 FORCE: blue SYSTEM: HIMARS [/MAP_UPDATE]"#,
            &mut inv,
            &mut map,
        );
        assert_eq!(out.len(), 3);
        assert_eq!(map.len(), 3);

        let out = apply(
            r#"[MAP_UPDATE] ACTION: REMOVE NAME: "SAM 1" [/MAP_UPDATE]"#,
            &mut inv,
            &mut map,
        );
        assert_eq!(
            out,
            vec![ChangeSummary::UnitsRemoved {
                name: "SAM 1".into(),
                count: 2
            }]
        );

        let out = apply(
            "[MAP_UPDATE] ACTION: CLEAR FORCE: red [/MAP_UPDATE]",
            &mut inv,
            &mut map,
        );
        assert!(out.is_empty(), "nothing red left to clear");
        assert_eq!(map.len(), 1);

        apply("[MAP_UPDATE] ACTION: CLEAR FORCE: ALL [/MAP_UPDATE]", &mut inv, &mut map);
        assert!(map.is_empty());
    }

    #[test]
    fn test_map_add_with_bad_coordinates_or_force_dropped() {
        let mut inv = Inventory::new();
        let mut map = MapModel::new();
        let out = apply(
            r#"[MAP_UPDATE] ACTION: ADD NAME: "X" COORD: 200, 50 FORCE: red SYSTEM: HQ-9 [/MAP_UPDATE]
[MAP_UPDATE] ACTION: ADD NAME: "Y" COORD: 10, 50 FORCE: green SYSTEM: HQ-9 [/MAP_UPDATE]
[MAP_UPDATE] ACTION: CLEAR FORCE: purple [/MAP_UPDATE]"#,
            &mut inv,
            &mut map,
        );
        assert!(out.is_empty());
        assert!(map.is_empty());
    }

    #[test]
    fn test_normalize_type_key() {
        assert_eq!(normalize_type_key("  New  Missile X "), Some("New_Missile_X".into()));
        assert_eq!(normalize_type_key("\"JAGM\""), Some("JAGM".into()));
        assert_eq!(normalize_type_key(" \"\" "), None);
    }
}
