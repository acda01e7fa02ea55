//! Serialize session state into the context blocks of the system prompt
//!
//! Output is deterministic: inventory follows the ammunition category table,
//! map units follow insertion order (blue before red), imported records
//! follow sheet order. Large collections are capped with an "...and N more"
//! line so the prompt stays inside the model's budget.

use crate::core::config::config;
use crate::core::types::Allegiance;
use crate::import::equipment::group_by_unit;
use crate::import::opord::truncate_chars;
use crate::import::DocumentStore;
use crate::inventory::preset::{category_of, AMMO_CATEGORIES, OTHER_CATEGORY};
use crate::inventory::record::{AmmoRecord, Inventory};
use crate::map::MapModel;

/// Per-block line limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextCaps {
    pub max_target_lines: usize,
    pub max_equipment_lines: usize,
    pub max_map_units: usize,
    pub max_opord_tasks: usize,
    /// Coordination measures and ammunition allocations, each
    pub max_opord_lines: usize,
    pub max_intent_chars: usize,
}

impl Default for ContextCaps {
    fn default() -> Self {
        let cfg = config();
        Self {
            max_target_lines: cfg.max_target_lines,
            max_equipment_lines: cfg.max_equipment_lines,
            max_map_units: cfg.max_map_units,
            max_opord_tasks: cfg.max_opord_tasks,
            max_opord_lines: cfg.max_opord_lines,
            max_intent_chars: cfg.max_intent_chars,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContextSerializer {
    caps: ContextCaps,
}

impl ContextSerializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_caps(caps: ContextCaps) -> Self {
        Self { caps }
    }

    /// Full context: inventory always, the other blocks when they have content
    pub fn serialize(
        &self,
        inventory: &Inventory,
        map: Option<&MapModel>,
        documents: Option<&DocumentStore>,
    ) -> String {
        let mut blocks = vec![self.inventory_block(inventory)];
        if let Some(block) = map.and_then(|m| self.map_block(m)) {
            blocks.push(block);
        }
        if let Some(docs) = documents {
            blocks.extend(self.document_blocks(docs));
        }
        blocks.join("\n\n")
    }

    pub fn inventory_block(&self, inventory: &Inventory) -> String {
        let mut lines = vec!["Current ammunition status:".to_string()];
        if inventory.is_empty() {
            lines.push("- (no ammunition loaded)".to_string());
            return lines.join("\n");
        }

        let category_names = AMMO_CATEGORIES
            .iter()
            .map(|(name, _)| *name)
            .chain(std::iter::once(OTHER_CATEGORY));
        for category in category_names {
            let members: Vec<&AmmoRecord> = inventory
                .records()
                .iter()
                .filter(|r| category_of(&r.type_key) == category)
                .collect();
            if members.is_empty() {
                continue;
            }
            lines.push(format!("{}:", category));
            lines.extend(members.into_iter().map(status_line));
        }
        lines.join("\n")
    }

    pub fn map_block(&self, map: &MapModel) -> Option<String> {
        if map.is_empty() {
            return None;
        }
        let units = map
            .units_of(Allegiance::Blue)
            .chain(map.units_of(Allegiance::Red))
            .map(|u| {
                let ring = map
                    .threat_radius(u.allegiance, &u.system_type)
                    .map(|km| format!(" [ring {} km]", km))
                    .unwrap_or_default();
                format!(
                    "[{}] {} ({}) at {:.4}, {:.4}{}",
                    u.allegiance, u.name, u.system_type, u.latitude, u.longitude, ring
                )
            });

        let mut lines = vec![format!("Map overlay ({} units):", map.len())];
        lines.extend(capped(units, self.caps.max_map_units));
        Some(lines.join("\n"))
    }

    pub fn document_blocks(&self, documents: &DocumentStore) -> Vec<String> {
        let mut blocks = Vec::new();

        let targets = documents.targets();
        if !targets.is_empty() {
            let mut lines = vec![format!("Target list ({} targets):", targets.len())];
            lines.extend(capped(
                targets.iter().map(|t| t.summary_line()),
                self.caps.max_target_lines,
            ));
            blocks.push(lines.join("\n"));
        }

        let equipment = documents.equipment();
        if !equipment.is_empty() {
            let groups = group_by_unit(equipment);
            let mut lines = vec![format!("Equipment density ({} units):", groups.len())];
            lines.extend(capped(
                groups.into_iter().map(|(unit, items)| {
                    let items: Vec<String> = items
                        .iter()
                        .map(|e| match &e.quantity {
                            Some(q) => format!("{} x{}", e.item_name, q),
                            None => e.item_name.clone(),
                        })
                        .collect();
                    format!("{}: {}", unit, items.join(", "))
                }),
                self.caps.max_equipment_lines,
            ));
            blocks.push(lines.join("\n"));
        }

        let standards = documents.standards();
        if !standards.is_empty() {
            let mut lines = vec!["Targeting standards:".to_string()];
            lines.extend(capped(
                standards.entries.iter().map(|entry| {
                    let mut line = format!(
                        "Priority {}: {}",
                        entry.priority.as_deref().unwrap_or("-"),
                        entry.description.as_deref().unwrap_or("-")
                    );
                    if !entry.systems.is_empty() {
                        line.push_str(&format!(" ({})", entry.systems.join(", ")));
                    }
                    line
                }),
                self.caps.max_target_lines,
            ));
            lines.extend(capped(
                standards.matrix.iter().map(|s| s.summary_line()),
                self.caps.max_target_lines,
            ));
            blocks.push(lines.join("\n"));
        }

        if let Some(opord) = documents.opord() {
            let info = &opord.document_info;
            let title = info
                .title
                .as_deref()
                .or(info.operation_name.as_deref())
                .unwrap_or("untitled");
            let mut lines = vec![match &info.unit {
                Some(unit) => format!("Operation order: {} ({})", title, unit),
                None => format!("Operation order: {}", title),
            }];
            if let Some(intent) = &opord.commanders_intent {
                let intent = intent.to_string();
                let kept = truncate_chars(&intent, self.caps.max_intent_chars);
                let ellipsis = if kept.len() < intent.len() { "..." } else { "" };
                lines.push(format!("Commander's intent: {}{}", kept, ellipsis));
            }
            if !opord.tasks.is_empty() {
                lines.push("Fire support tasks:".to_string());
                lines.extend(capped(
                    opord.tasks.iter().map(|t| t.summary_line()),
                    self.caps.max_opord_tasks,
                ));
            }
            if !opord.coordination_measures.is_empty() {
                lines.push("Coordination measures:".to_string());
                lines.extend(capped(
                    opord.coordination_measures.iter().map(|m| {
                        let parts: Vec<&str> = [&m.kind, &m.name, &m.location, &m.description]
                            .into_iter()
                            .filter_map(|p| p.as_deref())
                            .collect();
                        parts.join(" ")
                    }),
                    self.caps.max_opord_lines,
                ));
            }
            if !opord.ammunition_allocation.is_empty() {
                lines.push("Ammunition allocation:".to_string());
                let allocations = opord.ammunition_allocation.iter().map(|a| {
                    let item = a.item.as_deref().unwrap_or("unspecified");
                    let qty = a
                        .quantity
                        .as_ref()
                        .map(|q| format!(": {}", q))
                        .unwrap_or_default();
                    let unit = a
                        .unit
                        .as_deref()
                        .map(|u| format!(" ({})", u))
                        .unwrap_or_default();
                    format!("{}{}{}", item, qty, unit)
                });
                lines.extend(capped(allocations, self.caps.max_opord_lines));
            }
            blocks.push(lines.join("\n"));
        }

        blocks
    }
}

/// "- GMLRS: 84/108 rockets (78%) [GREEN]"
pub fn status_line(record: &AmmoRecord) -> String {
    let level = record.level();
    format!(
        "- {}: {}/{} {} ({:.0}%) [{}]",
        record.display_name(),
        record.current,
        record.max,
        record.unit_label,
        level.percentage(),
        level.tier()
    )
}

/// Bullet lines, at most `cap`, with an overflow line for the rest
fn capped<I>(lines: I, cap: usize) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out = Vec::new();
    let mut hidden = 0usize;
    for (i, line) in lines.into_iter().enumerate() {
        if i < cap {
            out.push(format!("- {}", line));
        } else {
            hidden += 1;
        }
    }
    if hidden > 0 {
        out.push(format!("...and {} more", hidden));
    }
    out
}
