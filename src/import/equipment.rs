//! Equipment density extraction
//!
//! Columns come in groups of four (unit, end item, quantity, spacer) starting
//! at the first UNIT header. A unit name carries down its group's rows until
//! the next non-blank unit cell.

use serde::Serialize;

use crate::import::grid::CellGrid;

/// Columns per unit group
pub const GROUP_STRIDE: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EquipmentEntry {
    pub unit_name: String,
    pub item_name: String,
    pub quantity: Option<String>,
}

fn find_anchor(grid: &CellGrid) -> Option<usize> {
    grid.find_row(0, |r| {
        let text = grid.row_text(r);
        text.contains("UNIT") && text.contains("END ITEM")
    })
}

fn is_unit_header(grid: &CellGrid, row: usize, col: usize) -> bool {
    grid.cell(row, col)
        .map(|s| s.to_uppercase().contains("UNIT"))
        .unwrap_or(false)
}

pub fn extract_equipment(grid: &CellGrid) -> Vec<EquipmentEntry> {
    let Some(anchor) = find_anchor(grid) else {
        tracing::debug!("no equipment density header found");
        return Vec::new();
    };
    let Some(origin) = (0..grid.width()).find(|&c| is_unit_header(grid, anchor, c)) else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    let mut group = origin;
    while group < grid.width() && is_unit_header(grid, anchor, group) {
        let mut current_unit: Option<&str> = None;
        for row in (anchor + 1)..grid.height() {
            if let Some(unit) = grid.cell(row, group) {
                current_unit = Some(unit);
            }
            let Some(item) = grid.cell(row, group + 1) else {
                continue;
            };
            if item.eq_ignore_ascii_case("END ITEM") {
                continue;
            }
            let Some(unit) = current_unit else {
                tracing::debug!("item {} at row {} has no unit", item, row);
                continue;
            };
            entries.push(EquipmentEntry {
                unit_name: unit.to_string(),
                item_name: item.to_string(),
                quantity: grid.cell(row, group + 2).map(str::to_string),
            });
        }
        group += GROUP_STRIDE;
    }
    entries
}

/// Entries grouped by unit, units in first-seen order
pub fn group_by_unit(entries: &[EquipmentEntry]) -> Vec<(&str, Vec<&EquipmentEntry>)> {
    let mut groups: Vec<(&str, Vec<&EquipmentEntry>)> = Vec::new();
    for entry in entries {
        match groups.iter_mut().find(|(unit, _)| *unit == entry.unit_name) {
            Some((_, items)) => items.push(entry),
            None => groups.push((entry.unit_name.as_str(), vec![entry])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_name_carries_forward() {
        let grid = CellGrid::from_strs(&[
            vec!["Unit", "End Item", "Qty"],
            vec!["1/11 Btry A", "M777A2", "6"],
            vec!["", "MTVR", "8"],
            vec!["", "HMMWV", "4"],
        ]);
        let entries = extract_equipment(&grid);
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.unit_name == "1/11 Btry A"));
        assert_eq!(entries[1].item_name, "MTVR");
        assert_eq!(entries[2].quantity.as_deref(), Some("4"));
    }

    #[test]
    fn test_multiple_groups_and_unit_change() {
        let grid = CellGrid::from_strs(&[
            vec!["Density", "", "", "", "", "", "", ""],
            vec!["Unit", "End Item", "Qty", "", "Unit", "End Item", "Qty", ""],
            vec!["Btry A", "M777", "6", "", "5/11 Btry R", "HIMARS", "6", ""],
            vec!["", "MTVR", "", "", "", "RSV", "3", ""],
            vec!["Btry B", "M777", "6", "", "", "", "", ""],
        ]);
        let entries = extract_equipment(&grid);
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[1].unit_name, "Btry A");
        assert_eq!(entries[1].quantity, None);
        assert_eq!(entries[2].unit_name, "Btry B");
        assert_eq!(entries[4].unit_name, "5/11 Btry R");
        assert_eq!(entries[4].item_name, "RSV");

        let groups = group_by_unit(&entries);
        let names: Vec<&str> = groups.iter().map(|(u, _)| *u).collect();
        assert_eq!(names, vec!["Btry A", "Btry B", "5/11 Btry R"]);
        assert_eq!(groups[0].1.len(), 2);
    }

    #[test]
    fn test_items_before_any_unit_skipped() {
        let grid = CellGrid::from_strs(&[
            vec!["Unit", "End Item"],
            vec!["", "Orphan"],
            vec!["Btry C", "M777"],
        ]);
        let entries = extract_equipment(&grid);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].item_name, "M777");
    }

    #[test]
    fn test_no_anchor_is_empty() {
        let grid = CellGrid::from_strs(&[vec!["Target", "Description"]]);
        assert!(extract_equipment(&grid).is_empty());
    }
}
