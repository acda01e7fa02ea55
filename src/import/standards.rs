//! Targeting standards matrix extraction
//!
//! Layout read here:
//!
//! ```text
//! PRIORITY     | 1    |          |   | 2     | ...
//! DESCRIPTION  | IADS |          |   | C2    |
//!              | HQ-9 |          |   | ...   |   <- up to three system rows
//! HIMARS       | tol  | effects  |   | tol   | effects
//!              | size |          |   | size  |
//!              | act  |          |   | act   |
//!              | time |          |   | time  |
//! ```
//!
//! Priority columns start one right of the PRIORITY label with a stride of 3.

use serde::Serialize;

use crate::import::grid::CellGrid;

pub const PRIORITY_STRIDE: usize = 3;
pub const MAX_SYSTEM_ROWS: usize = 3;

/// Section headers recognised in the label column
pub const ATTACK_SYSTEMS: &[&str] = &[
    "HIMARS",
    "M777",
    "MORTARS",
    "NSFS",
    "CAS",
    "ATTACK HELO",
    "EW",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriorityEntry {
    pub column: usize,
    pub priority: Option<String>,
    pub description: Option<String>,
    /// Enemy systems listed under the description
    pub systems: Vec<String>,
}

impl PriorityEntry {
    fn matches(&self, category: &str) -> bool {
        let eq = |v: &Option<String>| {
            v.as_deref()
                .map(|s| s.eq_ignore_ascii_case(category.trim()))
                .unwrap_or(false)
        };
        eq(&self.priority) || eq(&self.description)
    }
}

/// Attack guidance for one (attack system, priority) cell block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttackStandard {
    pub attack_system: String,
    pub priority: Option<String>,
    pub description: Option<String>,
    pub tolerance: Option<String>,
    pub effects: Option<String>,
    pub size: Option<String>,
    pub activity: Option<String>,
    pub time: Option<String>,
}

impl AttackStandard {
    pub fn summary_line(&self) -> String {
        let field = |label: &str, v: &Option<String>| v.as_ref().map(|s| format!("{} {}", label, s));
        let details: Vec<String> = [
            field("TLE", &self.tolerance),
            field("effects", &self.effects),
            field("size", &self.size),
            field("activity", &self.activity),
            field("time", &self.time),
        ]
        .into_iter()
        .flatten()
        .collect();
        format!(
            "{} vs {}: {}",
            self.attack_system,
            self.description
                .as_deref()
                .or(self.priority.as_deref())
                .unwrap_or("?"),
            details.join(", ")
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetingStandards {
    pub entries: Vec<PriorityEntry>,
    pub matrix: Vec<AttackStandard>,
}

impl TargetingStandards {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.matrix.is_empty()
    }

    /// Look up by attack system and priority label or description
    pub fn standard(&self, attack_system: &str, category: &str) -> Option<&AttackStandard> {
        let column = self.entries.iter().find(|e| e.matches(category))?;
        self.matrix.iter().find(|s| {
            s.attack_system.eq_ignore_ascii_case(attack_system.trim())
                && s.priority == column.priority
                && s.description == column.description
        })
    }
}

/// Canonical attack system name if `text` is a section header
pub fn attack_system_header(text: &str) -> Option<&'static str> {
    let upper = text.trim().to_uppercase();
    ATTACK_SYSTEMS.iter().copied().find(|sys| {
        upper == *sys
            || (upper.starts_with(sys)
                && upper[sys.len()..]
                    .chars()
                    .next()
                    .map(|c| !c.is_alphanumeric())
                    .unwrap_or(false))
    })
}

fn label_row(grid: &CellGrid, start: usize, keyword: &str) -> Option<(usize, usize)> {
    (start..grid.height()).find_map(|r| {
        grid.first_nonblank(r)
            .filter(|(_, text)| text.to_uppercase().contains(keyword))
            .map(|(col, _)| (r, col))
    })
}

fn section_header(grid: &CellGrid, row: usize, label_col: usize) -> Option<&'static str> {
    grid.first_nonblank(row)
        .filter(|(col, _)| *col <= label_col)
        .and_then(|(_, text)| attack_system_header(text))
}

pub fn extract_standards(grid: &CellGrid) -> TargetingStandards {
    let Some((priority_row, label_col)) = label_row(grid, 0, "PRIORITY") else {
        tracing::debug!("no PRIORITY row found");
        return TargetingStandards::default();
    };
    let Some((description_row, _)) = label_row(grid, priority_row + 1, "DESCRIPTION") else {
        tracing::debug!("no DESCRIPTION row below PRIORITY");
        return TargetingStandards::default();
    };

    let mut entries = Vec::new();
    let mut col = label_col + 1;
    while col < grid.width() {
        let priority = grid.cell(priority_row, col).map(str::to_string);
        let description = grid.cell(description_row, col).map(str::to_string);
        if priority.is_some() || description.is_some() {
            let systems = (description_row + 1..=description_row + MAX_SYSTEM_ROWS)
                .take_while(|&r| section_header(grid, r, label_col).is_none())
                .filter_map(|r| grid.cell(r, col).map(str::to_string))
                .collect();
            entries.push(PriorityEntry {
                column: col,
                priority,
                description,
                systems,
            });
        }
        col += PRIORITY_STRIDE;
    }

    let mut matrix = Vec::new();
    for row in (description_row + 1)..grid.height() {
        let Some(attack_system) = section_header(grid, row, label_col) else {
            continue;
        };
        for entry in &entries {
            let c = entry.column;
            let standard = AttackStandard {
                attack_system: attack_system.to_string(),
                priority: entry.priority.clone(),
                description: entry.description.clone(),
                tolerance: grid.cell(row, c).map(str::to_string),
                effects: grid.cell(row, c + 1).map(str::to_string),
                size: grid.cell(row + 1, c).map(str::to_string),
                activity: grid.cell(row + 2, c).map(str::to_string),
                time: grid.cell(row + 3, c).map(str::to_string),
            };
            let has_data = standard.tolerance.is_some()
                || standard.effects.is_some()
                || standard.size.is_some()
                || standard.activity.is_some()
                || standard.time.is_some();
            if has_data {
                matrix.push(standard);
            }
        }
    }

    TargetingStandards { entries, matrix }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> CellGrid {
        CellGrid::from_strs(&[
            vec!["Attack Guidance Matrix", "", "", "", "", "", ""],
            vec!["Priority", "1", "", "", "2", "", ""],
            vec!["Description", "IADS", "", "", "Fires C2", "", ""],
            vec!["", "HQ-9", "", "", "PHL-16 CP", "", ""],
            vec!["", "HQ-16", "", "", "", "", ""],
            vec!["", "", "", "", "", "", ""],
            vec!["HIMARS", "100m", "Destroy", "", "50m", "Neutralize", ""],
            vec!["", "Battery", "", "", "Vehicle", "", ""],
            vec!["", "Emitting", "", "", "Stationary", "", ""],
            vec!["", "2 hrs", "", "", "30 min", "", ""],
            vec!["CAS (AV-8B)", "500m", "Suppress", "", "", "", ""],
        ])
    }

    #[test]
    fn test_priority_entries_with_systems() {
        let standards = extract_standards(&sheet());
        assert_eq!(standards.entries.len(), 2);
        assert_eq!(standards.entries[0].priority.as_deref(), Some("1"));
        assert_eq!(standards.entries[0].systems, vec!["HQ-9", "HQ-16"]);
        assert_eq!(standards.entries[1].description.as_deref(), Some("Fires C2"));
        assert_eq!(standards.entries[1].systems, vec!["PHL-16 CP"]);
    }

    #[test]
    fn test_attack_matrix_blocks() {
        let standards = extract_standards(&sheet());
        assert_eq!(standards.matrix.len(), 3);

        let himars_iads = standards.standard("himars", "IADS").unwrap();
        assert_eq!(himars_iads.tolerance.as_deref(), Some("100m"));
        assert_eq!(himars_iads.effects.as_deref(), Some("Destroy"));
        assert_eq!(himars_iads.size.as_deref(), Some("Battery"));
        assert_eq!(himars_iads.activity.as_deref(), Some("Emitting"));
        assert_eq!(himars_iads.time.as_deref(), Some("2 hrs"));

        let himars_c2 = standards.standard("HIMARS", "2").unwrap();
        assert_eq!(himars_c2.effects.as_deref(), Some("Neutralize"));

        let cas = standards.standard("CAS", "1").unwrap();
        assert_eq!(cas.effects.as_deref(), Some("Suppress"));
        assert!(standards.standard("CAS", "Fires C2").is_none());
    }

    #[test]
    fn test_attack_system_header_vocabulary() {
        assert_eq!(attack_system_header("Attack Helo"), Some("ATTACK HELO"));
        assert_eq!(attack_system_header("CAS (AV-8B)"), Some("CAS"));
        assert_eq!(attack_system_header("Casualty"), None);
        assert_eq!(attack_system_header("EWO"), None);
    }

    #[test]
    fn test_missing_description_row() {
        let grid = CellGrid::from_strs(&[vec!["Priority", "1"], vec!["HIMARS", "100m"]]);
        assert!(extract_standards(&grid).is_empty());
    }

    #[test]
    fn test_summary_line() {
        let standards = extract_standards(&sheet());
        let line = standards.matrix[0].summary_line();
        assert_eq!(
            line,
            "HIMARS vs IADS: TLE 100m, effects Destroy, size Battery, activity Emitting, time 2 hrs"
        );
    }
}
