//! Target list extraction
//!
//! Anchor: first row whose text contains both TARGET and DESCRIPTION. The row
//! below it is a sub-header; data starts two rows down.

use serde::Serialize;

use crate::import::grid::CellGrid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetEntry {
    pub line: Option<String>,
    pub target_number: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub remarks: Option<String>,
    /// Other labeled columns, in sheet order
    pub extras: Vec<(String, String)>,
}

impl TargetEntry {
    /// One-line rendering for the model context
    pub fn summary_line(&self) -> String {
        let mut parts = Vec::new();
        if let Some(tgt) = &self.target_number {
            parts.push(tgt.clone());
        }
        if let Some(desc) = &self.description {
            parts.push(desc.clone());
        }
        if let Some(loc) = &self.location {
            parts.push(format!("@ {}", loc));
        }
        if let Some(remarks) = &self.remarks {
            parts.push(format!("({})", remarks));
        }
        for (label, value) in &self.extras {
            parts.push(format!("{}: {}", label, value));
        }
        parts.join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Line,
    Target,
    Description,
    Location,
    Remarks,
}

const COLUMNS: [Column; 5] = [
    Column::Line,
    Column::Target,
    Column::Description,
    Column::Location,
    Column::Remarks,
];

impl Column {
    fn classify(label: &str) -> Option<Self> {
        let label = label.to_uppercase();
        // DESCRIPTION before TARGET: "Target Description" is a description
        if label.contains("DESCRIPTION") {
            Some(Self::Description)
        } else if label.contains("LOCATION") || label.contains("GRID") {
            Some(Self::Location)
        } else if label.contains("REMARK") {
            Some(Self::Remarks)
        } else if label.contains("TARGET") || label.contains("TGT") {
            Some(Self::Target)
        } else if label.contains("LINE") {
            Some(Self::Line)
        } else {
            None
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Default)]
struct ColumnMap {
    roles: [Option<usize>; 5],
    extras: Vec<(usize, String)>,
}

impl ColumnMap {
    fn from_header(grid: &CellGrid, anchor: usize) -> Self {
        let mut map = Self::default();
        for col in 0..grid.width() {
            let Some(label) = grid.cell(anchor, col) else {
                continue;
            };
            match Column::classify(label) {
                Some(role) if map.roles[role.index()].is_none() => {
                    map.roles[role.index()] = Some(col);
                }
                _ => map.extras.push((col, label.to_string())),
            }
        }

        // Unlabeled roles take their conventional position if it is free
        for role in COLUMNS {
            let pos = role.index();
            if map.roles[role.index()].is_none() && !map.claims(pos) {
                map.roles[role.index()] = Some(pos);
            }
        }
        map
    }

    fn claims(&self, col: usize) -> bool {
        self.roles.contains(&Some(col)) || self.extras.iter().any(|(c, _)| *c == col)
    }

    fn read(&self, grid: &CellGrid, row: usize, role: Column) -> Option<String> {
        self.roles[role.index()]
            .and_then(|c| grid.cell(row, c))
            .map(str::to_string)
    }
}

fn find_anchor(grid: &CellGrid) -> Option<usize> {
    grid.find_row(0, |r| {
        let text = grid.row_text(r);
        text.contains("TARGET") && text.contains("DESCRIPTION")
    })
}

/// Extract target list rows. A sheet without the anchor yields nothing.
pub fn extract_targets(grid: &CellGrid) -> Vec<TargetEntry> {
    let Some(anchor) = find_anchor(grid) else {
        tracing::debug!("no target list header found");
        return Vec::new();
    };
    let columns = ColumnMap::from_header(grid, anchor);

    let mut targets = Vec::new();
    for row in (anchor + 2)..grid.height() {
        if grid.is_blank(row, 0) && grid.is_blank(row, 1) {
            continue;
        }

        let entry = TargetEntry {
            line: columns.read(grid, row, Column::Line),
            target_number: columns.read(grid, row, Column::Target),
            description: columns.read(grid, row, Column::Description),
            location: columns.read(grid, row, Column::Location),
            remarks: columns.read(grid, row, Column::Remarks),
            extras: columns
                .extras
                .iter()
                .filter_map(|(c, label)| {
                    grid.cell(row, *c).map(|v| (label.clone(), v.to_string()))
                })
                .collect(),
        };

        if entry.target_number.is_some() || entry.description.is_some() {
            targets.push(entry);
        }
    }
    targets
}
