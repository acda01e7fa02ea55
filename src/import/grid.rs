//! Bounds-checked spreadsheet cell grid shared by the tabular extractors

use serde_json::Value;

use crate::core::error::ImportError;

/// Rows x columns of optional cell text. Rows may be ragged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellGrid {
    rows: Vec<Vec<Option<String>>>,
}

impl CellGrid {
    pub fn from_rows(rows: Vec<Vec<Option<String>>>) -> Self {
        Self { rows }
    }

    /// Build from string rows; empty strings become blank cells
    pub fn from_strs<R: AsRef<[&'static str]>>(rows: &[R]) -> Self {
        let rows = rows
            .iter()
            .map(|row| {
                row.as_ref()
                    .iter()
                    .map(|s| (!s.is_empty()).then(|| s.to_string()))
                    .collect()
            })
            .collect();
        Self { rows }
    }

    /// Parse a JSON array of row arrays. Numbers and booleans become text,
    /// nulls become blank cells.
    pub fn from_json(text: &str) -> Result<Self, ImportError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| ImportError::InvalidJson(e.to_string()))?;
        let Value::Array(rows) = value else {
            return Err(ImportError::InvalidJson("expected an array of rows".into()));
        };

        let rows = rows
            .into_iter()
            .map(|row| match row {
                Value::Array(cells) => cells.into_iter().map(cell_text).collect(),
                other => vec![cell_text(other)],
            })
            .collect();
        Ok(Self { rows })
    }

    /// Parse CSV text with no header row. Quoted cells may hold commas or
    /// newlines; rows may differ in length.
    pub fn from_csv(text: &str) -> Result<Self, ImportError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| ImportError::InvalidCsv(e.to_string()))?;
            rows.push(
                record
                    .iter()
                    .map(|cell| (!cell.trim().is_empty()).then(|| cell.to_string()))
                    .collect(),
            );
        }
        Ok(Self { rows })
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Widest row
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Trimmed, non-blank text at (row, col); None when out of bounds or blank
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)?
            .get(col)?
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn is_blank(&self, row: usize, col: usize) -> bool {
        self.cell(row, col).is_none()
    }

    /// Uppercased concatenation of a row's non-blank cells
    pub fn row_text(&self, row: usize) -> String {
        (0..self.row_width(row))
            .filter_map(|c| self.cell(row, c))
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase()
    }

    /// Column and text of the first non-blank cell in a row
    pub fn first_nonblank(&self, row: usize) -> Option<(usize, &str)> {
        (0..self.row_width(row)).find_map(|c| self.cell(row, c).map(|s| (c, s)))
    }

    /// First row at or after `start` matching the predicate
    pub fn find_row(&self, start: usize, pred: impl Fn(usize) -> bool) -> Option<usize> {
        (start..self.height()).find(|&r| pred(r))
    }

    fn row_width(&self, row: usize) -> usize {
        self.rows.get(row).map(Vec::len).unwrap_or(0)
    }
}

fn cell_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => (!s.trim().is_empty()).then_some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_bounds_and_blanks() {
        let grid = CellGrid::from_strs(&[vec!["a", "  ", " b "], vec!["c"]]);
        assert_eq!(grid.cell(0, 0), Some("a"));
        assert_eq!(grid.cell(0, 1), None);
        assert_eq!(grid.cell(0, 2), Some("b"));
        assert_eq!(grid.cell(1, 2), None);
        assert_eq!(grid.cell(9, 9), None);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
    }

    #[test]
    fn test_row_text_and_first_nonblank() {
        let grid = CellGrid::from_strs(&[vec!["", "Target", "", "Description"]]);
        assert_eq!(grid.row_text(0), "TARGET DESCRIPTION");
        assert_eq!(grid.first_nonblank(0), Some((1, "Target")));
        assert_eq!(grid.first_nonblank(3), None);
    }

    #[test]
    fn test_from_json_mixed_cells() {
        let grid = CellGrid::from_json(r#"[["Unit", null, 12, true], "loose"]"#).unwrap();
        assert_eq!(grid.cell(0, 0), Some("Unit"));
        assert_eq!(grid.cell(0, 1), None);
        assert_eq!(grid.cell(0, 2), Some("12"));
        assert_eq!(grid.cell(0, 3), Some("true"));
        assert_eq!(grid.cell(1, 0), Some("loose"));
    }

    #[test]
    fn test_from_csv_quoted_cells_keep_columns() {
        let text = "Line,Target No,Description,Location,Remarks\n\
                    1,AA0001,\"SAM, HQ-9\",\"15.5, 120.3\",Priority\n";
        let grid = CellGrid::from_csv(text).unwrap();
        assert_eq!(grid.width(), 5);
        assert_eq!(grid.cell(1, 2), Some("SAM, HQ-9"));
        assert_eq!(grid.cell(1, 3), Some("15.5, 120.3"));
        assert_eq!(grid.cell(1, 4), Some("Priority"));
    }

    #[test]
    fn test_from_csv_ragged_and_blank_cells() {
        let text = "Unit,End Item,Qty,,Unit,End Item,Qty\n\
                    Btry A,M777,6\n\
                    ,\"MTVR\n(cargo)\",  \n";
        let grid = CellGrid::from_csv(text).unwrap();
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.width(), 7);
        assert_eq!(grid.cell(1, 0), Some("Btry A"));
        assert_eq!(grid.cell(1, 5), None);
        assert_eq!(grid.cell(2, 0), None);
        assert_eq!(grid.cell(2, 1), Some("MTVR\n(cargo)"));
        assert_eq!(grid.cell(2, 2), None);
    }

    #[test]
    fn test_from_json_rejects_non_array() {
        assert!(matches!(
            CellGrid::from_json(r#"{"rows": []}"#),
            Err(ImportError::InvalidJson(_))
        ));
        assert!(CellGrid::from_json("not json").is_err());
    }
}
