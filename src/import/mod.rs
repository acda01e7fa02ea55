//! Document import - spreadsheet extractors and operation order parsing
//!
//! Importing replaces the previous records of the same kind; nothing is
//! merged.

pub mod equipment;
pub mod grid;
pub mod opord;
pub mod standards;
pub mod targets;

pub use equipment::{extract_equipment, EquipmentEntry};
pub use grid::CellGrid;
pub use opord::{import_opord, parse_opord_response, OpordDocument};
pub use standards::{extract_standards, TargetingStandards};
pub use targets::{extract_targets, TargetEntry};

use std::path::Path;

use crate::core::error::ImportError;

/// How an uploaded file is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Rows x columns of cells
    Spreadsheet,
    /// Extracted plain text for the operation order importer
    Text,
}

impl DocumentKind {
    pub fn from_filename(name: &str) -> Result<Self, ImportError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xls" | "csv" | "json" => Ok(Self::Spreadsheet),
            "pdf" | "docx" | "txt" | "md" => Ok(Self::Text),
            _ => Err(ImportError::UnsupportedFileType(if ext.is_empty() {
                name.to_string()
            } else {
                ext
            })),
        }
    }
}

/// Result of an import: the records are always present (possibly empty),
/// with the error alongside rather than instead of them
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome<T> {
    pub records: T,
    pub error: Option<ImportError>,
}

impl<T> ImportOutcome<T> {
    pub fn ok(records: T) -> Self {
        Self {
            records,
            error: None,
        }
    }

    pub fn failed(records: T, error: ImportError) -> Self {
        Self {
            records,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Which spreadsheet extractor to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetKind {
    TargetList,
    EquipmentDensity,
    TargetingStandards,
}

impl SheetKind {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "targets" | "target" | "target-list" | "hptl" => Some(Self::TargetList),
            "equipment" | "density" | "equipment-density" => Some(Self::EquipmentDensity),
            "standards" | "agm" | "targeting-standards" => Some(Self::TargetingStandards),
            _ => None,
        }
    }
}

/// Records imported into the current session
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    targets: Vec<TargetEntry>,
    equipment: Vec<EquipmentEntry>,
    standards: TargetingStandards,
    opord: Option<OpordDocument>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the extractor for `kind` and replace that record set.
    /// Returns how many records were stored.
    pub fn import_sheet(&mut self, kind: SheetKind, grid: &CellGrid) -> usize {
        let count = match kind {
            SheetKind::TargetList => {
                self.targets = extract_targets(grid);
                self.targets.len()
            }
            SheetKind::EquipmentDensity => {
                self.equipment = extract_equipment(grid);
                self.equipment.len()
            }
            SheetKind::TargetingStandards => {
                self.standards = extract_standards(grid);
                self.standards.entries.len() + self.standards.matrix.len()
            }
        };
        tracing::info!("imported {} record(s) as {:?}", count, kind);
        count
    }

    pub fn set_targets(&mut self, targets: Vec<TargetEntry>) {
        self.targets = targets;
    }

    pub fn set_equipment(&mut self, equipment: Vec<EquipmentEntry>) {
        self.equipment = equipment;
    }

    pub fn set_standards(&mut self, standards: TargetingStandards) {
        self.standards = standards;
    }

    pub fn set_opord(&mut self, opord: Option<OpordDocument>) {
        self.opord = opord;
    }

    pub fn targets(&self) -> &[TargetEntry] {
        &self.targets
    }

    pub fn equipment(&self) -> &[EquipmentEntry] {
        &self.equipment
    }

    pub fn standards(&self) -> &TargetingStandards {
        &self.standards
    }

    pub fn opord(&self) -> Option<&OpordDocument> {
        self.opord.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
            && self.equipment.is_empty()
            && self.standards.is_empty()
            && self.opord.is_none()
    }
}
