//! Condition table loading.
//!
//! The table is read once at startup and never mutated afterwards. JSON
//! tables are a bare array of records; TOML tables use `[[conditions]]`.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use medibot_core::error::{MedibotError, Result};
use medibot_core::types::ConditionRecord;

const BUILTIN_TABLE: &str = include_str!("../data/conditions.json");

/// Immutable, ordered set of condition records.
///
/// Order matters: it breaks ties between equally scored records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionTable {
    records: Vec<ConditionRecord>,
}

#[derive(Deserialize)]
struct TomlTable {
    #[serde(default)]
    conditions: Vec<ConditionRecord>,
}

impl ConditionTable {
    /// Build a table from records, lowercasing every keyword.
    pub fn from_records(records: Vec<ConditionRecord>) -> Self {
        Self {
            records: records.into_iter().map(ConditionRecord::normalize).collect(),
        }
    }

    /// The table bundled with the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_TABLE)
    }

    /// Parse a JSON array of records.
    pub fn from_json(raw: &str) -> Result<Self> {
        let records: Vec<ConditionRecord> = serde_json::from_str(raw)
            .map_err(|e| MedibotError::Dataset(format!("invalid JSON table: {}", e)))?;
        Ok(Self::from_records(records))
    }

    /// Parse a TOML document with a `[[conditions]]` array.
    pub fn from_toml(raw: &str) -> Result<Self> {
        let table: TomlTable = toml::from_str(raw)
            .map_err(|e| MedibotError::Dataset(format!("invalid TOML table: {}", e)))?;
        Ok(Self::from_records(table.conditions))
    }

    /// Load a table from disk, choosing the format by file extension.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let table = match ext.as_deref() {
            Some("json") => Self::from_json(&raw)?,
            Some("toml") => Self::from_toml(&raw)?,
            other => {
                return Err(MedibotError::Dataset(format!(
                    "unsupported table format {:?} for {}",
                    other.unwrap_or(""),
                    path.display()
                )))
            }
        };
        info!(
            records = table.len(),
            "Condition table loaded from {}",
            path.display()
        );
        Ok(table)
    }

    pub fn records(&self) -> &[ConditionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_table_loads() {
        let table = ConditionTable::builtin().unwrap();
        assert!(!table.is_empty());
        for record in table.records() {
            assert!(!record.name.is_empty());
            assert!(!record.keywords.is_empty());
            assert!(record
                .keywords
                .iter()
                .all(|k| *k == k.to_lowercase()));
        }
    }

    #[test]
    fn test_from_records_lowercases_keywords() {
        let table = ConditionTable::from_records(vec![ConditionRecord {
            name: "Flu".into(),
            keywords: vec!["FEVER".into(), "Cough".into()],
            severity: "Low".into(),
            precautions: vec!["rest".into()],
        }]);
        assert_eq!(table.records()[0].keywords, vec!["fever", "cough"]);
    }

    #[test]
    fn test_from_toml() {
        let raw = r#"
[[conditions]]
name = "Flu"
keywords = ["fever", "cough"]
severity = "Low"
precautions = ["rest", "fluids"]

[[conditions]]
disease = "Cold"
symptoms = ["cough", "sneeze"]
severity = "Low"
precautions = ["rest"]
"#;
        let table = ConditionTable::from_toml(raw).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[1].name, "Cold");
        assert_eq!(table.records()[1].keywords, vec!["cough", "sneeze"]);
    }

    #[test]
    fn test_from_toml_empty_document() {
        let table = ConditionTable::from_toml("").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_from_json_invalid_is_dataset_error() {
        let err = ConditionTable::from_json("{\"disease\": 1}").unwrap_err();
        assert!(matches!(err, MedibotError::Dataset(_)));
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(
            br#"[{"name": "Flu", "keywords": ["fever"], "severity": "Low", "precautions": []}]"#,
        )
        .unwrap();
        let table = ConditionTable::load(file.path()).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_load_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        let err = ConditionTable::load(file.path()).unwrap_err();
        assert!(matches!(err, MedibotError::Dataset(_)));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = ConditionTable::load(Path::new("/nonexistent/table.json")).unwrap_err();
        assert!(matches!(err, MedibotError::Io(_)));
    }
}
