use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("dataset not found: {0}")]
    NotFound(std::path::PathBuf),

    #[error("dataset has no header row")]
    EmptyHeader,

    #[error("io error reading dataset: {0}")]
    Io(#[from] std::io::Error),
}

/// One CSV row as a field-name to value mapping. Values keep their natural
/// JSON type so samples serialize the way the real endpoints do; comparisons
/// always go through [`VehicleRecord::field_folded`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleRecord(pub BTreeMap<String, Value>);

impl VehicleRecord {
    /// Case-folded string form of a field for matching. Missing fields and
    /// JSON nulls both compare as the literal "none".
    pub fn field_folded(&self, name: &str) -> String {
        match self.0.get(name) {
            None | Some(Value::Null) => "none".to_string(),
            Some(Value::String(s)) if s.trim().is_empty() => "none".to_string(),
            Some(Value::String(s)) => s.trim().to_lowercase(),
            Some(other) => other.to_string().to_lowercase(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordTable {
    pub fields: Vec<String>,
    pub records: Vec<VehicleRecord>,
    pub skipped: usize,
}

impl RecordTable {
    /// Loads a CSV whose first row names the fields. Rows with a field-count
    /// mismatch are skipped and counted, never fatal.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let mut lines = raw.lines().filter(|l| !l.trim().is_empty());
        let header = lines.next().ok_or(StoreError::EmptyHeader)?;
        let fields: Vec<String> = split_csv_row(header)
            .into_iter()
            .map(|f| f.trim().to_string())
            .collect();
        if fields.is_empty() {
            return Err(StoreError::EmptyHeader);
        }

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for (line_no, line) in lines.enumerate() {
            let cells = split_csv_row(line);
            if cells.len() != fields.len() {
                tracing::warn!(
                    line = line_no + 2,
                    expected = fields.len(),
                    got = cells.len(),
                    "skipping malformed csv row"
                );
                skipped += 1;
                continue;
            }
            let mut map = BTreeMap::new();
            for (field, cell) in fields.iter().zip(cells) {
                map.insert(field.clone(), coerce_value(&cell));
            }
            records.push(VehicleRecord(map));
        }

        Ok(Self {
            fields,
            records,
            skipped,
        })
    }

    /// Restartable pass over all loaded records.
    pub fn scan(&self) -> impl Iterator<Item = &VehicleRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }

    /// Per-value counts for one attribute, descending by count.
    pub fn distribution(&self, attribute: &str) -> Vec<(String, usize)> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for record in self.scan() {
            *counts.entry(record.field_folded(attribute)).or_default() += 1;
        }
        let mut out: Vec<(String, usize)> = counts.into_iter().collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        out
    }

    /// Fixture table used when no CSV is configured, so the attribute fast
    /// path always has data behind it. Absence of the CSV is not an error
    /// state for the rest of the system.
    pub fn synthetic() -> Self {
        let raw = "\
id,make,model,year,color,price,mileage,condition,fuel_type
1,Toyota,Camry,2021,Blue,28500,15000,Excellent,Gasoline
2,Honda,Civic,2022,White,24700,8000,Like New,Hybrid
3,Ford,F-150,2020,Black,38500,22000,Good,Diesel
4,Toyota,Corolla,2022,Green,23900,6100,Excellent,Gasoline
5,Tesla,Model 3,2023,White,41200,3000,Like New,Electric
6,Chevrolet,Malibu,2019,Silver,18900,41000,Fair,Gasoline
7,BMW,330i,2021,Black,39800,17500,Good,Gasoline
8,Honda,CR-V,2020,Green,27400,28000,Good,Gasoline
";
        Self::parse(raw).unwrap_or_else(|_| Self {
            fields: Vec::new(),
            records: Vec::new(),
            skipped: 0,
        })
    }
}

/// Splits one CSV row, honoring double-quoted cells with embedded commas
/// and doubled-quote escapes.
fn split_csv_row(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    cell.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                cells.push(std::mem::take(&mut cell));
            }
            other => cell.push(other),
        }
    }
    cells.push(cell);
    cells
}

/// Keeps numbers and booleans typed so samples round-trip as JSON the same
/// shape the real backend emits.
fn coerce_value(cell: &str) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    match trimmed.to_lowercase().as_str() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_rows() {
        let table = RecordTable::parse("make,color\nToyota,Blue\nHonda,White\n").unwrap();
        assert_eq!(table.fields, vec!["make", "color"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.skipped, 0);
        assert_eq!(table.records[0].field_folded("make"), "toyota");
    }

    #[test]
    fn skips_rows_with_field_count_mismatch() {
        let table = RecordTable::parse("make,color\nToyota,Blue\nHonda\nFord,Black,extra\n").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.skipped, 2);
    }

    #[test]
    fn quoted_cells_keep_embedded_commas() {
        let table = RecordTable::parse("model,features\nF-150,\"Towing, 4x4\"\n").unwrap();
        assert_eq!(
            table.records[0].0.get("features"),
            Some(&Value::String("Towing, 4x4".to_string()))
        );
    }

    #[test]
    fn numeric_cells_are_typed() {
        let table = RecordTable::parse("year,price\n2021,28500\n").unwrap();
        assert_eq!(table.records[0].0.get("year"), Some(&Value::from(2021)));
        assert_eq!(table.records[0].field_folded("year"), "2021");
    }

    #[test]
    fn missing_and_empty_fields_fold_to_none() {
        let table = RecordTable::parse("make,color\nToyota,\n").unwrap();
        assert_eq!(table.records[0].field_folded("color"), "none");
        assert_eq!(table.records[0].field_folded("no_such_field"), "none");
    }

    #[test]
    fn empty_input_is_a_header_error() {
        assert!(matches!(
            RecordTable::parse(""),
            Err(StoreError::EmptyHeader)
        ));
    }

    #[test]
    fn synthetic_table_is_never_empty() {
        let table = RecordTable::synthetic();
        assert!(!table.is_empty());
        assert!(table.has_field("color"));
        assert!(table.has_field("fuel_type"));
    }

    #[test]
    fn distribution_counts_every_record_once() {
        let table = RecordTable::synthetic();
        let dist = table.distribution("make");
        let total: usize = dist.iter().map(|(_, n)| n).sum();
        assert_eq!(total, table.len());
    }
}
