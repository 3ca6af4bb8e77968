//! Dataset loading from delimited text and record-oriented files
//!
//! Delimited files (CSV/TSV) are typed cell by cell: NA tokens become nulls,
//! then integers, floats and booleans are recognized, and anything else is
//! kept as text. Record files (JSON, JSON Lines, YAML) keep the types their
//! source already carries.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;

use super::{CellValue, Column, Dataset};
use crate::error::{Result, ValidationError};

/// Tokens treated as missing values unless configured otherwise
pub const DEFAULT_NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NAN", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Supported dataset file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Tsv,
    Json,
    JsonLines,
    Yaml,
}

impl DatasetFormat {
    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        extension.parse()
    }
}

impl FromStr for DatasetFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(DatasetFormat::Csv),
            "tsv" => Ok(DatasetFormat::Tsv),
            "json" => Ok(DatasetFormat::Json),
            "jsonl" | "ndjson" => Ok(DatasetFormat::JsonLines),
            "yaml" | "yml" => Ok(DatasetFormat::Yaml),
            other => Err(ValidationError::invalid_input(format!(
                "Unsupported dataset format: {}. Supported formats: csv, tsv, json, jsonl, ndjson, yaml, yml",
                other
            ))),
        }
    }
}

/// Loads datasets into column-major [`Dataset`]s
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    na_values: HashSet<String>,
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new::<&str>(&[])
    }
}

impl DatasetLoader {
    /// Create a loader recognizing the default NA tokens plus `extra_na_values`
    pub fn new<S: AsRef<str>>(extra_na_values: &[S]) -> Self {
        let mut na_values: HashSet<String> =
            DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect();
        na_values.extend(extra_na_values.iter().map(|s| s.as_ref().trim().to_string()));
        Self { na_values }
    }

    /// Whether a raw text value denotes a missing cell
    pub fn is_na(&self, raw: &str) -> bool {
        self.na_values.contains(raw.trim())
    }

    /// Load a dataset from disk, picking the format from the extension
    pub fn load_path(&self, path: &Path) -> Result<Dataset> {
        let format = DatasetFormat::from_path(path)?;
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::FileError(format!(
                "Failed to read dataset file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let dataset = self.load_str(&content, format)?;
        tracing::debug!(
            path = %path.display(),
            rows = dataset.num_rows(),
            columns = dataset.num_columns(),
            "Loaded dataset"
        );
        Ok(dataset)
    }

    /// Load a dataset from in-memory content
    pub fn load_str(&self, content: &str, format: DatasetFormat) -> Result<Dataset> {
        match format {
            DatasetFormat::Csv => self.load_delimited(content, b','),
            DatasetFormat::Tsv => self.load_delimited(content, b'\t'),
            DatasetFormat::Json => {
                let value: serde_json::Value = serde_json::from_str(content)
                    .map_err(|e| ValidationError::parse_error(format!("Invalid JSON: {}", e)))?;
                match value {
                    serde_json::Value::Array(records) => self.load_records(records),
                    _ => Err(ValidationError::parse_error(
                        "JSON dataset must be an array of objects",
                    )),
                }
            }
            DatasetFormat::JsonLines => {
                let mut records = Vec::new();
                for (index, line) in content.lines().enumerate() {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let record = serde_json::from_str(line).map_err(|e| {
                        ValidationError::parse_error(format!(
                            "Invalid JSON on line {}: {}",
                            index + 1,
                            e
                        ))
                    })?;
                    records.push(record);
                }
                self.load_records(records)
            }
            DatasetFormat::Yaml => {
                if content.trim().is_empty() {
                    return Ok(Dataset::empty());
                }
                let value: serde_json::Value = serde_yaml::from_str(content)
                    .map_err(|e| ValidationError::parse_error(format!("Invalid YAML: {}", e)))?;
                match value {
                    serde_json::Value::Array(records) => self.load_records(records),
                    serde_json::Value::Null => Ok(Dataset::empty()),
                    _ => Err(ValidationError::parse_error(
                        "YAML dataset must be a sequence of mappings",
                    )),
                }
            }
        }
    }

    fn load_delimited(&self, content: &str, delimiter: u8) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let headers = dedupe_names(headers);

        let mut columns: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];
        for record in reader.records() {
            let record = record?;
            for (cells, raw) in columns.iter_mut().zip(record.iter()) {
                cells.push(self.parse_field(raw));
            }
        }

        Dataset::new(
            headers
                .into_iter()
                .zip(columns)
                .map(|(name, values)| Column::new(name, values))
                .collect(),
        )
    }

    fn load_records(&self, records: Vec<serde_json::Value>) -> Result<Dataset> {
        let mut names: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut columns: Vec<Vec<CellValue>> = Vec::new();

        for (row, record) in records.into_iter().enumerate() {
            let object = match record {
                serde_json::Value::Object(object) => object,
                other => {
                    return Err(ValidationError::parse_error(format!(
                        "Record {} is not an object (found {})",
                        row + 1,
                        json_type(&other)
                    )))
                }
            };

            for (key, value) in object {
                let position = match index.get(&key) {
                    Some(&position) => position,
                    None => {
                        names.push(key.clone());
                        index.insert(key, columns.len());
                        columns.push(vec![CellValue::Null; row]);
                        columns.len() - 1
                    }
                };
                columns[position].push(self.convert_json(&value));
            }

            for cells in columns.iter_mut() {
                if cells.len() < row + 1 {
                    cells.push(CellValue::Null);
                }
            }
        }

        Dataset::new(
            names
                .into_iter()
                .zip(columns)
                .map(|(name, values)| Column::new(name, values))
                .collect(),
        )
    }

    /// Type a raw delimited field
    pub fn parse_field(&self, raw: &str) -> CellValue {
        let trimmed = raw.trim();
        if self.is_na(trimmed) {
            return CellValue::Null;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return CellValue::Float(f);
            }
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return CellValue::Boolean(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return CellValue::Boolean(false);
        }
        CellValue::Text(trimmed.to_string())
    }

    fn convert_json(&self, value: &serde_json::Value) -> CellValue {
        match value {
            serde_json::Value::Null => CellValue::Null,
            serde_json::Value::Bool(b) => CellValue::Boolean(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => CellValue::Integer(i),
                None => n.as_f64().map(CellValue::Float).unwrap_or(CellValue::Null),
            },
            serde_json::Value::String(s) if self.is_na(s) => CellValue::Null,
            serde_json::Value::String(s) => CellValue::Text(s.clone()),
            nested => CellValue::Text(nested.to_string()),
        }
    }
}

/// Suffix repeated header names with `.1`, `.2`, ...
fn dedupe_names(names: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut result = Vec::with_capacity(names.len());

    for name in names {
        let mut candidate = name.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}.{}", name, suffix);
            suffix += 1;
        }
        seen.insert(candidate.clone());
        result.push(candidate);
    }
    result
}

fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use CellValue::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            DatasetFormat::from_path(&PathBuf::from("data/Amazon.csv")).unwrap(),
            DatasetFormat::Csv
        );
        assert_eq!(
            DatasetFormat::from_path(&PathBuf::from("rows.NDJSON")).unwrap(),
            DatasetFormat::JsonLines
        );
        assert_eq!(
            DatasetFormat::from_path(&PathBuf::from("rows.yml")).unwrap(),
            DatasetFormat::Yaml
        );
        assert!(DatasetFormat::from_path(&PathBuf::from("rows.parquet")).is_err());
        assert!(DatasetFormat::from_path(&PathBuf::from("no_extension")).is_err());
    }

    #[test]
    fn test_parse_field_typing() {
        let loader = DatasetLoader::default();
        assert_eq!(loader.parse_field("42"), Integer(42));
        assert_eq!(loader.parse_field(" -3.5 "), Float(-3.5));
        assert_eq!(loader.parse_field("1e3"), Float(1000.0));
        assert_eq!(loader.parse_field("TRUE"), Boolean(true));
        assert_eq!(loader.parse_field("false"), Boolean(false));
        assert_eq!(loader.parse_field("abc"), Text("abc".into()));
        assert_eq!(loader.parse_field(""), Null);
        assert_eq!(loader.parse_field("NaN"), Null);
        assert_eq!(loader.parse_field("inf"), Text("inf".into()));
        assert_eq!(loader.parse_field("?"), Text("?".into()));
    }

    #[test]
    fn test_extra_na_values() {
        let loader = DatasetLoader::new(&["?"]);
        assert_eq!(loader.parse_field("?"), Null);
        assert_eq!(loader.parse_field(" ? "), Null);
    }

    #[test]
    fn test_spreadsheet_na_markers_are_missing() {
        let loader = DatasetLoader::default();
        for token in ["n/a", "#N/A", "#NA", "<NA>", "-NaN", "-nan", "NAN", "1.#QNAN"] {
            assert_eq!(loader.parse_field(token), Null, "{token}");
        }

        let ds = loader
            .load_str("chol\n233\n#N/A\n286\n<NA>\nn/a\n", DatasetFormat::Csv)
            .unwrap();
        let chol = ds.column("chol").unwrap();
        assert_eq!(chol.null_count(), 3);
        assert_eq!(chol.values[0], Integer(233));
    }

    #[test]
    fn test_load_csv() {
        let loader = DatasetLoader::new(&["?"]);
        let content = "age,sex,ca,thal\n63,Male,0,fixed defect\n67,Male,?,normal\n41,Female,,?\n";
        let ds = loader.load_str(content, DatasetFormat::Csv).unwrap();

        assert_eq!(ds.num_rows(), 3);
        assert_eq!(ds.column_names(), vec!["age", "sex", "ca", "thal"]);
        assert_eq!(ds.column("ca").unwrap().values, vec![Integer(0), Null, Null]);
        assert_eq!(ds.column("thal").unwrap().null_count(), 1);
    }

    #[test]
    fn test_load_tsv() {
        let ds = DatasetLoader::default()
            .load_str("a\tb\n1\tx\n2\ty\n", DatasetFormat::Tsv)
            .unwrap();
        assert_eq!(ds.num_columns(), 2);
        assert_eq!(ds.column("b").unwrap().values[1], Text("y".into()));
    }

    #[test]
    fn test_csv_ragged_row_is_parse_error() {
        let result = DatasetLoader::default().load_str("a,b\n1,2\n3\n", DatasetFormat::Csv);
        assert!(matches!(result, Err(ValidationError::ParseError(_))));
    }

    #[test]
    fn test_csv_header_only_and_empty() {
        let loader = DatasetLoader::default();
        let header_only = loader.load_str("a,b\n", DatasetFormat::Csv).unwrap();
        assert_eq!(header_only.num_rows(), 0);
        assert_eq!(header_only.num_columns(), 2);

        let empty = loader.load_str("", DatasetFormat::Csv).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_csv_duplicate_headers_are_suffixed() {
        let ds = DatasetLoader::default()
            .load_str("x,x,x\n1,2,3\n", DatasetFormat::Csv)
            .unwrap();
        assert_eq!(ds.column_names(), vec!["x", "x.1", "x.2"]);
    }

    #[test]
    fn test_load_json_records_union_columns() {
        let content = r#"[
            {"id": 1, "price": 9.5},
            {"id": 2, "name": "widget"},
            {"id": "3", "price": null, "name": "N/A"}
        ]"#;
        let ds = DatasetLoader::default().load_str(content, DatasetFormat::Json).unwrap();

        assert_eq!(ds.column_names(), vec!["id", "price", "name"]);
        assert_eq!(ds.column("id").unwrap().values, vec![Integer(1), Integer(2), Text("3".into())]);
        assert_eq!(ds.column("price").unwrap().values, vec![Float(9.5), Null, Null]);
        assert_eq!(ds.column("name").unwrap().values, vec![Null, Text("widget".into()), Null]);
    }

    #[test]
    fn test_load_json_rejects_non_array() {
        let result = DatasetLoader::default().load_str(r#"{"a": 1}"#, DatasetFormat::Json);
        assert!(matches!(result, Err(ValidationError::ParseError(_))));

        let result = DatasetLoader::default().load_str("[1, 2]", DatasetFormat::Json);
        assert!(matches!(result, Err(ValidationError::ParseError(_))));
    }

    #[test]
    fn test_load_json_lines() {
        let content = "{\"a\": 1, \"b\": [1, 2]}\n\n{\"a\": 2.5}\n";
        let ds = DatasetLoader::default().load_str(content, DatasetFormat::JsonLines).unwrap();
        assert_eq!(ds.num_rows(), 2);
        assert_eq!(ds.column("a").unwrap().values, vec![Integer(1), Float(2.5)]);
        assert_eq!(ds.column("b").unwrap().values, vec![Text("[1,2]".into()), Null]);
    }

    #[test]
    fn test_load_yaml() {
        let content = "- name: a\n  score: 1\n- name: b\n  score: ~\n";
        let ds = DatasetLoader::default().load_str(content, DatasetFormat::Yaml).unwrap();
        assert_eq!(ds.num_rows(), 2);
        assert_eq!(ds.column("score").unwrap().values, vec![Integer(1), Null]);
    }

    #[test]
    fn test_load_path_missing_file() {
        let result = DatasetLoader::default().load_path(Path::new("/nonexistent/data.csv"));
        assert!(matches!(result, Err(ValidationError::FileError(_))));
    }
}
