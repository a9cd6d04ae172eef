use crate::core::attributes::ETA_APPROVAL;
use crate::core::transformer::{
    group_counts, RowTransformer, BRAND, CATEGORY, DERIVED_FIELDS, ETA_FIELD,
};
use crate::core::{
    Batch, ConfigProvider, OutputFormat, Pipeline, Record, Storage, TransformResult,
    TransformStats,
};
use crate::domain::model::cell_text;
use crate::utils::error::{CleanError, Result};
use chrono::{DateTime, Local};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Reads one export file, cleans its rows and writes the result next to it.
pub struct CsvPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    transformer: RowTransformer,
}

impl<S: Storage, C: ConfigProvider> CsvPipeline<S, C> {
    pub fn new(storage: S, config: C, transformer: RowTransformer) -> Self {
        Self {
            storage,
            config,
            transformer,
        }
    }

    /// Where the output for a run started at `now` goes.
    pub fn output_location(&self, now: DateTime<Local>) -> Result<PathBuf> {
        let pattern = self.config.timestamp_format();
        let mut timestamp = String::new();
        write!(timestamp, "{}", now.format(pattern)).map_err(|_| {
            CleanError::InvalidConfigValueError {
                field: "output.timestamp_format".to_string(),
                value: pattern.to_string(),
                reason: "Not a valid strftime pattern".to_string(),
            }
        })?;

        Ok(output_location(
            self.config.input_path(),
            self.config.output_dir(),
            self.config.output_suffix(),
            &timestamp,
            self.config.output_format(),
        ))
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CsvPipeline<S, C> {
    async fn extract(&self) -> Result<Batch> {
        let path = self.config.input_path();
        if !self.storage.exists(path) {
            return Err(CleanError::InputNotFound {
                path: path.to_string(),
            });
        }

        let bytes = self.storage.read_file(path).await?;
        tracing::debug!("Read {} bytes from {}", bytes.len(), path);
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);

        if is_json_path(path) {
            parse_json_batch(bytes)
        } else {
            parse_csv_batch(bytes, self.config.delimiter())
        }
    }

    async fn transform(&self, batch: Batch) -> Result<TransformResult> {
        let processed_records = self.transformer.transform_batch(&batch.records);
        let stats = collect_stats(&batch.records, &processed_records);
        tracing::debug!("Transform stats: {:?}", stats);

        Ok(TransformResult {
            headers: output_headers(&batch.headers),
            processed_records,
            stats,
        })
    }

    async fn load(&self, result: &TransformResult) -> Result<String> {
        let location = self.output_location(Local::now())?;
        let data = match self.config.output_format() {
            OutputFormat::Csv => write_csv(result, self.config.delimiter())?,
            OutputFormat::Json => write_json(result)?,
        };

        let output_path = location.to_string_lossy().to_string();
        tracing::debug!("Writing {} bytes to {}", data.len(), output_path);
        self.storage.write_file(&output_path, &data).await?;
        Ok(output_path)
    }
}

fn is_json_path(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// `<stem> <suffix> <timestamp>.<ext>` in `dir`, or next to the input.
pub fn output_location(
    input_path: &str,
    dir: Option<&str>,
    suffix: &str,
    timestamp: &str,
    format: OutputFormat,
) -> PathBuf {
    let input = Path::new(input_path);
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());

    let name = [stem.as_str(), suffix.trim(), timestamp]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let file_name = format!("{}.{}", name, format.extension());

    match dir {
        Some(dir) => Path::new(dir).join(file_name),
        None => input
            .parent()
            .map(|parent| parent.join(&file_name))
            .unwrap_or_else(|| PathBuf::from(&file_name)),
    }
}

fn parse_csv_batch(bytes: &[u8], delimiter: u8) -> Result<Batch> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;
        if row.len() > headers.len() {
            let line = row.position().map(|p| p.line()).unwrap_or_default();
            return Err(CleanError::ProcessingError {
                message: format!(
                    "line {} has {} fields but the header has {}",
                    line,
                    row.len(),
                    headers.len()
                ),
            });
        }
        let record = Record::from_pairs(
            headers
                .iter()
                .zip(row.iter())
                .map(|(header, cell)| (header.as_str(), cell)),
        );
        records.push(record);
    }

    tracing::info!("Extracted {} rows with {} columns", records.len(), headers.len());
    Ok(Batch { headers, records })
}

/// Accepts `[{...}, ...]` as well as workflow items shaped `[{"json": {...}}, ...]`.
fn parse_json_batch(bytes: &[u8]) -> Result<Batch> {
    let items = match serde_json::from_slice::<Value>(bytes)? {
        Value::Array(items) => items,
        _ => {
            return Err(CleanError::ProcessingError {
                message: "JSON input must be an array of objects".to_string(),
            })
        }
    };

    let mut headers: Vec<String> = Vec::new();
    let mut records = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let object = match item {
            Value::Object(mut object) => match object.remove("json") {
                Some(Value::Object(inner)) if is_item_wrapper(&object) => inner,
                Some(other) => {
                    object.insert("json".to_string(), other);
                    object
                }
                None => object,
            },
            _ => {
                return Err(CleanError::ProcessingError {
                    message: format!("JSON item {} is not an object", index),
                })
            }
        };

        for key in object.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
        records.push(Record {
            data: object.into_iter().collect::<HashMap<_, _>>(),
        });
    }

    tracing::info!("Extracted {} items with {} fields", records.len(), headers.len());
    Ok(Batch { headers, records })
}

/// Keys a workflow item may carry next to `json`.
fn is_item_wrapper(rest: &Map<String, Value>) -> bool {
    rest.keys()
        .all(|key| matches!(key.as_str(), "binary" | "pairedItem" | "error"))
}

fn output_headers(input_headers: &[String]) -> Vec<String> {
    let mut headers = input_headers.to_vec();
    for field in DERIVED_FIELDS {
        if !headers.iter().any(|h| h == field) {
            headers.push(field.to_string());
        }
    }
    headers
}

fn collect_stats(input: &[Record], output: &[Record]) -> TransformStats {
    let mut stats = TransformStats {
        rows: output.len(),
        variant_groups: group_counts(input).values().filter(|&&n| n >= 2).count(),
        ..TransformStats::default()
    };

    for (before, after) in input.iter().zip(output) {
        let changed = |field: &str| match (before.get(field), after.get(field)) {
            (Some(old), Some(new)) => cell_text(old) != cell_text(new),
            _ => false,
        };

        if changed(CATEGORY) {
            stats.categories_rewritten += 1;
        }
        if changed(BRAND) {
            stats.brands_cleared += 1;
        }
        if changed(ETA_FIELD) && after.get_str(ETA_FIELD) == Some(ETA_APPROVAL) {
            stats.eta_flagged += 1;
        }
    }

    stats
}

fn write_csv(result: &TransformResult, delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(csv::QuoteStyle::NonNumeric)
        .from_writer(Vec::new());

    writer.write_record(&result.headers)?;
    for record in &result.processed_records {
        let row = result
            .headers
            .iter()
            .map(|header| record.get(header).map(cell_text).unwrap_or_default());
        writer.write_record(row)?;
    }

    writer
        .into_inner()
        .map_err(|e| CleanError::IoError(e.into_error()))
}

fn write_json(result: &TransformResult) -> Result<Vec<u8>> {
    let rows: Vec<Value> = result
        .processed_records
        .iter()
        .map(|record| {
            let object: Map<String, Value> = result
                .headers
                .iter()
                .filter_map(|header| {
                    record
                        .get(header)
                        .map(|value| (header.clone(), value.clone()))
                })
                .collect();
            Value::Object(object)
        })
        .collect();
    Ok(serde_json::to_vec_pretty(&rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_file(path: &str, data: &str) -> Self {
            let storage = Self::default();
            storage
                .files
                .lock()
                .unwrap()
                .insert(path.to_string(), data.as_bytes().to_vec());
            storage
        }

        fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().unwrap().get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            self.get_file(path).ok_or_else(|| {
                CleanError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files
                .lock()
                .unwrap()
                .insert(path.to_string(), data.to_vec());
            Ok(())
        }

        fn exists(&self, path: &str) -> bool {
            self.files.lock().unwrap().contains_key(path)
        }
    }

    struct MockConfig {
        input_path: String,
        format: OutputFormat,
        timestamp_format: String,
    }

    impl MockConfig {
        fn new(input_path: &str) -> Self {
            Self {
                input_path: input_path.to_string(),
                format: OutputFormat::Csv,
                timestamp_format: "%Y-%m-%d_%H-%M".to_string(),
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn input_path(&self) -> &str {
            &self.input_path
        }

        fn output_dir(&self) -> Option<&str> {
            Some("out")
        }

        fn delimiter(&self) -> u8 {
            b';'
        }

        fn output_suffix(&self) -> &str {
            "CSV Edit"
        }

        fn output_format(&self) -> OutputFormat {
            self.format
        }

        fn timestamp_format(&self) -> &str {
            &self.timestamp_format
        }
    }

    const EXPORT: &str = "\u{feff}title;brand;category;group_id\n\
        Senkkopf Schraube 4x20 verzinkt;FÖRCH;\"[\"\"Zubehör\"\",\"\"Zubehör;Bits\"\",\"\"Top Marken\"\"]\";G1\n\
        Linsenkopf Schraube;fischer;Schrauben;G1\n";

    fn pipeline(storage: MockStorage, config: MockConfig) -> CsvPipeline<MockStorage, MockConfig> {
        CsvPipeline::new(storage, config, RowTransformer::default())
    }

    #[tokio::test]
    async fn test_extract_csv_strips_bom_and_keeps_header_order() {
        let storage = MockStorage::with_file("in/export.csv", EXPORT);
        let pipeline = pipeline(storage, MockConfig::new("in/export.csv"));

        let batch = pipeline.extract().await.unwrap();

        assert_eq!(batch.headers, vec!["title", "brand", "category", "group_id"]);
        assert_eq!(batch.records.len(), 2);
        assert_eq!(
            batch.records[0].get_str("category"),
            Some(r#"["Zubehör","Zubehör;Bits","Top Marken"]"#)
        );
    }

    #[tokio::test]
    async fn test_extract_missing_file() {
        let pipeline = pipeline(MockStorage::default(), MockConfig::new("missing.csv"));

        let err = pipeline.extract().await.unwrap_err();

        assert!(matches!(err, CleanError::InputNotFound { .. }));
    }

    #[tokio::test]
    async fn test_extract_json_workflow_items() {
        let items = r#"[
            {"json": {"title": "Hammerkopf", "group_id": "A"}, "pairedItem": {"item": 0}},
            {"title": "Dübel", "sku": 7}
        ]"#;
        let storage = MockStorage::with_file("items.json", items);
        let pipeline = pipeline(storage, MockConfig::new("items.json"));

        let batch = pipeline.extract().await.unwrap();

        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.records[0].get_str("title"), Some("Hammerkopf"));
        assert!(!batch.records[0].contains("pairedItem"));
        assert_eq!(batch.records[1].get("sku"), Some(&serde_json::json!(7)));
        assert!(batch.headers.contains(&"sku".to_string()));
    }

    #[tokio::test]
    async fn test_extract_json_rejects_non_arrays() {
        let storage = MockStorage::with_file("items.json", r#"{"title": "x"}"#);
        let pipeline = pipeline(storage, MockConfig::new("items.json"));

        assert!(pipeline.extract().await.is_err());
    }

    #[tokio::test]
    async fn test_transform_appends_derived_headers_and_counts() {
        let storage = MockStorage::with_file("export.csv", EXPORT);
        let pipeline = pipeline(storage, MockConfig::new("export.csv"));

        let batch = pipeline.extract().await.unwrap();
        let result = pipeline.transform(batch).await.unwrap();

        assert_eq!(
            result.headers,
            vec!["title", "brand", "category", "group_id", "group_count", "material", "kopfform"]
        );
        let first = &result.processed_records[0];
        assert_eq!(first.get_str("category"), Some("Zubehör %% Zubehör > Bits"));
        assert_eq!(first.get_str("brand"), Some(""));
        assert_eq!(first.get_str("group_count"), Some("2 Varianten"));
        assert_eq!(first.get_str("material"), Some("Stahl verzinkt"));
        assert_eq!(first.get_str("kopfform"), Some("Senkkopf"));

        assert_eq!(
            result.stats,
            TransformStats {
                rows: 2,
                variant_groups: 1,
                categories_rewritten: 1,
                brands_cleared: 1,
                eta_flagged: 0,
            }
        );
    }

    #[tokio::test]
    async fn test_load_writes_csv_with_quoted_text() {
        let storage = MockStorage::with_file("export.csv", EXPORT);
        let pipeline = pipeline(storage.clone(), MockConfig::new("export.csv"));

        let batch = pipeline.extract().await.unwrap();
        let result = pipeline.transform(batch).await.unwrap();
        let output_path = pipeline.load(&result).await.unwrap();

        assert!(output_path.starts_with("out/export CSV Edit "));
        assert!(output_path.ends_with(".csv"));
        assert_eq!(storage.files.lock().unwrap().len(), 2);

        let written = String::from_utf8(storage.get_file(&output_path).unwrap()).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next(),
            Some(r#""title";"brand";"category";"group_id";"group_count";"material";"kopfform""#)
        );
        assert!(written.contains(r#""Zubehör %% Zubehör > Bits""#));
    }

    #[tokio::test]
    async fn test_load_writes_json() {
        let storage = MockStorage::with_file("export.csv", EXPORT);
        let mut config = MockConfig::new("export.csv");
        config.format = OutputFormat::Json;
        let pipeline = pipeline(storage.clone(), config);

        let batch = pipeline.extract().await.unwrap();
        let result = pipeline.transform(batch).await.unwrap();
        let output_path = pipeline.load(&result).await.unwrap();

        assert!(output_path.ends_with(".json"));
        let rows: Vec<Value> = serde_json::from_slice(&storage.get_file(&output_path).unwrap()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["kopfform"], "Linsenkopf");
        assert_eq!(rows[1]["group_count"], "2 Varianten");
    }

    #[tokio::test]
    async fn test_extract_rejects_rows_longer_than_header() {
        let storage = MockStorage::with_file("wide.csv", "a;b\n1;2\n1;2;3\n");
        let pipeline = pipeline(storage, MockConfig::new("wide.csv"));

        let err = pipeline.extract().await.unwrap_err();

        match err {
            CleanError::ProcessingError { message } => {
                assert!(message.contains("line 3"), "{}", message);
                assert!(message.contains("3 fields"), "{}", message);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_extract_keeps_short_rows() {
        let storage = MockStorage::with_file("short.csv", "a;b;c\n1;2\n");
        let pipeline = pipeline(storage, MockConfig::new("short.csv"));

        let batch = pipeline.extract().await.unwrap();

        assert_eq!(batch.records[0].get_str("b"), Some("2"));
        assert!(!batch.records[0].contains("c"));
    }

    #[test]
    fn test_output_location() {
        assert_eq!(
            output_location("data/Export.csv", None, "CSV Edit", "2024-05-01_09-30", OutputFormat::Csv),
            PathBuf::from("data/Export CSV Edit 2024-05-01_09-30.csv")
        );
        assert_eq!(
            output_location("Export.csv", Some("out"), "", "2024", OutputFormat::Json),
            PathBuf::from("out/Export 2024.json")
        );
        assert_eq!(
            output_location("Export.csv", None, "Edit", "", OutputFormat::Csv),
            PathBuf::from("Export Edit.csv")
        );
    }

    #[test]
    fn test_output_location_uses_configured_timestamp() {
        let pipeline = pipeline(MockStorage::default(), MockConfig::new("a/b.csv"));
        let now = chrono::TimeZone::with_ymd_and_hms(&Local, 2024, 5, 1, 9, 30, 0).unwrap();
        assert_eq!(
            pipeline.output_location(now).unwrap(),
            PathBuf::from("out/b CSV Edit 2024-05-01_09-30.csv")
        );
    }

    #[test]
    fn test_output_location_rejects_unknown_specifier() {
        let mut config = MockConfig::new("a/b.csv");
        config.timestamp_format = "%Q".to_string();
        let pipeline = pipeline(MockStorage::default(), config);

        let err = pipeline.output_location(Local::now()).unwrap_err();
        assert!(matches!(err, CleanError::InvalidConfigValueError { .. }));
    }
}
