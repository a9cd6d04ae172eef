use anyhow::Result;
use catalog_clean::core::Pipeline;
use catalog_clean::{
    CleanError, CleanerConfig, CsvPipeline, EtlEngine, FileJob, LocalStorage, RowTransformer,
};
use std::path::Path;
use tempfile::TempDir;

const EXPORT: &str = r#"sku;title;description;brand;category;group_id;group_leader;eta-zulassung
"100";"Betonschraube Senkkopf 7,5x60 verzinkt";"Europäisch technische Bewertung ETA-15/0352";"FÖRCH";"['Befestigung', 'Befestigung;Betonschrauben', 'Top Marken']";"B-7";"1";""
"101";"Betonschraube Senkkopf 7,5x80 verzinkt";"";"Förch";"['Befestigung', 'Befestigung;Betonschrauben']";"B-7";"0";""
"102";"Zylinderkopf Schraube Edelstahl A4 M6";"DIN 912";"Würth";"Schrauben;Zylinderschrauben";"";"";"vorhanden"
"#;

fn write_export(dir: &Path, name: &str) -> Result<String> {
    let path = dir.join(name);
    std::fs::write(&path, EXPORT)?;
    Ok(path.to_string_lossy().to_string())
}

fn read_rows(path: &str) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_path(path)?;
    let headers = reader.headers()?.iter().map(String::from).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(String::from).collect());
    }
    Ok((headers, rows))
}

#[tokio::test]
async fn test_end_to_end_csv_cleaning() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = write_export(temp_dir.path(), "Shop Export.csv")?;

    let config = CleanerConfig::default();
    let job = FileJob::from_config(&input, &config)?;
    let pipeline = CsvPipeline::new(LocalStorage::default(), job, config.build_transformer()?);
    let summary = EtlEngine::new(pipeline).run().await?;

    let output = Path::new(&summary.output_path);
    assert_eq!(output.parent(), Some(temp_dir.path()));
    let file_name = output.file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("Shop Export CSV Edit "));
    assert!(file_name.ends_with(".csv"));

    let (headers, rows) = read_rows(&summary.output_path)?;
    assert_eq!(
        headers,
        vec![
            "sku", "title", "description", "brand", "category", "group_id", "group_leader",
            "eta-zulassung", "group_count", "material", "kopfform",
        ]
    );
    assert_eq!(rows.len(), 3);

    let first = &rows[0];
    assert_eq!(first[0], "100");
    assert_eq!(first[3], "");
    assert_eq!(first[4], "Befestigung > Betonschrauben");
    assert_eq!(first[6], "true");
    assert_eq!(first[7], "mit ETA Zulassung");
    assert_eq!(first[8], "2 Varianten");
    assert_eq!(first[9], "Stahl verzinkt");
    assert_eq!(first[10], "Senkkopf");

    let second = &rows[1];
    assert_eq!(second[6], "false");
    assert_eq!(second[7], "");

    let third = &rows[2];
    assert_eq!(third[3], "Würth");
    assert_eq!(third[4], "Schrauben > Zylinderschrauben");
    assert_eq!(third[6], "false");
    assert_eq!(third[7], "vorhanden");
    assert_eq!(third[8], "");
    assert_eq!(third[9], "Edelstahl A4");
    assert_eq!(third[10], "Zylinderkopf");

    assert_eq!(summary.stats.rows, 3);
    assert_eq!(summary.stats.variant_groups, 1);
    assert_eq!(summary.stats.brands_cleared, 2);
    assert_eq!(summary.stats.eta_flagged, 1);
    assert_eq!(summary.stats.categories_rewritten, 3);

    Ok(())
}

#[tokio::test]
async fn test_output_directory_and_json_format() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = write_export(temp_dir.path(), "export.csv")?;
    let out_dir = temp_dir.path().join("cleaned");

    let config = CleanerConfig::from_toml_str(&format!(
        r#"
[output]
directory = "{}"
suffix = "bereinigt"
format = "json"
timestamp_format = "%Y"
"#,
        out_dir.to_string_lossy().replace('\\', "/")
    ))?;
    let job = FileJob::from_config(&input, &config)?;
    let pipeline = CsvPipeline::new(LocalStorage::default(), job, config.build_transformer()?);
    let summary = EtlEngine::new(pipeline).run().await?;

    let year = chrono::Local::now().format("%Y").to_string();
    let expected = out_dir.join(format!("export bereinigt {}.json", year));
    assert!(expected.is_file());

    let rows: Vec<serde_json::Value> = serde_json::from_slice(&std::fs::read(&expected)?)?;
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["group_count"], "2 Varianten");
    assert_eq!(rows[2]["kopfform"], "Zylinderkopf");
    assert_eq!(summary.stats.rows, 3);

    Ok(())
}

#[tokio::test]
async fn test_custom_blacklist_from_config() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = write_export(temp_dir.path(), "export.csv")?;

    let config = CleanerConfig::from_toml_str(
        r#"
[blacklist]
brands = ["Würth"]
categories = ["Betonschrauben"]
"#,
    )?;
    let job = FileJob::from_config(&input, &config)?;
    let pipeline = CsvPipeline::new(LocalStorage::default(), job, config.build_transformer()?);

    let batch = pipeline.extract().await?;
    let result = pipeline.transform(batch).await?;

    let first = &result.processed_records[0];
    assert_eq!(first.get_str("brand"), Some("FÖRCH"));
    // the flat root is removed before the blacklisted path is
    assert_eq!(first.get_str("category"), Some("Top Marken"));
    assert_eq!(result.processed_records[2].get_str("brand"), Some(""));

    Ok(())
}

#[tokio::test]
async fn test_dry_run_writes_nothing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = write_export(temp_dir.path(), "export.csv")?;

    let config = CleanerConfig::default();
    let job = FileJob::from_config(&input, &config)?;
    let pipeline = CsvPipeline::new(LocalStorage::default(), job, RowTransformer::default());
    let result = EtlEngine::new(pipeline).preview().await?;

    assert_eq!(result.processed_records.len(), 3);
    assert_eq!(std::fs::read_dir(temp_dir.path())?.count(), 1);

    Ok(())
}

#[tokio::test]
async fn test_missing_input_reports_input_error() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("missing.csv");
    let quoted = format!("\"{}\"", input.to_string_lossy());

    let config = CleanerConfig::default();
    let job = FileJob::from_config(&quoted, &config)?;
    let pipeline = CsvPipeline::new(LocalStorage::default(), job, RowTransformer::default());
    let err = EtlEngine::new(pipeline).run().await.unwrap_err();

    assert!(matches!(err, CleanError::InputNotFound { .. }));
    assert_eq!(err.exit_code(), 2);

    Ok(())
}
