use crate::adapters::spreadsheet::read_grid;
use crate::core::differ::{Differences, MISSING};
use crate::core::report::{audit_grid, AuditReport};
use crate::core::{ConfigProvider, Grid, Pipeline, Storage};
use crate::domain::model::{ScreenKind, ScreenRef, VenueType};
use crate::domain::settings::OutputFormat;
use crate::utils::error::{AuditError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const REPORT_FILE: &str = "audit_report.json";
pub const DISCREPANCY_FILE: &str = "discrepancies.csv";

/// Reads one spreadsheet through `Storage`, audits it and writes the report files.
pub struct AuditPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    generated_at: DateTime<Utc>,
    source: &'a str,
    #[serde(flatten)]
    report: &'a AuditReport,
}

const CSV_HEADER: [&str; 8] = [
    "venue_type",
    "venue_number",
    "screen",
    "kind",
    "category",
    "group",
    "expected",
    "found",
];

#[derive(Debug, Serialize)]
struct DiscrepancyRow<'a> {
    venue_type: VenueType,
    venue_number: &'a str,
    screen: &'a str,
    kind: ScreenKind,
    category: &'a str,
    group: &'a str,
    expected: &'a str,
    found: &'a str,
}

fn csv_row<'a>(group: &'a str, screen: &'a ScreenRef, expected: &'a str, found: &'a str) -> DiscrepancyRow<'a> {
    DiscrepancyRow {
        venue_type: screen.venue_type,
        venue_number: &screen.venue_number,
        screen: &screen.screen,
        kind: screen.kind,
        category: &screen.category,
        group,
        expected,
        found,
    }
}

impl<S: Storage, C: ConfigProvider> AuditPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn output_file(&self, name: &str) -> String {
        Path::new(self.config.output_path())
            .join(name)
            .to_string_lossy()
            .into_owned()
    }

    fn render_json(&self, report: &AuditReport) -> Result<Vec<u8>> {
        let document = ReportDocument {
            generated_at: Utc::now(),
            source: self.config.input_path(),
            report,
        };
        Ok(serde_json::to_vec_pretty(&document)?)
    }

    fn render_csv(report: &AuditReport) -> Result<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;

        for group in &report.groups {
            let group_key = group.key.to_string();
            for discrepancy in &group.discrepancies {
                let screen = &discrepancy.screen;
                match &discrepancy.differences {
                    Differences::Positional { changes } => {
                        for change in changes {
                            writer.serialize(csv_row(&group_key, screen, &change.expected, &change.found))?;
                        }
                    }
                    // 集合模式：缺少的放 expected，多出的放 found
                    Differences::SetBased { missing, extra } => {
                        for token in missing {
                            writer.serialize(csv_row(&group_key, screen, token, MISSING))?;
                        }
                        for token in extra {
                            writer.serialize(csv_row(&group_key, screen, MISSING, token))?;
                        }
                    }
                }
            }
        }

        writer
            .into_inner()
            .map_err(|e| AuditError::IoError(e.into_error()))
    }

    fn bundle(files: &[(&str, Vec<u8>)]) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        for (name, data) in files {
            zip.start_file(*name, options)?;
            zip.write_all(data)?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for AuditPipeline<S, C> {
    async fn extract(&self) -> Result<Grid> {
        let path = self.config.input_path();
        let format = self.config.source_format().ok_or_else(|| {
            AuditError::read(format!("Unsupported spreadsheet format: {}", path))
        })?;

        tracing::debug!("Reading {:?} source: {}", format, path);
        let bytes = self
            .storage
            .read_file(path)
            .await
            .map_err(|e| AuditError::read(format!("Failed to open {}: {}", path, e)))?;

        read_grid(bytes, format, self.config.sheet_name())
    }

    async fn transform(&self, grid: Grid) -> Result<AuditReport> {
        audit_grid(&grid, &self.config.scanner(), &self.config.analysis())
    }

    async fn load(&self, report: &AuditReport) -> Result<String> {
        let mut files: Vec<(&str, Vec<u8>)> = Vec::new();

        for format in self.config.output_formats() {
            match format {
                OutputFormat::Json => files.push((REPORT_FILE, self.render_json(report)?)),
                OutputFormat::Csv => files.push((DISCREPANCY_FILE, Self::render_csv(report)?)),
            }
        }

        for (name, data) in &files {
            let path = self.output_file(name);
            tracing::debug!("Writing {} ({} bytes)", path, data.len());
            self.storage.write_file(&path, data).await?;
        }

        match self.config.bundle_name() {
            Some(bundle_name) => {
                let zip_data = Self::bundle(&files)?;
                let path = self.output_file(bundle_name);
                tracing::debug!("Writing ZIP bundle ({} bytes) to {}", zip_data.len(), path);
                self.storage.write_file(&path, &zip_data).await?;
                Ok(path)
            }
            None => Ok(self.config.output_path().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::settings::{AnalysisConfig, ComparisonMode, ScannerConfig};
    use std::collections::HashMap;
    use std::io::Read;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn put(&self, path: &str, data: &[u8]) {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
        }

        async fn get(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            self.get(path).await.ok_or_else(|| {
                AuditError::IoError(std::io::Error::new(std::io::ErrorKind::NotFound, path.to_string()))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.put(path, data).await;
            Ok(())
        }
    }

    struct TestConfig {
        input: String,
        formats: Vec<OutputFormat>,
        bundle: Option<String>,
        analysis: AnalysisConfig,
    }

    impl TestConfig {
        fn new(input: &str) -> Self {
            Self {
                input: input.to_string(),
                formats: vec![OutputFormat::Json, OutputFormat::Csv],
                bundle: None,
                analysis: AnalysisConfig::default(),
            }
        }
    }

    impl ConfigProvider for TestConfig {
        fn input_path(&self) -> &str {
            &self.input
        }

        fn sheet_name(&self) -> Option<&str> {
            None
        }

        fn output_path(&self) -> &str {
            "out"
        }

        fn output_formats(&self) -> &[OutputFormat] {
            &self.formats
        }

        fn bundle_name(&self) -> Option<&str> {
            self.bundle.as_deref()
        }

        fn scanner(&self) -> ScannerConfig {
            ScannerConfig::default()
        }

        fn analysis(&self) -> AnalysisConfig {
            self.analysis.clone()
        }
    }

    const SCENARIO: &str = ",Food Outlets:,101\n\
,Screen A,\n\
,Burger,12\n\
,Screen B,\n\
,Burger,12\n\
,Screen C,\n\
,Burger,14\n";

    fn out(name: &str) -> String {
        Path::new("out").join(name).to_string_lossy().into_owned()
    }

    async fn pipeline_with(config: TestConfig) -> (AuditPipeline<MockStorage, TestConfig>, MockStorage) {
        let storage = MockStorage::default();
        storage.put("menus.csv", SCENARIO.as_bytes()).await;
        (AuditPipeline::new(storage.clone(), config), storage)
    }

    #[tokio::test]
    async fn test_extract_reads_csv_through_storage() {
        let (pipeline, _) = pipeline_with(TestConfig::new("menus.csv")).await;
        let grid = pipeline.extract().await.unwrap();
        assert_eq!(grid.len(), 7);
    }

    #[tokio::test]
    async fn test_extract_missing_file_is_read_error() {
        let (pipeline, _) = pipeline_with(TestConfig::new("absent.csv")).await;
        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, AuditError::ReadError { .. }));
    }

    #[tokio::test]
    async fn test_extract_unknown_extension_is_read_error() {
        let (pipeline, _) = pipeline_with(TestConfig::new("menus.txt")).await;
        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, AuditError::ReadError { .. }));
    }

    #[tokio::test]
    async fn test_load_writes_json_and_csv() {
        let (pipeline, storage) = pipeline_with(TestConfig::new("menus.csv")).await;
        let grid = pipeline.extract().await.unwrap();
        let report = pipeline.transform(grid).await.unwrap();
        let output = pipeline.load(&report).await.unwrap();
        assert_eq!(output, "out");

        let json = storage.get(&out(REPORT_FILE)).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["source"], "menus.csv");
        assert_eq!(value["total_screens"], 3);
        assert!(value["generated_at"].is_string());

        let csv_data = String::from_utf8(storage.get(&out(DISCREPANCY_FILE)).await.unwrap()).unwrap();
        let mut lines = csv_data.lines();
        assert_eq!(
            lines.next(),
            Some("venue_type,venue_number,screen,kind,category,group,expected,found")
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("FOOD,101,Screen C,internal,"));
        assert!(row.ends_with(",Burger-12,Burger-14"));
        assert_eq!(lines.next(), None);
    }

    #[tokio::test]
    async fn test_set_mode_csv_marks_missing_and_extra() {
        let mut config = TestConfig::new("menus.csv");
        config.formats = vec![OutputFormat::Csv];
        config.analysis.comparison_mode = ComparisonMode::SetBased;
        let (pipeline, storage) = pipeline_with(config).await;

        let grid = pipeline.extract().await.unwrap();
        let report = pipeline.transform(grid).await.unwrap();
        pipeline.load(&report).await.unwrap();

        assert!(storage.get(&out(REPORT_FILE)).await.is_none());
        let csv_data = String::from_utf8(storage.get(&out(DISCREPANCY_FILE)).await.unwrap()).unwrap();
        let rows: Vec<&str> = csv_data.lines().skip(1).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].ends_with(",Burger-12,missing"));
        assert!(rows[1].ends_with(",missing,Burger-14"));
    }

    #[tokio::test]
    async fn test_load_bundles_outputs_into_zip() {
        let mut config = TestConfig::new("menus.csv");
        config.bundle = Some("audit.zip".to_string());
        let (pipeline, storage) = pipeline_with(config).await;

        let grid = pipeline.extract().await.unwrap();
        let report = pipeline.transform(grid).await.unwrap();
        let output = pipeline.load(&report).await.unwrap();
        assert_eq!(output, out("audit.zip"));

        let zip_data = storage.get(&output).await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut json = String::new();
        archive
            .by_name(REPORT_FILE)
            .unwrap()
            .read_to_string(&mut json)
            .unwrap();
        assert!(json.contains("\"generated_at\""));
        assert!(archive.by_name(DISCREPANCY_FILE).is_ok());
    }
}
