use crate::core::report::AuditReport;
use crate::domain::model::Grid;
use crate::domain::settings::{AnalysisConfig, OutputFormat, ScannerConfig, SourceFormat};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    /// Sheet to read; `None` means the first sheet.
    fn sheet_name(&self) -> Option<&str>;
    fn source_format(&self) -> Option<SourceFormat> {
        SourceFormat::from_path(self.input_path())
    }
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[OutputFormat];
    /// ZIP bundle filename, when the outputs should be archived.
    fn bundle_name(&self) -> Option<&str>;
    fn scanner(&self) -> ScannerConfig;
    fn analysis(&self) -> AnalysisConfig;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Grid>;
    async fn transform(&self, grid: Grid) -> Result<AuditReport>;
    async fn load(&self, report: &AuditReport) -> Result<String>;
}
