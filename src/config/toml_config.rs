use crate::core::ConfigProvider;
use crate::domain::settings::{AnalysisConfig, OutputFormat, ScannerConfig, SourceFormat};
use crate::utils::error::{AuditError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub audit: AuditInfo,
    pub source: SourceConfig,
    #[serde(default)]
    pub scanner: ScannerConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
    pub environment: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditInfo {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub path: String,
    /// Overrides detection from the file extension.
    pub format: Option<SourceFormat>,
    pub sheet: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<OutputFormat>,
    pub compression: Option<CompressionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AuditError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let defaults = Self::environment_defaults(content);
        let processed_content = Self::substitute_env_vars(content, &defaults)?;

        toml::from_str(&processed_content).map_err(|e| AuditError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// `[environment]` 表提供 ${VAR} 的預設值
    fn environment_defaults(content: &str) -> HashMap<String, String> {
        #[derive(Deserialize)]
        struct EnvironmentOnly {
            #[serde(default)]
            environment: HashMap<String, String>,
        }

        toml::from_str::<EnvironmentOnly>(content)
            .map(|e| e.environment)
            .unwrap_or_default()
    }

    /// 替換環境變數 (例如 ${MENU_AUDIT_SOURCE})；程序環境優先，其次 `[environment]`，都沒有則保持原樣
    fn substitute_env_vars(content: &str, defaults: &HashMap<String, String>) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| AuditError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name)
                .ok()
                .or_else(|| defaults.get(var_name).cloned())
                .unwrap_or_else(|| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("audit.name", &self.audit.name)?;

        validation::validate_path("source.path", &self.source.path)?;
        if self.source.format.is_none() {
            validation::validate_file_extension(
                "source.path",
                &self.source.path,
                &SourceFormat::EXTENSIONS,
            )?;
        }

        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_output_formats("load.output_formats", &self.load.output_formats)?;

        if let Some(compression) = self.load.compression.as_ref().filter(|c| c.enabled) {
            validation::validate_file_extension("load.compression.filename", &compression.filename, &["zip"])?;
        }

        validation::validate_scanner(&self.scanner)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_json(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_json)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.source.path
    }

    fn sheet_name(&self) -> Option<&str> {
        self.source.sheet.as_deref()
    }

    fn source_format(&self) -> Option<SourceFormat> {
        self.source
            .format
            .or_else(|| SourceFormat::from_path(&self.source.path))
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.load.output_formats
    }

    fn bundle_name(&self) -> Option<&str> {
        self.load
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| c.filename.as_str())
    }

    fn scanner(&self) -> ScannerConfig {
        self.scanner.clone()
    }

    fn analysis(&self) -> AnalysisConfig {
        self.analysis.clone()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
