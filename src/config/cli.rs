use crate::core::ConfigProvider;
use crate::domain::settings::{
    AnalysisConfig, ComparisonMode, Grouping, Layout, OutputFormat, ScannerConfig, SourceFormat,
};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_file_extension, validate_output_formats, validate_path, validate_scanner, Validate,
};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "menu-audit")]
#[command(about = "Audit menu screen layouts across venues and report discrepancies")]
pub struct CliConfig {
    /// Spreadsheet to audit (.xlsx, .xlsm, .xls, .ods or .csv)
    pub input: String,

    /// Sheet name; defaults to the first sheet
    #[arg(long)]
    pub sheet: Option<String>,

    #[arg(long, default_value = "./audit-output")]
    pub output_path: String,

    #[arg(
        long = "format",
        value_enum,
        value_delimiter = ',',
        default_values_t = [OutputFormat::Json, OutputFormat::Csv]
    )]
    pub formats: Vec<OutputFormat>,

    /// Bundle the outputs into this ZIP file under the output path
    #[arg(long = "zip")]
    pub bundle: Option<String>,

    #[arg(long, value_enum, default_value_t = ComparisonMode::Positional)]
    pub mode: ComparisonMode,

    #[arg(long, value_enum, default_value_t = Grouping::VenueCategory)]
    pub group_by: Grouping,

    #[arg(long, value_enum, default_value_t = Layout::Rows)]
    pub layout: Layout,

    /// Zero-based column holding row labels
    #[arg(long, default_value = "1")]
    pub label_column: usize,

    /// Zero-based column holding prices and outlet numbers
    #[arg(long, default_value = "2")]
    pub value_column: usize,

    #[arg(long, help = "Leave closed venues out of the analysis")]
    pub skip_closed: bool,

    #[arg(long, help = "Keep screens without items in the analysis")]
    pub include_empty: bool,

    #[arg(long, short, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log phase timings and system usage")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn sheet_name(&self) -> Option<&str> {
        self.sheet.as_deref()
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.formats
    }

    fn bundle_name(&self) -> Option<&str> {
        self.bundle.as_deref()
    }

    fn scanner(&self) -> ScannerConfig {
        ScannerConfig {
            label_column: self.label_column,
            value_column: self.value_column,
            layout: self.layout,
            ..ScannerConfig::default()
        }
    }

    fn analysis(&self) -> AnalysisConfig {
        AnalysisConfig {
            comparison_mode: self.mode,
            grouping: self.group_by,
            skip_closed_venues: self.skip_closed,
            include_empty_screens: self.include_empty,
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input)?;
        validate_file_extension("input", &self.input, &SourceFormat::EXTENSIONS)?;
        validate_path("output_path", &self.output_path)?;
        validate_output_formats("format", &self.formats)?;
        if let Some(bundle) = &self.bundle {
            validate_file_extension("zip", bundle, &["zip"])?;
        }
        validate_scanner(&self.scanner())
    }
}
