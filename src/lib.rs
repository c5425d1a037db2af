pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::LocalStorage;
pub use app::pipelines::AuditPipeline;
pub use core::engine::AuditEngine;
pub use core::report::{audit_grid, render_summary, AuditReport};
pub use domain::settings::{AnalysisConfig, ComparisonMode, Grouping, ScannerConfig};
pub use utils::error::{AuditError, Result};
