use anyhow::Context;
use clap::Parser;
use menu_audit::core::ConfigProvider;
use menu_audit::utils::{logger, validation::Validate};
use menu_audit::{
    render_summary, AuditEngine, AuditPipeline, ComparisonMode, Grouping, LocalStorage, TomlConfig,
};

#[derive(Parser)]
#[command(name = "toml-audit")]
#[command(about = "Menu screen audit driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "audit-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override the comparison mode from config
    #[arg(long, value_enum)]
    mode: Option<ComparisonMode>,

    /// Override the grouping strategy from config
    #[arg(long, value_enum)]
    group_by: Option<Grouping>,

    /// Dry run - show what would be audited without reading the spreadsheet
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config))?;

    if config.log_json() {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based menu audit");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(mode) = args.mode {
        config.analysis.comparison_mode = mode;
        tracing::info!("🔧 Comparison mode overridden to: {}", mode);
    }
    if let Some(grouping) = args.group_by {
        config.analysis.grouping = grouping;
        tracing::info!("🔧 Grouping overridden to: {}", grouping);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No spreadsheet will be read");
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = AuditPipeline::new(LocalStorage::default(), config);
    let engine = AuditEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(run) => {
            print!("{}", render_summary(&run.report));
            println!("📁 Output saved to: {}", run.output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Audit failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = e.exit_code();
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    let analysis = config.analysis();
    println!("📋 Configuration Summary:");
    println!("  Audit: {} v{}", config.audit.name, config.audit.version);
    println!("  Source: {}", config.input_path());
    println!("  Output: {}", config.output_path());
    println!("  Mode: {}", analysis.comparison_mode);
    println!("  Grouping: {}", analysis.grouping);

    if let Some(environment) = &config.environment {
        println!("  Environment: {} variables", environment.len());
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📄 Source:");
    println!("  Path: {}", config.input_path());
    match config.source_format() {
        Some(format) => println!("  Format: {:?}", format),
        None => println!("  Format: unknown"),
    }
    println!("  Sheet: {}", config.sheet_name().unwrap_or("(first sheet)"));

    let scanner = config.scanner();
    println!();
    println!("🧭 Scanner:");
    println!(
        "  Columns: label {} / value {} ({:?} layout)",
        scanner.label_column, scanner.value_column, scanner.layout
    );
    for outlet in &scanner.outlets {
        println!("  Outlet header: '{}' -> {}", outlet.label, outlet.venue_type);
    }
    println!("  Category tokens: {}", scanner.category_tokens.join(", "));

    let analysis = config.analysis();
    println!();
    println!("⚙️ Analysis:");
    println!("  Comparison: {}", analysis.comparison_mode);
    println!("  Grouping: {}", analysis.grouping);
    if analysis.skip_closed_venues {
        println!("  ✅ Closed venues skipped");
    }
    if analysis.include_empty_screens {
        println!("  ✅ Empty screens included");
    }

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    let formats: Vec<String> = config
        .output_formats()
        .iter()
        .map(|f| format!("{:?}", f).to_lowercase())
        .collect();
    println!("  Formats: {}", formats.join(", "));
    if let Some(bundle) = config.bundle_name() {
        println!("  Compression: {} (ZIP)", bundle);
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
