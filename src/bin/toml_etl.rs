use clap::Parser;
use sales_etl::core::ConfigProvider;
use sales_etl::utils::{logger, validation::Validate};
use sales_etl::{EtlEngine, EtlError, LocalStorage, SalesPipeline, TomlConfig};
use std::path::Path;

#[derive(Parser)]
#[command(name = "toml-etl")]
#[command(about = "Sales ETL driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "sales-etl.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Show what would be processed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init_cli_logger(args.verbose, config.log_file().map(Path::new))?;

    tracing::info!("🚀 Starting TOML-based sales ETL");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(".");
    let pipeline = match SalesPipeline::new(storage, config) {
        Ok(pipeline) => pipeline,
        Err(e) => exit_with(e),
    };
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(summary) => {
            for artifact in &summary.load.artifacts {
                match &artifact.error {
                    None => println!("📁 {} saved to: {}", artifact.name, artifact.path),
                    Some(e) => eprintln!("❌ {} not written to {}: {}", artifact.name, artifact.path, e),
                }
            }
            println!("🔗 Enriched {}/{} records", summary.enriched, summary.attempted);
            if summary.has_failures() {
                std::process::exit(1);
            }
            println!("✅ ETL process completed successfully!");
        }
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Input: {}", config.input_path());
    println!("  Catalog: {} (ids 1..={})", config.catalog_endpoint(), config.catalog_range());
    println!("  Enriched output: {}", config.enriched_output_path());
    println!("  Report: {}", config.report_path());
    if let Some(archive) = config.archive_path() {
        println!("  Archive: {}", archive);
    }
    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }
    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📡 Catalog:");
    println!("  Endpoint: {}", config.catalog_endpoint());
    println!("  Page size: {}", config.page_size());
    println!("  Timeout: {:?}", config.request_timeout());
    println!("  Attempts per page: {}", config.retry_attempts());

    println!();
    println!("⚙️ Processing:");
    println!("  Decode policy: {:?}", config.decode_policy());
    let filter = config.record_filter();
    if filter.is_empty() {
        println!("  Filters: none");
    } else {
        if let Some(region) = &filter.region {
            println!("  Region filter: {}", region);
        }
        if let Some(min) = filter.min_amount {
            println!("  Minimum amount: {}", min);
        }
        if let Some(max) = filter.max_amount {
            println!("  Maximum amount: {}", max);
        }
    }
    println!("  Low performer threshold: {}", config.low_performer_threshold());

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}

fn exit_with(e: EtlError) -> ! {
    tracing::error!(
        "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code().max(1))
}
