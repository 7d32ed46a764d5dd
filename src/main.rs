use clap::Parser;
use sales_etl::utils::{logger, validation::Validate};
use sales_etl::{CliConfig, EtlEngine, EtlError, LocalStorage, RunSummary, SalesPipeline};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose, config.log_file.as_deref().map(Path::new))?;

    tracing::info!("Starting sales-etl CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // Paths are taken relative to the working directory
    let storage = LocalStorage::new(".");
    let pipeline = match SalesPipeline::new(storage, config) {
        Ok(pipeline) => pipeline,
        Err(e) => exit_with(e),
    };

    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(summary) => {
            print_summary(&summary);
            if summary.has_failures() {
                std::process::exit(1);
            }
        }
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    if summary.has_failures() {
        println!("⚠️ ETL process finished with output errors");
    } else {
        tracing::info!("✅ ETL process completed successfully!");
        println!("✅ ETL process completed successfully!");
    }
    println!("🔗 Enriched {}/{} records", summary.enriched, summary.attempted);
    for artifact in &summary.load.artifacts {
        match &artifact.error {
            None => println!("📁 {} saved to: {}", artifact.name, artifact.path),
            Some(e) => eprintln!("❌ {} not written to {}: {}", artifact.name, artifact.path, e),
        }
    }
    if !summary.warnings.is_empty() {
        println!("⚠️ {} warning(s), see the report for details", summary.warnings.len());
    }
}

fn exit_with(e: EtlError) -> ! {
    // 記錄詳細錯誤信息
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
