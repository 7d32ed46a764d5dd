use crate::config::validate_settings;
use crate::core::ConfigProvider;
use crate::domain::model::{DecodePolicy, RecordFilter};
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "sales-etl")]
#[command(about = "Clean a pipe-delimited sales file, enrich it from a product catalog and report on it")]
pub struct CliConfig {
    #[arg(long, default_value = super::DEFAULT_INPUT_PATH)]
    pub input: String,

    #[arg(long, help = "Decode non-UTF-8 lines as Latin-1 instead of rejecting them")]
    pub latin1_fallback: bool,

    #[arg(long, default_value = super::DEFAULT_ENRICHED_PATH)]
    pub enriched_output: String,

    #[arg(long, default_value = super::DEFAULT_REPORT_PATH)]
    pub report_output: String,

    #[arg(long, help = "Also bundle the enriched data and report into this zip file")]
    pub archive: Option<String>,

    #[arg(long, default_value = super::DEFAULT_CATALOG_ENDPOINT)]
    pub catalog_endpoint: String,

    #[arg(long, default_value_t = super::DEFAULT_CATALOG_RANGE)]
    pub catalog_range: u32,

    #[arg(long, default_value_t = super::DEFAULT_PAGE_SIZE)]
    pub page_size: usize,

    #[arg(long, default_value_t = super::DEFAULT_TIMEOUT_SECONDS)]
    pub timeout_seconds: u64,

    #[arg(long, default_value_t = super::DEFAULT_RETRY_ATTEMPTS)]
    pub retry_attempts: u32,

    #[arg(long, help = "Keep only transactions from this region")]
    pub region: Option<String>,

    #[arg(long, help = "Minimum transaction amount (quantity x unit price)")]
    pub min_amount: Option<Decimal>,

    #[arg(long, help = "Maximum transaction amount (quantity x unit price)")]
    pub max_amount: Option<Decimal>,

    #[arg(long, default_value_t = crate::core::analytics::DEFAULT_LOW_PERFORMER_THRESHOLD)]
    pub low_threshold: u64,

    #[arg(long, help = "Append JSON logs to this file")]
    pub log_file: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process CPU and memory usage per stage")]
    pub monitor: bool,
}

impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn decode_policy(&self) -> DecodePolicy {
        if self.latin1_fallback {
            DecodePolicy::Latin1Fallback
        } else {
            DecodePolicy::Strict
        }
    }

    fn enriched_output_path(&self) -> &str {
        &self.enriched_output
    }

    fn report_path(&self) -> &str {
        &self.report_output
    }

    fn archive_path(&self) -> Option<&str> {
        self.archive.as_deref()
    }

    fn catalog_endpoint(&self) -> &str {
        &self.catalog_endpoint
    }

    fn catalog_range(&self) -> u32 {
        self.catalog_range
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    fn record_filter(&self) -> RecordFilter {
        RecordFilter {
            region: self.region.clone(),
            min_amount: self.min_amount,
            max_amount: self.max_amount,
        }
    }

    fn low_performer_threshold(&self) -> u64 {
        self.low_threshold
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_settings(self)
    }
}
