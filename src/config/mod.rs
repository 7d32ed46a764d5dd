#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::TomlConfig;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_ordered, validate_path, validate_range, validate_url};

pub const DEFAULT_INPUT_PATH: &str = "data/sales_data.txt";
pub const DEFAULT_ENRICHED_PATH: &str = "data/enriched_sales_data.txt";
pub const DEFAULT_REPORT_PATH: &str = "output/sales_report.txt";
pub const DEFAULT_CATALOG_ENDPOINT: &str = "https://dummyjson.com/products";
pub const DEFAULT_CATALOG_RANGE: u32 = 100;
pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 2;
pub const MAX_PAGE_SIZE: usize = 1000;

/// Checks shared by every configuration source.
pub fn validate_settings<C: ConfigProvider>(config: &C) -> Result<()> {
    validate_path("input.path", config.input_path())?;
    validate_path("output.enriched_path", config.enriched_output_path())?;
    validate_path("output.report_path", config.report_path())?;
    if let Some(archive) = config.archive_path() {
        validate_path("output.archive_path", archive)?;
    }

    validate_url("catalog.endpoint", config.catalog_endpoint())?;
    validate_range("catalog.range", config.catalog_range(), 1, u32::MAX)?;
    validate_range("catalog.page_size", config.page_size(), 1, MAX_PAGE_SIZE)?;
    validate_range("catalog.retry_attempts", config.retry_attempts(), 1, 10)?;
    validate_range(
        "catalog.timeout_seconds",
        config.request_timeout().as_secs(),
        1,
        300,
    )?;

    let filter = config.record_filter();
    validate_ordered(
        "filters.amount",
        filter.min_amount.as_ref(),
        filter.max_amount.as_ref(),
    )?;

    Ok(())
}
