pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::{HttpCatalogClient, LocalStorage};
pub use app::pipelines::SalesPipeline;
pub use core::etl::{EtlEngine, RunSummary};
pub use utils::error::{EtlError, Result};
