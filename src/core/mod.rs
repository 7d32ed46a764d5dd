pub mod aligner;
pub mod analytics;
pub mod enrichment;
pub mod etl;
pub mod filter;
pub mod parser;
pub mod validator;

pub use crate::domain::model::{
    CleaningOutcome, EnrichedRecord, LoadSummary, TransformResult,
};
pub use crate::domain::ports::{CatalogSource, ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
