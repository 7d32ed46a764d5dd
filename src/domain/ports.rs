use crate::domain::model::{
    CatalogProduct, CleaningOutcome, DecodePolicy, LoadSummary, RecordFilter, TransformResult,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn decode_policy(&self) -> DecodePolicy;
    fn enriched_output_path(&self) -> &str;
    fn report_path(&self) -> &str;
    fn archive_path(&self) -> Option<&str>;
    fn catalog_endpoint(&self) -> &str;
    fn catalog_range(&self) -> u32;
    fn page_size(&self) -> usize;
    fn request_timeout(&self) -> Duration;
    fn retry_attempts(&self) -> u32;
    fn record_filter(&self) -> RecordFilter;
    fn low_performer_threshold(&self) -> u64;
}

/// Read-only access to the remote product catalog.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogProduct>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<CleaningOutcome>;
    async fn transform(&self, cleaned: CleaningOutcome) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<LoadSummary>;
}
