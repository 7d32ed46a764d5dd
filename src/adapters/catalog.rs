use crate::domain::model::CatalogProduct;
use crate::domain::ports::{CatalogSource, ConfigProvider};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

/// Connection settings for a DummyJSON-style `/products` listing.
#[derive(Debug, Clone)]
pub struct CatalogClientSettings {
    pub endpoint: String,
    pub page_size: usize,
    pub max_products: usize,
    pub timeout: Duration,
    pub retry_attempts: u32,
}

impl CatalogClientSettings {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self {
            endpoint: config.catalog_endpoint().to_string(),
            page_size: config.page_size(),
            max_products: config.catalog_range() as usize,
            timeout: config.request_timeout(),
            retry_attempts: config.retry_attempts(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogPage {
    products: Vec<CatalogProduct>,
    #[serde(default)]
    total: Option<usize>,
}

pub struct HttpCatalogClient {
    client: Client,
    settings: CatalogClientSettings,
}

impl HttpCatalogClient {
    pub fn new(settings: CatalogClientSettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    async fn fetch_page(&self, skip: usize, limit: usize) -> Result<CatalogPage> {
        let attempts = self.settings.retry_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            tracing::debug!(
                "Requesting catalog page skip={} limit={} (attempt {}/{})",
                skip,
                limit,
                attempt,
                attempts
            );

            let result = async {
                let body = self
                    .client
                    .get(&self.settings.endpoint)
                    .query(&[("limit", limit), ("skip", skip)])
                    .send()
                    .await?
                    .error_for_status()?
                    .bytes()
                    .await?;
                Ok::<_, EtlError>(serde_json::from_slice::<CatalogPage>(&body)?)
            }
            .await;

            match result {
                Ok(page) => return Ok(page),
                Err(e) => {
                    tracing::warn!("Catalog request attempt {}/{} failed: {}", attempt, attempts, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| EtlError::CatalogError {
            message: "no request was attempted".to_string(),
        }))
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogClient {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogProduct>> {
        let max_products = self.settings.max_products;
        let page_size = self.settings.page_size.max(1);
        let mut products = Vec::new();
        let mut seen = HashSet::new();
        let mut skip = 0;

        tracing::info!("🌐 Fetching product catalog from {}", self.settings.endpoint);

        while skip < max_products {
            let limit = page_size.min(max_products - skip);
            let page = self.fetch_page(skip, limit).await?;
            let received = page.products.len();

            for product in page.products {
                if seen.insert(product.id) {
                    products.push(product);
                }
            }

            skip += received;
            let exhausted = page.total.is_some_and(|total| skip >= total);
            if received == 0 || exhausted {
                break;
            }
        }

        tracing::info!("✅ Fetched {} catalog products", products.len());
        Ok(products)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn settings(endpoint: String) -> CatalogClientSettings {
        CatalogClientSettings {
            endpoint,
            page_size: 2,
            max_products: 100,
            timeout: Duration::from_secs(5),
            retry_attempts: 2,
        }
    }

    #[tokio::test]
    async fn test_fetches_all_pages_and_deduplicates() {
        let server = MockServer::start();
        let first = server.mock(|when, then| {
            when.method(GET)
                .path("/products")
                .query_param("limit", "2")
                .query_param("skip", "0");
            then.status(200).json_body(serde_json::json!({
                "products": [
                    {"id": 1, "title": "iPhone 9", "description": "phone", "price": 549,
                     "category": "smartphones", "brand": "Apple", "rating": 4.69, "stock": 94},
                    {"id": 2, "title": "iPhone X", "category": "smartphones", "brand": "Apple", "rating": 4.44, "stock": 34}
                ],
                "total": 3, "skip": 0, "limit": 2
            }));
        });
        let second = server.mock(|when, then| {
            when.method(GET)
                .path("/products")
                .query_param("limit", "2")
                .query_param("skip", "2");
            then.status(200).json_body(serde_json::json!({
                "products": [
                    {"id": 2, "title": "duplicate", "category": "dupes"},
                    {"id": 3, "title": "Perfume Oil", "category": "fragrances", "rating": 4.26}
                ],
                "total": 3, "skip": 2, "limit": 2
            }));
        });

        let client = HttpCatalogClient::new(settings(server.url("/products"))).unwrap();
        let products = client.fetch_catalog().await.unwrap();

        first.assert();
        second.assert();
        let ids: Vec<_> = products.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(products[1].title, "iPhone X");
        assert_eq!(products[2].brand, None);
    }

    #[tokio::test]
    async fn test_stops_at_max_products() {
        let server = MockServer::start();
        let page = server.mock(|when, then| {
            when.method(GET)
                .path("/products")
                .query_param("limit", "1")
                .query_param("skip", "0");
            then.status(200).json_body(serde_json::json!({
                "products": [{"id": 1, "title": "Only"}],
                "total": 50
            }));
        });

        let mut settings = settings(server.url("/products"));
        settings.max_products = 1;
        let client = HttpCatalogClient::new(settings).unwrap();
        let products = client.fetch_catalog().await.unwrap();

        page.assert_hits(1);
        assert_eq!(products.len(), 1);
    }

    #[tokio::test]
    async fn test_server_error_is_retried_then_reported() {
        let server = MockServer::start();
        let failing = server.mock(|when, then| {
            when.method(GET).path("/products");
            then.status(500);
        });

        let client = HttpCatalogClient::new(settings(server.url("/products"))).unwrap();
        let result = client.fetch_catalog().await;

        failing.assert_hits(2);
        assert!(matches!(result, Err(EtlError::ApiError(_))));
    }

    #[tokio::test]
    async fn test_malformed_body_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/products");
            then.status(200).body("not json");
        });

        let client = HttpCatalogClient::new(settings(server.url("/products"))).unwrap();
        let result = client.fetch_catalog().await;
        assert!(matches!(result, Err(EtlError::SerializationError(_))));
    }
}
