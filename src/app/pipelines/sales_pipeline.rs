use crate::adapters::catalog::{CatalogClientSettings, HttpCatalogClient};
use crate::app::report::{render_enriched_data, render_report, ReportInput};
use crate::core::aligner::IdAligner;
use crate::core::analytics::{SalesAnalytics, DEFAULT_TOP_N};
use crate::core::enrichment::enrich_records;
use crate::core::filter::apply_filter;
use crate::core::parser::parse_candidates;
use crate::core::validator::clean_records;
use crate::core::{CatalogSource, CleaningOutcome, ConfigProvider, Pipeline, Storage};
use crate::domain::model::{ArtifactOutcome, CatalogMapping, LoadSummary, TransformResult};
use crate::utils::error::{EtlError, Result};
use std::io::Write;
use std::path::Path;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Sales transaction pipeline: clean the input file, enrich it from the
/// product catalog, then write the enriched data and the text report.
pub struct SalesPipeline<S: Storage, C: ConfigProvider, K: CatalogSource = HttpCatalogClient> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) catalog: K,
    aligner: IdAligner,
}

impl<S: Storage, C: ConfigProvider> SalesPipeline<S, C, HttpCatalogClient> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let catalog = HttpCatalogClient::new(CatalogClientSettings::from_config(&config))?;
        Self::with_catalog(storage, config, catalog)
    }
}

impl<S: Storage, C: ConfigProvider, K: CatalogSource> SalesPipeline<S, C, K> {
    pub fn with_catalog(storage: S, config: C, catalog: K) -> Result<Self> {
        let aligner = IdAligner::new(config.catalog_range())?;
        Ok(Self {
            storage,
            config,
            catalog,
            aligner,
        })
    }

    async fn fetch_mapping(&self, warnings: &mut Vec<String>) -> CatalogMapping {
        match self.catalog.fetch_catalog().await {
            Ok(products) => {
                let mapping = CatalogMapping::from_products(products);
                if mapping.is_empty() {
                    warnings.push("Product catalog returned no products".to_string());
                }
                mapping
            }
            Err(e) => {
                tracing::warn!("⚠️ Catalog unavailable, continuing without enrichment: {}", e);
                warnings.push(format!(
                    "Product catalog unavailable ({}); no records were enriched",
                    e
                ));
                CatalogMapping::empty()
            }
        }
    }

    async fn write_artifact(&self, name: &'static str, path: &str, data: &[u8]) -> ArtifactOutcome {
        let error = match self.storage.write_file(path, data).await {
            Ok(()) => {
                tracing::debug!("Wrote {} ({} bytes) to {}", name, data.len(), path);
                None
            }
            Err(e) => {
                tracing::error!("Failed to write {} to {}: {}", name, path, e);
                Some(e.to_string())
            }
        };

        ArtifactOutcome {
            name,
            path: path.to_string(),
            error,
        }
    }
}

fn build_archive(entries: &[(&str, &[u8])]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for &(path, data) in entries {
        let name = Path::new(path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(path);
        zip.start_file(name, SimpleFileOptions::default())?;
        zip.write_all(data)?;
    }
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, K: CatalogSource> Pipeline for SalesPipeline<S, C, K> {
    async fn extract(&self) -> Result<CleaningOutcome> {
        let path = self.config.input_path();
        tracing::info!("📄 Reading sales data from {}", path);

        let bytes = self.storage.read_file(path).await.map_err(|e| match e {
            EtlError::IoError(source) => EtlError::InputUnavailable {
                path: path.to_string(),
                source,
            },
            other => other,
        })?;

        let candidates = parse_candidates(bytes.as_slice(), self.config.decode_policy());
        let cleaned = clean_records(candidates);

        let filter = self.config.record_filter();
        if filter.is_empty() {
            Ok(cleaned)
        } else {
            Ok(apply_filter(cleaned, &filter))
        }
    }

    async fn transform(&self, cleaned: CleaningOutcome) -> Result<TransformResult> {
        let CleaningOutcome { records, report } = cleaned;
        let analytics = SalesAnalytics::compute(
            &records,
            DEFAULT_TOP_N,
            self.config.low_performer_threshold(),
        );
        let aligned = self.aligner.align_records(records);

        let mut warnings = Vec::new();
        let mapping = self.fetch_mapping(&mut warnings).await;
        let (enriched, enrichment) = enrich_records(&aligned, &mapping);

        Ok(TransformResult {
            cleaning: report,
            enriched,
            enrichment,
            catalog_size: mapping.len(),
            analytics,
            warnings,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<LoadSummary> {
        let mut warnings = result.warnings;
        let mut artifacts = Vec::new();

        let enriched_path = self.config.enriched_output_path();
        let enriched_data = match render_enriched_data(&result.enriched) {
            Ok(data) => {
                let outcome = self.write_artifact("Enriched data", enriched_path, &data).await;
                let written = outcome.is_written();
                artifacts.push(outcome);
                written.then_some(data)
            }
            Err(e) => {
                artifacts.push(ArtifactOutcome {
                    name: "Enriched data",
                    path: enriched_path.to_string(),
                    error: Some(e.to_string()),
                });
                None
            }
        };
        if let Some(failure) = artifacts.iter().find_map(|a| a.error.as_ref()) {
            warnings.push(format!("Enriched data file was not written: {}", failure));
        }

        let report = render_report(&ReportInput {
            generated_at: chrono::Local::now().naive_local(),
            cleaning: &result.cleaning,
            analytics: &result.analytics,
            enrichment: &result.enrichment,
            catalog_size: result.catalog_size,
            warnings: &warnings,
        });

        let report_path = self.config.report_path();
        let report_outcome = self
            .write_artifact("Sales report", report_path, report.as_bytes())
            .await;
        artifacts.push(report_outcome);

        if let Some(archive_path) = self.config.archive_path() {
            let mut entries: Vec<(&str, &[u8])> = vec![(report_path, report.as_bytes())];
            if let Some(data) = &enriched_data {
                entries.insert(0, (enriched_path, data.as_slice()));
            }
            let outcome = match build_archive(&entries) {
                Ok(bundle) => self.write_artifact("Output bundle", archive_path, &bundle).await,
                Err(e) => ArtifactOutcome {
                    name: "Output bundle",
                    path: archive_path.to_string(),
                    error: Some(e.to_string()),
                },
            };
            artifacts.push(outcome);
        }

        Ok(LoadSummary {
            artifacts,
            warnings,
        })
    }
}
