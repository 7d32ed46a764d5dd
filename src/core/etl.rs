use crate::core::{LoadSummary, Pipeline};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Outcome of a full run, summarised for the binaries.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub load: LoadSummary,
    pub warnings: Vec<String>,
    pub enriched: usize,
    pub attempted: usize,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        self.load.has_failures()
    }
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting sales ETL run");

        tracing::info!("[1/3] Reading and cleaning sales data");
        let cleaned = self.pipeline.extract().await?;
        tracing::info!(
            "Cleaned data: {} parsed, {} retained, {} after filters",
            cleaned.report.total_parsed,
            cleaned.report.retained,
            cleaned.report.final_count
        );
        self.monitor.log_stats("extract");

        tracing::info!("[2/3] Aligning ids and enriching from catalog");
        let transformed = self.pipeline.transform(cleaned).await?;
        tracing::info!(
            "Enriched {}/{} records ({:.1}%)",
            transformed.enrichment.total_enriched,
            transformed.enrichment.total_attempted,
            transformed.enrichment.success_rate()
        );
        self.monitor.log_stats("transform");

        let enriched = transformed.enrichment.total_enriched;
        let attempted = transformed.enrichment.total_attempted;

        tracing::info!("[3/3] Writing enriched data and report");
        let load = self.pipeline.load(transformed).await?;
        for artifact in &load.artifacts {
            match &artifact.error {
                None => tracing::info!("📁 {} saved to: {}", artifact.name, artifact.path),
                Some(e) => tracing::error!("❌ {} not written to {}: {}", artifact.name, artifact.path, e),
            }
        }
        self.monitor.log_stats("load");
        self.monitor.log_final_stats();

        Ok(RunSummary {
            warnings: load.warnings.clone(),
            load,
            enriched,
            attempted,
        })
    }
}
