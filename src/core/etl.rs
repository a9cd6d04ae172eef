use crate::core::{Pipeline, TransformResult, TransformStats};
use crate::utils::error::Result;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_path: String,
    pub stats: TransformStats,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let result = self.preview().await?;

        tracing::info!("Loading data...");
        let output_path = self.pipeline.load(&result).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(RunSummary {
            output_path,
            stats: result.stats,
        })
    }

    /// Extract and transform without writing anything.
    pub async fn preview(&self) -> Result<TransformResult> {
        tracing::info!("Extracting data...");
        let batch = self.pipeline.extract().await?;
        tracing::info!("Extracted {} records", batch.records.len());

        tracing::info!("Transforming data...");
        let result = self.pipeline.transform(batch).await?;
        let stats = &result.stats;
        tracing::info!(
            "Transformed {} records ({} variant groups, {} categories rewritten, {} brands cleared, {} ETA flags)",
            stats.rows,
            stats.variant_groups,
            stats.categories_rewritten,
            stats.brands_cleared,
            stats.eta_flagged
        );

        Ok(result)
    }
}
