use crate::domain::model::{Batch, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// Settings for processing one input file.
pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    /// `None` writes next to the input file.
    fn output_dir(&self) -> Option<&str>;
    fn delimiter(&self) -> u8;
    fn output_suffix(&self) -> &str;
    fn output_format(&self) -> OutputFormat;
    fn timestamp_format(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Batch>;
    async fn transform(&self, batch: Batch) -> Result<TransformResult>;
    async fn load(&self, result: &TransformResult) -> Result<String>;
}
