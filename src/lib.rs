pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::{cli::LocalStorage, job::FileJob, toml_config::CleanerConfig};
pub use crate::core::{
    attributes::{AttributeRules, MaterialRule},
    blacklist::Blacklist,
    category::{clean_category, parse_category_cell, remove_blacklisted, remove_flat_duplicates},
    etl::{EtlEngine, RunSummary},
    normalize::normalize,
    pipeline::CsvPipeline,
    transformer::RowTransformer,
};
pub use crate::domain::model::{Batch, Record, TransformResult, TransformStats};
pub use crate::utils::error::{CleanError, Result};
