pub mod attributes;
pub mod blacklist;
pub mod category;
pub mod etl;
pub mod list_literal;
pub mod normalize;
pub mod pipeline;
pub mod transformer;

pub use crate::domain::model::{Batch, Record, TransformResult, TransformStats};
pub use crate::domain::ports::{ConfigProvider, OutputFormat, Pipeline, Storage};
pub use crate::utils::error::Result;
