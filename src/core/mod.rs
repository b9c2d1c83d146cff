pub mod engine;
pub mod filter;
pub mod loader;
pub mod merge;
pub mod metrics;
pub mod pipeline;
pub mod render;

pub use crate::domain::model::{MasterRecord, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
