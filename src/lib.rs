pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use core::{engine::DashboardEngine, pipeline::DashboardPipeline};
pub use utils::error::{DashboardError, Result};
