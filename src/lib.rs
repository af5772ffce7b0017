pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::adapters::postgres::PgRoadStore;
pub use crate::config::EnvConfig;
pub use crate::core::{etl::EtlEngine, pipeline::RoadsPipeline};
pub use crate::utils::error::{EtlError, Result};
