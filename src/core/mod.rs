pub mod etl;
pub mod fetch;
pub mod pipeline;

pub use crate::domain::model::{RawRecord, RoadRecord, SkippedRecord, TransformReport};
pub use crate::domain::ports::{ConfigProvider, Pipeline, RoadStore};
pub use crate::utils::error::Result;
