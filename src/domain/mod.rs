pub mod model;
pub mod ports;

pub use model::{RawRecord, RoadRecord, SkippedRecord, TransformError, TransformReport};
pub use ports::{ConfigProvider, Pipeline, RoadStore};
