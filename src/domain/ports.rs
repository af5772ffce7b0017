use crate::domain::model::{RawRecord, RoadRecord, TransformReport};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

pub trait RoadStore: Send + Sync {
    fn ensure_schema(&self) -> impl std::future::Future<Output = Result<()>> + Send;
    fn insert_roads(
        &self,
        roads: &[RoadRecord],
    ) -> impl std::future::Future<Output = Result<u64>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn source_url(&self) -> &str;
    fn city_name(&self) -> Option<&str>;
    fn request_timeout(&self) -> Duration;
    fn retry_attempts(&self) -> u32;
    fn retry_delay(&self) -> Duration;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<RawRecord>>;
    async fn transform(&self, data: Vec<RawRecord>) -> Result<TransformReport>;
    async fn load(&self, report: TransformReport) -> Result<u64>;
}
