use crate::core::fetch::{fetch_json, FetchPolicy};
use crate::core::{ConfigProvider, Pipeline, RawRecord, RoadStore};
use crate::domain::model::{RoadRecord, SkippedRecord, TransformError, TransformReport};
use crate::utils::error::Result;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

pub struct RoadsPipeline<S: RoadStore, C: ConfigProvider> {
    store: S,
    config: C,
    client: Client,
}

impl<S: RoadStore, C: ConfigProvider> RoadsPipeline<S, C> {
    pub fn new(store: S, config: C) -> Self {
        Self {
            store,
            config,
            client: Client::new(),
        }
    }
}

/// API 回應支援兩種形狀：裸陣列，或 Overpass 的 elements 物件
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiPayload {
    Elements { elements: Vec<RawRecord> },
    Records(Vec<RawRecord>),
}

impl ApiPayload {
    fn into_records(self) -> Vec<RawRecord> {
        match self {
            ApiPayload::Elements { elements } => elements,
            ApiPayload::Records(records) => records,
        }
    }
}

/// 原始實作針對單一城市抓公路的 Overpass QL 查詢
fn overpass_query(city: &str) -> String {
    format!(
        "area[\"name\"=\"{}\"]->.a;\n(\n  way(area.a)[highway];\n);\nout geom;",
        city
    )
}

#[async_trait::async_trait]
impl<S: RoadStore, C: ConfigProvider> Pipeline for RoadsPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<RawRecord>> {
        let policy = FetchPolicy {
            retry_attempts: self.config.retry_attempts(),
            retry_delay: self.config.retry_delay(),
            timeout: self.config.request_timeout(),
        };

        // 有配置城市就帶 Overpass 查詢，否則直接 GET
        let query = self.config.city_name().map(overpass_query);
        let params: Option<Vec<(&str, &str)>> =
            query.as_deref().map(|q| vec![("data", q)]);

        tracing::debug!("Making API request to: {}", self.config.source_url());
        let payload: ApiPayload = fetch_json(
            &self.client,
            self.config.source_url(),
            params.as_deref(),
            &policy,
        )
        .await?;

        let records = payload.into_records();
        if records.is_empty() {
            tracing::warn!("⚠️ API returned no records");
        }
        Ok(records)
    }

    async fn transform(&self, data: Vec<RawRecord>) -> Result<TransformReport> {
        let report = transform_records(data);

        for skip in &report.skipped {
            tracing::warn!(
                "⚠️ Skipping record {}: {}",
                skip.road_id.as_deref().unwrap_or("<no id>"),
                skip.reason
            );
        }

        Ok(report)
    }

    async fn load(&self, report: TransformReport) -> Result<u64> {
        // 建表是條件式的，每次執行都可以安全重跑
        self.store.ensure_schema().await?;

        let inserted = self.store.insert_roads(&report.roads).await?;
        tracing::debug!(
            "Inserted {} of {} transformed rows",
            inserted,
            report.roads.len()
        );
        Ok(inserted)
    }
}

/// 純轉換：逐筆映射到目標欄位，失敗的記錄跳過並記錄原因
pub fn transform_records(records: Vec<RawRecord>) -> TransformReport {
    let mut roads = Vec::with_capacity(records.len());
    let mut skipped = Vec::new();

    for record in &records {
        match transform_record(record) {
            Ok(road) => roads.push(road),
            Err(reason) => skipped.push(SkippedRecord {
                road_id: record.data.get("id").and_then(coerce_string),
                reason,
            }),
        }
    }

    TransformReport { roads, skipped }
}

fn transform_record(record: &RawRecord) -> std::result::Result<RoadRecord, TransformError> {
    let road_id = match record.data.get("id") {
        Some(value) => {
            coerce_string(value).ok_or(TransformError::UnsupportedType { field: "id" })?
        }
        None => return Err(TransformError::MissingField("id")),
    };

    let tags = record.data.get("tags").and_then(Value::as_object);

    // 沒有名稱就退回 road_<id>
    let road_name = tags
        .and_then(|t| t.get("name"))
        .or_else(|| record.data.get("name"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_else(|| format!("road_{}", road_id));

    let road_type = tags
        .and_then(|t| t.get("highway"))
        .or_else(|| record.data.get("highway"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_else(|| "unknown".to_string());

    let trace = match record.data.get("geometry") {
        Some(value) => parse_trace(value)?,
        None => Vec::new(),
    };

    // 沒有頂層座標時，取軌跡的第一個點當代表座標
    let lat = match record.data.get("lat") {
        Some(value) => coerce_f64(value).ok_or_else(|| TransformError::NotNumeric {
            field: "lat",
            value: value.to_string(),
        })?,
        None => trace
            .first()
            .map(|(_, lat)| *lat)
            .ok_or(TransformError::MissingField("lat"))?,
    };
    let lon = match record.data.get("lon") {
        Some(value) => coerce_f64(value).ok_or_else(|| TransformError::NotNumeric {
            field: "lon",
            value: value.to_string(),
        })?,
        None => trace
            .first()
            .map(|(lon, _)| *lon)
            .ok_or(TransformError::MissingField("lon"))?,
    };

    let geom = if trace.is_empty() {
        None
    } else {
        Some(linestring_wkt(&trace))
    };

    Ok(RoadRecord {
        road_id,
        road_name,
        road_type,
        lat,
        lon,
        geom,
    })
}

/// 軌跡點以 (lon, lat) 回傳，對齊 WKT 的座標順序
fn parse_trace(value: &Value) -> std::result::Result<Vec<(f64, f64)>, TransformError> {
    let points = value
        .as_array()
        .ok_or_else(|| TransformError::BadGeometry("geometry is not an array".to_string()))?;

    let mut trace = Vec::with_capacity(points.len());
    for point in points {
        let obj = point.as_object().ok_or_else(|| {
            TransformError::BadGeometry("trace point is not an object".to_string())
        })?;
        let lon = obj
            .get("lon")
            .and_then(coerce_f64)
            .ok_or_else(|| TransformError::BadGeometry(format!("point has no lon: {}", point)))?;
        let lat = obj
            .get("lat")
            .and_then(coerce_f64)
            .ok_or_else(|| TransformError::BadGeometry(format!("point has no lat: {}", point)))?;
        trace.push((lon, lat));
    }
    Ok(trace)
}

fn linestring_wkt(trace: &[(f64, f64)]) -> String {
    let coords: Vec<String> = trace
        .iter()
        .map(|(lon, lat)| format!("{} {}", lon, lat))
        .collect();
    format!("LINESTRING({})", coords.join(", "))
}

fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStore {
        rows: Arc<Mutex<Vec<RoadRecord>>>,
    }

    impl MockStore {
        fn new() -> Self {
            Self::default()
        }

        async fn rows(&self) -> Vec<RoadRecord> {
            self.rows.lock().await.clone()
        }
    }

    impl RoadStore for MockStore {
        async fn ensure_schema(&self) -> Result<()> {
            Ok(())
        }

        async fn insert_roads(&self, roads: &[RoadRecord]) -> Result<u64> {
            let mut rows = self.rows.lock().await;
            rows.extend_from_slice(roads);
            Ok(roads.len() as u64)
        }
    }

    struct MockConfig {
        source_url: String,
        city_name: Option<String>,
    }

    impl MockConfig {
        fn new(source_url: String) -> Self {
            Self {
                source_url,
                city_name: None,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn source_url(&self) -> &str {
            &self.source_url
        }

        fn city_name(&self) -> Option<&str> {
            self.city_name.as_deref()
        }

        fn request_timeout(&self) -> Duration {
            Duration::from_secs(5)
        }

        fn retry_attempts(&self) -> u32 {
            1
        }

        fn retry_delay(&self) -> Duration {
            Duration::ZERO
        }
    }

    fn record(json: serde_json::Value) -> RawRecord {
        let mut data = HashMap::new();
        if let Value::Object(obj) = json {
            for (key, value) in obj {
                data.insert(key, value);
            }
        }
        RawRecord { data }
    }

    #[tokio::test]
    async fn test_extract_bare_array_response() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/roads");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {"id": "1", "lat": "10.5", "lon": "20.1"},
                    {"id": "2", "lat": "11.5", "lon": "21.1"}
                ]));
        });

        let pipeline = RoadsPipeline::new(MockStore::new(), MockConfig::new(server.url("/roads")));
        let records = pipeline.extract().await.unwrap();

        api_mock.assert();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].data.get("id").unwrap().as_str().unwrap(), "1");
    }

    #[tokio::test]
    async fn test_extract_overpass_elements_response() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/interpreter");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "version": 0.6,
                    "generator": "Overpass API",
                    "elements": [
                        {"type": "way", "id": 42, "tags": {"highway": "primary"}}
                    ]
                }));
        });

        let pipeline =
            RoadsPipeline::new(MockStore::new(), MockConfig::new(server.url("/interpreter")));
        let records = pipeline.extract().await.unwrap();

        api_mock.assert();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].data.get("id").unwrap().as_i64().unwrap(), 42);
    }

    #[tokio::test]
    async fn test_extract_sends_overpass_query_for_configured_city() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/interpreter")
                .query_param("data", overpass_query("Helsinki"));
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"elements": []}));
        });

        let config = MockConfig {
            source_url: server.url("/interpreter"),
            city_name: Some("Helsinki".to_string()),
        };
        let pipeline = RoadsPipeline::new(MockStore::new(), config);
        let records = pipeline.extract().await.unwrap();

        api_mock.assert();
        assert!(records.is_empty());
    }

    #[test]
    fn test_transform_clean_records_keeps_every_record() {
        let input = vec![
            record(serde_json::json!({"id": "1", "lat": "10.5", "lon": "20.1"})),
            record(serde_json::json!({"id": 2, "lat": 11.25, "lon": 21.75})),
        ];

        let report = transform_records(input);

        assert_eq!(report.roads.len(), 2);
        assert!(report.skipped.is_empty());
        assert_eq!(report.roads[0].lat, 10.5);
        assert_eq!(report.roads[0].lon, 20.1);
        assert_eq!(report.roads[1].road_id, "2");
    }

    #[test]
    fn test_transform_applies_original_fallbacks() {
        let input = vec![record(serde_json::json!({
            "id": "7", "lat": "1.0", "lon": "2.0"
        }))];

        let report = transform_records(input);

        assert_eq!(report.roads[0].road_name, "road_7");
        assert_eq!(report.roads[0].road_type, "unknown");
        assert!(report.roads[0].geom.is_none());
    }

    #[test]
    fn test_transform_reads_name_and_type_from_tags() {
        let input = vec![record(serde_json::json!({
            "id": 42,
            "tags": {"name": "Mannerheimintie", "highway": "primary"},
            "lat": 60.17,
            "lon": 24.93
        }))];

        let report = transform_records(input);

        assert_eq!(report.roads[0].road_name, "Mannerheimintie");
        assert_eq!(report.roads[0].road_type, "primary");
    }

    #[test]
    fn test_transform_builds_wkt_linestring_from_trace() {
        let input = vec![record(serde_json::json!({
            "id": 42,
            "geometry": [
                {"lat": 60.5, "lon": 24.25},
                {"lat": 60.75, "lon": 24.5}
            ]
        }))];

        let report = transform_records(input);

        let road = &report.roads[0];
        assert_eq!(
            road.geom.as_deref(),
            Some("LINESTRING(24.25 60.5, 24.5 60.75)")
        );
        // Representative point comes from the first trace point
        assert_eq!(road.lat, 60.5);
        assert_eq!(road.lon, 24.25);
    }

    #[test]
    fn test_transform_skips_record_missing_required_field() {
        let input = vec![
            record(serde_json::json!({"lat": "10.5", "lon": "20.1"})),
            record(serde_json::json!({"id": "2", "lon": "20.1"})),
        ];

        let report = transform_records(input);

        assert!(report.roads.is_empty());
        assert_eq!(report.skipped.len(), 2);
        assert_eq!(report.skipped[0].reason, TransformError::MissingField("id"));
        assert_eq!(report.skipped[0].road_id, None);
        assert_eq!(
            report.skipped[1].reason,
            TransformError::MissingField("lat")
        );
        assert_eq!(report.skipped[1].road_id.as_deref(), Some("2"));
    }

    #[test]
    fn test_transform_skips_record_with_non_numeric_coordinate() {
        let input = vec![record(serde_json::json!({
            "id": "3", "lat": "not-a-number", "lon": "20.1"
        }))];

        let report = transform_records(input);

        assert!(report.roads.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(
            report.skipped[0].reason,
            TransformError::NotNumeric { field: "lat", .. }
        ));
    }

    #[test]
    fn test_transform_rejects_whole_record_on_bad_trace() {
        // One good point, one point without lon: the record goes, not the point
        let input = vec![record(serde_json::json!({
            "id": "4",
            "geometry": [
                {"lat": 60.5, "lon": 24.25},
                {"lat": 60.75}
            ]
        }))];

        let report = transform_records(input);

        assert!(report.roads.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert!(matches!(
            report.skipped[0].reason,
            TransformError::BadGeometry(_)
        ));
    }

    #[test]
    fn test_transform_mixed_batch_skips_and_continues() {
        let input = vec![
            record(serde_json::json!({"id": "1", "lat": "10.5", "lon": "20.1"})),
            record(serde_json::json!({"id": "2", "lat": "bad", "lon": "20.1"})),
            record(serde_json::json!({"id": "3", "lat": "12.5", "lon": "22.1"})),
        ];

        let report = transform_records(input);

        assert_eq!(report.roads.len(), 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.roads[0].road_id, "1");
        assert_eq!(report.roads[1].road_id, "3");
    }

    #[test]
    fn test_transform_empty_input() {
        let report = transform_records(Vec::new());
        assert!(report.roads.is_empty());
        assert!(report.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_load_ensures_schema_then_inserts() {
        let store = MockStore::new();
        let pipeline = RoadsPipeline::new(store.clone(), MockConfig::new("http://unused".into()));

        let report = TransformReport {
            roads: vec![RoadRecord {
                road_id: "1".to_string(),
                road_name: "road_1".to_string(),
                road_type: "unknown".to_string(),
                lat: 10.5,
                lon: 20.1,
                geom: None,
            }],
            skipped: Vec::new(),
        };

        let inserted = pipeline.load(report).await.unwrap();

        assert_eq!(inserted, 1);
        assert_eq!(store.rows().await.len(), 1);
    }
}
