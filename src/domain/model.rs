use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// API 回應的原始記錄，欄位未經轉換
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(flatten)]
    pub data: HashMap<String, serde_json::Value>,
}

/// 目標資料表一列：欄位已重新命名並轉成儲存型別
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadRecord {
    pub road_id: String,
    pub road_name: String,
    pub road_type: String,
    pub lat: f64,
    pub lon: f64,
    /// WKT LINESTRING，沒有軌跡就是 None
    pub geom: Option<String>,
}

/// 單筆記錄轉換失敗的原因；只跳過該筆，不會中止整批
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("field {field} is not numeric: {value}")]
    NotNumeric { field: &'static str, value: String },

    #[error("field {field} has an unsupported type")]
    UnsupportedType { field: &'static str },

    #[error("invalid geometry: {0}")]
    BadGeometry(String),
}

#[derive(Debug, Clone)]
pub struct SkippedRecord {
    pub road_id: Option<String>,
    pub reason: TransformError,
}

#[derive(Debug, Clone)]
pub struct TransformReport {
    pub roads: Vec<RoadRecord>,
    pub skipped: Vec<SkippedRecord>,
}
