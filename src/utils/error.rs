use thiserror::Error;

/// 抓取失敗的分類，決定是否重試
#[derive(Error, Debug)]
pub enum FetchFailure {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    #[error("unexpected HTTP status: {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed response body: {0}")]
    Body(String),
}

impl FetchFailure {
    /// 逾時、傳輸錯誤與 5xx 可以重試，其他都是終止性失敗
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchFailure::Timeout | FetchFailure::Transport(_) => true,
            FetchFailure::Status(status) => status.is_server_error(),
            FetchFailure::Body(_) => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("fetch failed after {attempts} attempt(s): {failure}")]
    FetchError { attempts: u32, failure: FetchFailure },

    #[error("database error: {0}")]
    LoadError(#[from] sqlx::Error),

    #[error("invalid configuration for {field}: {reason}")]
    ConfigError { field: String, reason: String },
}

impl EtlError {
    pub fn exit_code(&self) -> i32 {
        match self {
            EtlError::ConfigError { .. } => 2,
            EtlError::FetchError { .. } => 3,
            EtlError::LoadError(_) => 4,
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
