use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{validate_at_least, validate_non_empty, validate_url, Validate};
use clap::Parser;
use sqlx::postgres::PgConnectOptions;
use std::time::Duration;

/// 啟動時一次建好的運行配置；環境變數與 CLI 旗標都可以設定
#[derive(Debug, Clone, Parser)]
#[command(name = "roads-etl")]
#[command(about = "Sync road data from an HTTP API into a Postgres table")]
pub struct EnvConfig {
    #[arg(long, env = "SOURCE_URL")]
    pub source_url: String,

    /// 設定後會帶上該城市的 Overpass 查詢
    #[arg(long, env = "CITY_NAME")]
    pub city_name: Option<String>,

    #[arg(long, env = "REQUEST_TIMEOUT", default_value = "30")]
    pub request_timeout_seconds: u64,

    #[arg(long, env = "RETRY_ATTEMPTS", default_value = "3")]
    pub retry_attempts: u32,

    #[arg(long, env = "RETRY_DELAY", default_value = "2")]
    pub retry_delay_seconds: u64,

    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub db_host: String,

    #[arg(long, env = "DB_PORT", default_value = "5432")]
    pub db_port: u16,

    #[arg(long, env = "DB_NAME")]
    pub db_name: String,

    #[arg(long, env = "DB_USER")]
    pub db_user: String,

    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    pub db_password: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log per-stage timing")]
    pub monitor: bool,
}

impl EnvConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.db_host)
            .port(self.db_port)
            .database(&self.db_name)
            .username(&self.db_user)
            .password(&self.db_password)
    }
}

impl ConfigProvider for EnvConfig {
    fn source_url(&self) -> &str {
        &self.source_url
    }

    fn city_name(&self) -> Option<&str> {
        self.city_name.as_deref()
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    fn retry_attempts(&self) -> u32 {
        self.retry_attempts
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_seconds)
    }
}

impl Validate for EnvConfig {
    fn validate(&self) -> Result<()> {
        validate_url("source_url", &self.source_url)?;
        validate_at_least("request_timeout", self.request_timeout_seconds, 1)?;
        validate_at_least("retry_attempts", u64::from(self.retry_attempts), 1)?;
        validate_non_empty("db_host", &self.db_host)?;
        validate_non_empty("db_name", &self.db_name)?;
        validate_non_empty("db_user", &self.db_user)?;
        Ok(())
    }
}
