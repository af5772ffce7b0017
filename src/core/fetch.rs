use crate::utils::error::{EtlError, FetchFailure, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct FetchPolicy {
    pub retry_attempts: u32,
    pub retry_delay: Duration,
    pub timeout: Duration,
}

/// 帶重試的 GET：只重試暫時性失敗，重試間隔線性增加
pub async fn fetch_json<T>(
    client: &Client,
    url: &str,
    query: Option<&[(&str, &str)]>,
    policy: &FetchPolicy,
) -> Result<T>
where
    T: DeserializeOwned,
{
    let max_attempts = policy.retry_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        match try_fetch(client, url, query, policy.timeout).await {
            Ok(value) => return Ok(value),
            Err(failure) => {
                if !failure.is_retryable() || attempt >= max_attempts {
                    return Err(EtlError::FetchError {
                        attempts: attempt,
                        failure,
                    });
                }
                let delay = policy.retry_delay * attempt;
                tracing::warn!(
                    "🔄 Fetch attempt {}/{} failed: {}. Retrying in {:?}",
                    attempt,
                    max_attempts,
                    failure,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

async fn try_fetch<T>(
    client: &Client,
    url: &str,
    query: Option<&[(&str, &str)]>,
    timeout: Duration,
) -> std::result::Result<T, FetchFailure>
where
    T: DeserializeOwned,
{
    let mut request = client.get(url).timeout(timeout);
    if let Some(params) = query {
        request = request.query(params);
    }

    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            FetchFailure::Timeout
        } else {
            FetchFailure::Transport(e)
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchFailure::Status(status));
    }

    response.json::<T>().await.map_err(|e| {
        if e.is_timeout() {
            FetchFailure::Timeout
        } else {
            FetchFailure::Body(e.to_string())
        }
    })
}
