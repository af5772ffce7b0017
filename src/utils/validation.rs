use crate::utils::error::{EtlError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, reason: impl Into<String>) -> EtlError {
    EtlError::ConfigError {
        field: field.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field: &str, value: &str) -> Result<()> {
    let parsed =
        Url::parse(value).map_err(|e| invalid(field, format!("not a valid URL: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(invalid(field, format!("unsupported URL scheme: {}", scheme))),
    }
}

pub fn validate_at_least(field: &str, value: u64, min: u64) -> Result<()> {
    if value < min {
        return Err(invalid(field, format!("must be at least {}", min)));
    }
    Ok(())
}

pub fn validate_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, "must not be empty or whitespace-only"));
    }
    Ok(())
}
