//! Retry policy for transfers from the download mirror.

use reqwest::StatusCode;
use thiserror::Error;

/// Maximum number of attempts for a single network operation.
pub const MAX_RETRIES: usize = 3;

/// Delay between attempts in milliseconds.
pub const RETRY_DELAY_MS: u64 = 1000;

/// Responses that will not improve by asking again.
#[derive(Debug, Error)]
pub enum NonRetryableError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Access forbidden: {0}")]
    Forbidden(String),

    #[error("Too many requests to {0}. Try again later or pick another mirror.")]
    TooManyRequests(String),

    #[error("Request error: HTTP {status} from {url}")]
    ClientError { status: u16, url: String },
}

/// Classifies an error as retryable or non-retryable.
/// Returns Ok(()) if the error is retryable.
pub fn classify_error(error: &reqwest::Error) -> Result<(), NonRetryableError> {
    let url = error
        .url()
        .map(|u| u.to_string())
        .unwrap_or_else(|| "(unknown URL)".to_string());

    match error.status() {
        Some(StatusCode::NOT_FOUND) => Err(NonRetryableError::NotFound(url)),
        Some(StatusCode::FORBIDDEN) => Err(NonRetryableError::Forbidden(url)),
        Some(StatusCode::TOO_MANY_REQUESTS) => Err(NonRetryableError::TooManyRequests(url)),
        Some(s) if s.is_client_error() => Err(NonRetryableError::ClientError {
            status: s.as_u16(),
            url,
        }),
        // 5xx, connection errors and timeouts
        _ => Ok(()),
    }
}

/// Converts an error from `error_for_status()` into an `anyhow::Error`,
/// wrapping it in [`NonRetryableError`] when retrying is pointless.
pub fn check_retryable(error: reqwest::Error) -> anyhow::Error {
    match classify_error(&error) {
        Ok(()) => anyhow::Error::from(error),
        Err(non_retryable) => anyhow::Error::from(non_retryable),
    }
}
