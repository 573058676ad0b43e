//! HTTP fetch of dataset collections with retry for transient errors.
//!
//! Every remote collection goes through [`fetch_text`], which retries
//! connection failures, timeouts, HTTP 429 and HTTP 5xx with exponential
//! backoff. HTTP 4xx (other than 429) is permanent and fails immediately.

use std::time::Duration;

use crate::CatastroError;

/// Maximum number of retry attempts after the first request.
const MAX_RETRIES: u32 = 3;

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the HTTP client used for dataset downloads.
///
/// # Errors
///
/// Returns [`CatastroError::Http`] if the TLS backend cannot be
/// initialised.
pub fn client() -> Result<reqwest::Client, CatastroError> {
    Ok(reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()?)
}

/// Downloads `url` and returns the body as text.
///
/// # Errors
///
/// Returns [`CatastroError`] if the request still fails after
/// [`MAX_RETRIES`] retries or the server answers with a permanent error.
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String, CatastroError> {
    let response = send_with_retry(|| client.get(url), MAX_RETRIES).await?;
    let body = response.text().await?;
    log::debug!("Fetched {} bytes from {url}", body.len());
    Ok(body)
}

/// Sends the request built by `build_request`, retrying transient
/// failures. The builder closure runs once per attempt since
/// [`reqwest::RequestBuilder`] is consumed by `send()`.
async fn send_with_retry<F>(
    build_request: F,
    max_retries: u32,
) -> Result<reqwest::Response, CatastroError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = backoff(attempt);
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        let retries_left = attempt < max_retries;
        attempt += 1;

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && retries_left {
                    log::warn!("  transient error: {e}");
                    continue;
                }
                return Err(CatastroError::Http(e));
            }
            Ok(response) => {
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                    if retries_left {
                        log::warn!("  HTTP {status}");
                        continue;
                    }
                    return Err(status_error(&response));
                }

                if status.is_client_error() {
                    return Err(status_error(&response));
                }

                return Ok(response);
            }
        }
    }
}

fn status_error(response: &reqwest::Response) -> CatastroError {
    CatastroError::Status {
        status: response.status().as_u16(),
        url: response.url().to_string(),
    }
}

/// Delay before retry `attempt` (1-based): 2s, 4s, 8s, ...
const fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt)
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}
