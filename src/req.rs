use reqwest::{Client, Response};
use std::time::Duration;
use tracing::warn;

use crate::{prelude::*, Error};

/// HTTP status codes that indicate transient server errors (retryable)
const RETRYABLE_STATUS_CODES: &[u16] = &[502, 503, 504];

/// Maximum number of retry attempts for transient errors
const MAX_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds (doubles with each retry)
const INITIAL_BACKOFF_MS: u64 = 100;

#[derive(Debug, Clone)]
pub(crate) struct HttpClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
}

async fn parse_response(response: Response) -> Result<String> {
    let status_code = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| Error::GenericRequest(e.to_string()))?;

    if status_code < 400 {
        return Ok(text);
    }
    if (400..500).contains(&status_code) {
        return Err(Error::client_error(status_code, text));
    }
    Err(Error::server_error(status_code, text))
}

impl HttpClient {
    pub(crate) fn new(client: Option<Client>, base_url: impl Into<String>) -> Self {
        Self {
            client: client.unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Send a GET request with automatic retry for transient server errors (502, 503, 504).
    ///
    /// Uses exponential backoff: 100ms, 200ms, 400ms between retries.
    pub(crate) async fn get(&self, url_path: &str) -> Result<String> {
        let full_url = format!("{}{url_path}", self.base_url);

        for attempt in 0..=MAX_RETRIES {
            let result = self
                .client
                .get(&full_url)
                .send()
                .await
                .map_err(|e| Error::GenericRequest(e.to_string()))?;

            let status = result.status().as_u16();

            if RETRYABLE_STATUS_CODES.contains(&status) && attempt < MAX_RETRIES {
                let backoff = Duration::from_millis(INITIAL_BACKOFF_MS * 2u64.pow(attempt));
                warn!(
                    target: "handlefi::oracle",
                    status = status,
                    attempt = attempt + 1,
                    max_attempts = MAX_RETRIES + 1,
                    backoff_ms = backoff.as_millis(),
                    url = %url_path,
                    "Retryable HTTP error, backing off"
                );
                tokio::time::sleep(backoff).await;
                continue;
            }

            return parse_response(result).await;
        }

        Err(Error::GenericRequest(format!(
            "Max retries ({MAX_RETRIES}) exceeded for {url_path}"
        )))
    }
}
