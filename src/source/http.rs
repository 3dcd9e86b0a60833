//! Blocking JSON-over-HTTP client shared by the directory and history sources

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::SourceError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const REQUEST_RETRIES: usize = 3;
const RETRY_BACKOFF_MS: u64 = 250;

#[derive(Clone)]
pub(crate) struct JsonClient {
    agent: ureq::Agent,
    headers: Vec<(String, String)>,
}

impl JsonClient {
    pub(crate) fn new() -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .build()
            .into();
        Self {
            agent,
            headers: Vec::new(),
        }
    }

    /// Header sent with every request
    pub(crate) fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// GET `url` with query parameters and parse the body as JSON.
    /// Transport failures and 5xx responses are retried with linear backoff.
    pub(crate) fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, SourceError> {
        let mut last_error = String::new();

        for attempt in 0..REQUEST_RETRIES {
            let mut request = self.agent.get(url);
            for (name, value) in &self.headers {
                request = request.header(name.as_str(), value.as_str());
            }
            for (name, value) in query {
                request = request.query(*name, value.as_str());
            }

            debug!(url, attempt, "GET");
            match request.call() {
                Ok(response) => {
                    let mut body = response.into_body();
                    return serde_json::from_reader(body.as_reader()).map_err(|e| {
                        SourceError::Response {
                            url: url.to_string(),
                            message: format!("invalid JSON: {e}"),
                        }
                    });
                }
                Err(ureq::Error::StatusCode(code)) if code < 500 => {
                    return Err(SourceError::Request {
                        url: url.to_string(),
                        message: format!("HTTP {code}"),
                    });
                }
                Err(e) => {
                    warn!(url, attempt, error = %e, "request failed");
                    last_error = e.to_string();
                }
            }

            if attempt + 1 < REQUEST_RETRIES {
                std::thread::sleep(Duration::from_millis(
                    RETRY_BACKOFF_MS * (attempt as u64 + 1),
                ));
            }
        }

        Err(SourceError::Request {
            url: url.to_string(),
            message: last_error,
        })
    }
}

/// `base` + `path` without doubled or missing slashes
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
