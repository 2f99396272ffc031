//! Blocking HTTP plumbing shared by the remote stores and the media resolver.

use std::time::Duration;

use crate::foundation::error::{FramemarkError, FramemarkResult};

/// Pause before the single retry.
const RETRY_DELAY: Duration = Duration::from_millis(200);

/// Client bound to one API base URL.
#[derive(Clone, Debug)]
pub struct HttpApi {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> FramemarkResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FramemarkError::remote(format!("build http client: {e}")))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Reuse an existing client (connection pool shared across stores).
    pub fn with_client(client: reqwest::blocking::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path (`/get-advices/v1`).
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Whether `url` is served from this API's origin.
    pub fn is_same_origin(&self, url: &str) -> bool {
        url.strip_prefix(&self.base_url)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }

    /// Send a request built by `build`, retrying exactly once on transport errors or non-2xx.
    pub fn send(
        &self,
        what: &str,
        build: impl Fn(&reqwest::blocking::Client) -> reqwest::blocking::RequestBuilder,
    ) -> FramemarkResult<reqwest::blocking::Response> {
        match self.try_send(what, &build) {
            Ok(response) => Ok(response),
            Err(first) => {
                tracing::warn!(what, error = %first, "request failed, retrying once");
                std::thread::sleep(RETRY_DELAY);
                self.try_send(what, &build).inspect_err(|e| {
                    tracing::error!(what, error = %e, "request failed after retry");
                })
            }
        }
    }

    /// [`HttpApi::send`] then decode a JSON body.
    pub fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        what: &str,
        build: impl Fn(&reqwest::blocking::Client) -> reqwest::blocking::RequestBuilder,
    ) -> FramemarkResult<T> {
        self.send(what, build)?
            .json()
            .map_err(|e| FramemarkError::remote(format!("{what}: malformed response: {e}")))
    }

    fn try_send(
        &self,
        what: &str,
        build: &impl Fn(&reqwest::blocking::Client) -> reqwest::blocking::RequestBuilder,
    ) -> FramemarkResult<reqwest::blocking::Response> {
        let response = build(&self.client)
            .send()
            .map_err(|e| FramemarkError::remote(format!("{what}: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(FramemarkError::remote(format!(
                "{what} returned HTTP {}",
                status.as_u16()
            )));
        }
        Ok(response)
    }
}
