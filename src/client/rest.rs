use reqwest::blocking::Response;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use super::ClientError;

/// Percent-encode a single path segment using the
/// application/x-www-form-urlencoded convention (space becomes `+`).
/// Always applied to caller-supplied identifiers; never assumes the
/// input is well-formed.
pub fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}

/// Low-level executor for single-shot REST calls. Each call builds its
/// own transport client so no connection outlives the call.
#[derive(Debug, Clone)]
pub struct RestClient {
    auth_token: String,
}

impl RestClient {
    pub fn new(auth_token: String) -> Self {
        RestClient { auth_token }
    }

    /// Execute a request that expects a JSON response body, deserialized
    /// into `T` after the response has been validated.
    pub fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<String>,
    ) -> Result<T, ClientError> {
        let text = self.send(method, url, body, true)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Execute a fire-and-forget request: the response is validated and
    /// its body discarded.
    pub fn execute_void(
        &self,
        method: Method,
        url: &str,
        body: Option<String>,
    ) -> Result<(), ClientError> {
        self.send(method, url, body, false)?;
        Ok(())
    }

    /// Send one request and return the body text of a 200 response. The
    /// transport client is scoped to this call and released on every
    /// exit path, including validation failure.
    fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<String>,
        expect_json: bool,
    ) -> Result<String, ClientError> {
        let client = reqwest::blocking::Client::new();
        let mut request = client
            .request(method.clone(), url)
            .header(AUTHORIZATION, format!("Basic {}", self.auth_token));

        if let Some(content) = body {
            request = request
                .header(CONTENT_TYPE, "application/json; charset=utf-8")
                .body(content);
        }
        if expect_json {
            request = request.header(ACCEPT, "application/json");
        }

        debug!(%method, url, "sending request");
        let response = request.send()?;
        let validated = Self::validate(response)?;
        Ok(validated.text()?)
    }

    /// A response is acceptable only when its status is exactly 200. Any
    /// other status is terminal for the call: the body is read
    /// best-effort and logged together with the status and headers.
    fn validate(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status == StatusCode::OK {
            return Ok(response);
        }

        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value.to_str().unwrap_or("<opaque>")))
            .collect::<Vec<_>>()
            .join("\n");
        let body = match response.text() {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "could not read response body");
                String::new()
            }
        };
        error!(
            expected = 200,
            actual = status.as_u16(),
            %headers,
            %body,
            "response status did not match expected value"
        );
        Err(ClientError::UnexpectedStatus(status.as_u16()))
    }
}
