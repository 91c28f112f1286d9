pub mod rest;
pub mod types;

pub use types::{
    Comment, CommentThread, CommentThreadStatus, PullRequest, PullRequestStatus, StatusContext,
    StatusState,
};

use reqwest::Method;
use thiserror::Error;
use tracing::{debug, instrument};

use rest::{encode_segment, RestClient};
use types::{CommentThreadResponse, ThreadUpdate};

/// API version pinned for every request, sent as a query parameter.
const API_VERSION: &str = "4.1";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response code returned from the API - Expected: 200, Got: {0}")]
    UnexpectedStatus(u16),

    #[error("Failed to serialize or parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication token not found in config or environment")]
    MissingToken,
}

/// Typed facade over the pull-request host API. Each operation builds
/// its endpoint URL, serializes its payload, and hands off to the
/// generic executor; all failures funnel through the shared validation
/// in `rest`.
#[derive(Debug, Clone)]
pub struct DevOpsClient {
    rest: RestClient,
    base_url: String,
    project: String,
    repository: String,
}

impl DevOpsClient {
    pub fn new(
        base_url: impl Into<String>,
        project: impl Into<String>,
        repository: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Self {
        DevOpsClient {
            rest: RestClient::new(auth_token.into()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project: project.into(),
            repository: repository.into(),
        }
    }

    /// Submit a status check against a pull request.
    #[instrument(skip(self, status), fields(pull_request = pull_request_id))]
    pub fn submit_status(
        &self,
        pull_request_id: u32,
        status: &PullRequestStatus,
    ) -> Result<(), ClientError> {
        let url = self.pull_request_url(pull_request_id, "/statuses");
        self.rest
            .execute_void(Method::POST, &url, Some(serde_json::to_string(status)?))
    }

    /// List the comment threads attached to a pull request, in the order
    /// the host returns them.
    #[instrument(skip(self), fields(pull_request = pull_request_id))]
    pub fn list_threads(&self, pull_request_id: u32) -> Result<Vec<CommentThread>, ClientError> {
        let url = self.pull_request_url(pull_request_id, "/threads");
        let response: CommentThreadResponse = self.rest.execute(Method::GET, &url, None)?;
        debug!(threads = response.value.len(), "retrieved comment threads");
        Ok(response.value)
    }

    /// Create a new comment thread on a pull request.
    #[instrument(skip(self, thread), fields(pull_request = pull_request_id))]
    pub fn create_thread(
        &self,
        pull_request_id: u32,
        thread: &CommentThread,
    ) -> Result<(), ClientError> {
        let url = self.pull_request_url(pull_request_id, "/threads");
        self.rest
            .execute_void(Method::POST, &url, Some(serde_json::to_string(thread)?))
    }

    /// Add a comment to an existing thread.
    #[instrument(skip(self, comment), fields(pull_request = pull_request_id, thread = thread_id))]
    pub fn add_comment(
        &self,
        pull_request_id: u32,
        thread_id: i32,
        comment: &Comment,
    ) -> Result<(), ClientError> {
        let url =
            self.pull_request_url(pull_request_id, &format!("/threads/{thread_id}/comments"));
        self.rest
            .execute_void(Method::POST, &url, Some(serde_json::to_string(comment)?))
    }

    /// Mark a thread as closed. Sends a minimal partial update carrying
    /// only the new status.
    #[instrument(skip(self), fields(pull_request = pull_request_id, thread = thread_id))]
    pub fn resolve_thread(&self, pull_request_id: u32, thread_id: i32) -> Result<(), ClientError> {
        let url = self.pull_request_url(pull_request_id, &format!("/threads/{thread_id}"));
        let patch = ThreadUpdate {
            status: CommentThreadStatus::Closed,
        };
        self.rest
            .execute_void(Method::PATCH, &url, Some(serde_json::to_string(&patch)?))
    }

    /// Fetch pull-request metadata by id.
    #[instrument(skip(self), fields(pull_request = pull_request_id))]
    pub fn get_pull_request(&self, pull_request_id: u32) -> Result<PullRequest, ClientError> {
        let url = self.pull_request_url(pull_request_id, "");
        self.rest.execute(Method::GET, &url, None)
    }

    /// Compose a fully-qualified endpoint URL. Project and repository
    /// identifiers are percent-encoded unconditionally; the suffix names
    /// the sub-resource under the pull request (may be empty).
    fn pull_request_url(&self, pull_request_id: u32, suffix: &str) -> String {
        format!(
            "{}/{}/_apis/git/repositories/{}/pullRequests/{}{}?api-version={}",
            self.base_url,
            encode_segment(&self.project),
            encode_segment(&self.repository),
            pull_request_id,
            suffix,
            API_VERSION
        )
    }
}
