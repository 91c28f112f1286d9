use serde::{Deserialize, Serialize};

/// A status check submitted against a pull request.
/// Serialized to the host's camelCase wire format.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestStatus {
    pub state: StatusState,
    pub description: String,
    pub context: StatusContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
}

/// Outcome reported by a status check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusState {
    #[serde(rename = "notSet")]
    NotSet,
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "succeeded")]
    Succeeded,
    #[serde(rename = "failed")]
    Failed,
    #[serde(rename = "error")]
    Error,
}

/// Namespaced identity of a status check (e.g. genre "code-analysis",
/// name "quality-gate"). The host groups statuses by genre/name.
#[derive(Debug, Clone, Serialize)]
pub struct StatusContext {
    pub name: String,
    pub genre: String,
}

/// A conversation container attached to a pull request, holding one or
/// more comments and a resolution status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentThread {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CommentThreadStatus>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_deleted: Option<bool>,
}

impl CommentThread {
    /// Build a new active thread carrying a single text comment, ready to
    /// be posted.
    pub fn with_comment(content: impl Into<String>) -> Self {
        CommentThread {
            id: None,
            status: Some(CommentThreadStatus::Active),
            comments: vec![Comment::text(content)],
            is_deleted: None,
        }
    }
}

/// Resolution state of a comment thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentThreadStatus {
    #[serde(rename = "unknown")]
    Unknown,
    #[serde(rename = "active")]
    Active,
    #[serde(rename = "fixed")]
    Fixed,
    #[serde(rename = "wontFix")]
    WontFix,
    #[serde(rename = "closed")]
    Closed,
    #[serde(rename = "byDesign")]
    ByDesign,
    #[serde(rename = "pending")]
    Pending,
}

/// A single comment within a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<i32>,
    pub content: String,
    pub comment_type: CommentType,
}

impl Comment {
    pub fn text(content: impl Into<String>) -> Self {
        Comment {
            id: None,
            parent_comment_id: None,
            content: content.into(),
            comment_type: CommentType::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentType {
    #[serde(rename = "unknown")]
    Unknown,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "codeChange")]
    CodeChange,
    #[serde(rename = "system")]
    System,
}

/// Envelope the host wraps around thread listings.
#[derive(Debug, Deserialize)]
pub struct CommentThreadResponse {
    pub value: Vec<CommentThread>,
}

/// Minimal patch payload for updating a thread's status. Kept separate
/// from CommentThread so the PATCH body carries nothing but the status.
#[derive(Debug, Serialize)]
pub struct ThreadUpdate {
    pub status: CommentThreadStatus,
}

/// Pull-request metadata as returned by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    pub pull_request_id: u32,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub source_ref_name: String,
    pub target_ref_name: String,
    pub status: String,
}
