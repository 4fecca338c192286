pub mod endpoints;
pub mod fixture;
pub mod session;

pub use endpoints::{ApiRequest, Endpoints, Method};
pub use fixture::FixtureBackend;
pub use session::{AuthSession, FileSessionStore, MemorySessionStore, SessionStore, StoredAuth};

use crate::design::{FontStyle, Rgb, SubmissionPayload};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication required")]
    AuthRequired,
    #[error("already voted for submission {submission_id}")]
    Conflict { submission_id: String },
    #[error("{0} not found")]
    NotFound(String),
    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("malformed payload: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
    #[error("base url {0} cannot carry a path")]
    UnusableBase(String),
    #[error("invalid resource id {0:?}")]
    InvalidId(String),
}

impl ApiError {
    /// Maps a non-2xx response onto the typed error. `subject` names the
    /// resource the request targeted.
    pub fn from_status(status: u16, message: impl Into<String>, subject: &str) -> Self {
        match status {
            401 => ApiError::AuthRequired,
            404 => ApiError::NotFound(subject.to_string()),
            409 => ApiError::Conflict {
                submission_id: subject.to_string(),
            },
            _ => ApiError::Rejected {
                status,
                message: message.into(),
            },
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Published,
    Draft,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub owner_id: String,
    pub username: String,
    pub name: String,
    pub flavor_notes: Vec<String>,
    pub bag_color: Rgb,
    pub font_style: FontStyle,
    pub votes: u32,
    pub status: SubmissionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flavor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bag_color: Option<Rgb>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_choice: Option<FontStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_flavors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SubmissionStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub votes: u32,
}

/// Server side of the submission workflow. Calls that need an account take
/// the bearer token explicitly.
#[allow(async_fn_in_trait)]
pub trait SubmissionService {
    async fn login(&mut self, request: &LoginRequest) -> ApiResult<AuthResponse>;

    async fn signup(&mut self, request: &SignupRequest) -> ApiResult<AuthResponse>;

    async fn submit_design(&mut self, token: &str, payload: &SubmissionPayload)
    -> ApiResult<String>;

    async fn list_submissions(&self) -> ApiResult<Vec<Submission>>;

    async fn user_submissions(&self, token: &str, user_id: &str) -> ApiResult<Vec<Submission>>;

    async fn vote(&mut self, token: &str, submission_id: &str) -> ApiResult<VoteReceipt>;

    async fn update_submission(
        &mut self,
        token: &str,
        submission_id: &str,
        update: &SubmissionUpdate,
    ) -> ApiResult<Submission>;

    async fn delete_submission(&mut self, token: &str, submission_id: &str) -> ApiResult<()>;
}
