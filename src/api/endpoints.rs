use super::{ApiError, ApiResult, LoginRequest, SignupRequest, SubmissionUpdate};
use crate::config::StudioConfig;
use crate::design::SubmissionPayload;
use once_cell::sync::Lazy;
use serde::Serialize;
use url::Url;

static DEFAULT_BASE: Lazy<Url> = Lazy::new(|| {
    Url::parse(crate::config::DEFAULT_API_BASE).expect("default api base should be a valid url")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub bearer: Option<String>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            bearer: None,
            body: None,
        }
    }

    fn authorized(mut self, token: &str) -> Self {
        self.bearer = Some(token.to_string());
        self
    }

    fn json<T: Serialize>(mut self, body: &T) -> ApiResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn authorization_header(&self) -> Option<String> {
        self.bearer.as_ref().map(|token| format!("Bearer {token}"))
    }
}

#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// Any path on `base` is kept as a prefix of every endpoint.
    pub fn new(base: &str) -> ApiResult<Self> {
        let base = Url::parse(base)?;
        if base.cannot_be_a_base() {
            return Err(ApiError::UnusableBase(base.to_string()));
        }
        Ok(Self { base })
    }

    pub fn from_config(config: &StudioConfig) -> ApiResult<Self> {
        Self::new(&config.api_base)
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn url(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|()| ApiError::UnusableBase(self.base.to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    pub fn login(&self, request: &LoginRequest) -> ApiResult<ApiRequest> {
        ApiRequest::new(Method::Post, self.url(&["users", "login"])?).json(request)
    }

    pub fn register(&self, request: &SignupRequest) -> ApiResult<ApiRequest> {
        ApiRequest::new(Method::Post, self.url(&["users", "register"])?).json(request)
    }

    pub fn list_submissions(&self) -> ApiResult<ApiRequest> {
        Ok(ApiRequest::new(Method::Get, self.url(&["submissions"])?))
    }

    pub fn submit_design(&self, token: &str, payload: &SubmissionPayload) -> ApiResult<ApiRequest> {
        ApiRequest::new(Method::Post, self.url(&["submissions"])?)
            .authorized(token)
            .json(payload)
    }

    pub fn vote(&self, token: &str, submission_id: &str) -> ApiResult<ApiRequest> {
        let url = self.url(&["submissions", resource_id(submission_id)?, "vote"])?;
        Ok(ApiRequest::new(Method::Post, url).authorized(token))
    }

    pub fn user_submissions(&self, token: &str, user_id: &str) -> ApiResult<ApiRequest> {
        let url = self.url(&["users", resource_id(user_id)?, "submissions"])?;
        Ok(ApiRequest::new(Method::Get, url).authorized(token))
    }

    pub fn update_submission(
        &self,
        token: &str,
        submission_id: &str,
        update: &SubmissionUpdate,
    ) -> ApiResult<ApiRequest> {
        let url = self.url(&["submissions", resource_id(submission_id)?])?;
        ApiRequest::new(Method::Put, url).authorized(token).json(update)
    }

    pub fn delete_submission(&self, token: &str, submission_id: &str) -> ApiResult<ApiRequest> {
        let url = self.url(&["submissions", resource_id(submission_id)?])?;
        Ok(ApiRequest::new(Method::Delete, url).authorized(token))
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE.clone(),
        }
    }
}

// The url parser drops dot segments instead of escaping them.
fn resource_id(id: &str) -> ApiResult<&str> {
    match id {
        "" | "." | ".." => Err(ApiError::InvalidId(id.to_string())),
        _ => Ok(id),
    }
}
