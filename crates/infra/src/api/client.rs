use reqwest::{Method, Request};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use marginalia_core::domain::comment::{Comment, CommentPage};
use marginalia_core::domain::form::FieldErrors;
use marginalia_core::types::post_id::PostId;

const COLLECTION_PATH: &str = "/api/comments";

/// Header carrying the authenticated viewer id on mutating requests. The
/// fixture server reads it as the security principal; a real deployment
/// derives the principal from its session instead.
pub const VIEWER_HEADER: &str = "x-user";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server error: status {status}, body {body}")]
    Status { status: u16, body: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Outcome of a create or update: the API either returns the saved comment
/// or a field-keyed validation payload. Anything else is an `ApiError`.
#[derive(Debug)]
pub enum SaveResult {
    Saved(Comment),
    Invalid(FieldErrors),
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    viewer: Option<i64>,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            viewer: None,
        }
    }

    pub fn with_viewer(mut self, viewer: Option<i64>) -> Self {
        self.viewer = viewer;
        self
    }

    pub fn collection_url(&self) -> String {
        format!("{}{}", self.base_url, COLLECTION_PATH)
    }

    /// Expands a resource identifier (`@id`) into an absolute URL.
    pub fn resolve(&self, iri: &str) -> String {
        if iri.starts_with("http://") || iri.starts_with("https://") {
            iri.to_string()
        } else {
            format!("{}{}", self.base_url, iri)
        }
    }

    pub async fn list_comments(&self, post: PostId, page: u32) -> Result<CommentPage, ApiError> {
        let request = self.list_request(post, page)?;
        let response = self.http.execute(request).await?.error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn create_comment(&self, post: PostId, content: &str) -> Result<SaveResult, ApiError> {
        let request = self.create_request(post, content)?;
        let response = self.http.execute(request).await?;
        self.read_save_result(response).await
    }

    pub async fn update_comment(&self, url: &str, content: &str) -> Result<SaveResult, ApiError> {
        let request = self.update_request(url, content)?;
        let response = self.http.execute(request).await?;
        self.read_save_result(response).await
    }

    pub async fn delete_comment(&self, url: &str) -> Result<(), ApiError> {
        let request = self.delete_request(url)?;
        let response = self.http.execute(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await?;
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }

    fn list_request(&self, post: PostId, page: u32) -> Result<Request, ApiError> {
        let url = format!("{}?post={}&page={}", self.collection_url(), post, page);
        Ok(self.http.get(&url).build()?)
    }

    fn create_request(&self, post: PostId, content: &str) -> Result<Request, ApiError> {
        let payload = NewComment {
            content,
            post: post_iri(post),
        };
        Ok(self
            .mutate(Method::POST, self.collection_url())
            .json(&payload)
            .build()?)
    }

    fn update_request(&self, url: &str, content: &str) -> Result<Request, ApiError> {
        let payload = CommentUpdate { content };
        Ok(self
            .mutate(Method::PUT, self.resolve(url))
            .json(&payload)
            .build()?)
    }

    fn delete_request(&self, url: &str) -> Result<Request, ApiError> {
        Ok(self.mutate(Method::DELETE, self.resolve(url)).build()?)
    }

    fn mutate(&self, method: Method, url: String) -> reqwest::RequestBuilder {
        let mut request = self.http.request(method, &url);
        if let Some(viewer) = self.viewer {
            request = request.header(VIEWER_HEADER, viewer);
        }
        request
    }

    async fn read_save_result(&self, response: reqwest::Response) -> Result<SaveResult, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(SaveResult::Saved(response.json().await?));
        }
        let body = response.text().await?;
        if status.is_client_error() {
            if let Some(errors) = parse_violations(&body) {
                return Ok(SaveResult::Invalid(errors));
            }
        }
        Err(ApiError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

pub fn post_iri(post: PostId) -> String {
    format!("/api/posts/{post}")
}

fn parse_violations(body: &str) -> Option<FieldErrors> {
    let list: ViolationList = serde_json::from_str(body).ok()?;
    if list.violations.is_empty() {
        return None;
    }
    let mut errors = FieldErrors::new();
    for violation in list.violations {
        errors.insert(&violation.property_path, &violation.message);
    }
    Some(errors)
}

#[derive(Debug, Serialize)]
struct NewComment<'a> {
    content: &'a str,
    post: String,
}

#[derive(Debug, Serialize)]
struct CommentUpdate<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ViolationList {
    violations: Vec<Violation>,
}

#[derive(Debug, Deserialize)]
struct Violation {
    #[serde(rename = "propertyPath")]
    property_path: String,
    message: String,
}
