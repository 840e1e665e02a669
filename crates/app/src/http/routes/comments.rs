use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http::ServeState;
use marginalia_core::domain::authz::{self, Actor, CommentVoter, Subject};
use marginalia_core::domain::comment::{Author, Comment, CommentPage};
use marginalia_core::domain::form::{CONTENT_FIELD, FieldErrors, validate_content};
use marginalia_core::types::post_id::PostId;
use marginalia_infra::api::VIEWER_HEADER;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub post: Option<i64>,
    pub page: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
    pub content: String,
    pub post: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
    pub content: String,
}

#[derive(Debug, Error)]
pub enum CommentsApiError {
    #[error("authentication required")]
    MissingUser,
    #[error("post is required")]
    MissingPost,
    #[error("post is invalid")]
    InvalidPost,
    #[error("page is invalid")]
    InvalidPage,
    #[error("comment not found")]
    UnknownComment,
    #[error("not allowed to modify this comment")]
    Forbidden,
    #[error("validation failed")]
    Validation(FieldErrors),
}

pub async fn list(
    State(state): State<ServeState>,
    Query(params): Query<ListParams>,
) -> Result<Json<CommentPage>, CommentsApiError> {
    let post = params.post.ok_or(CommentsApiError::MissingPost)?;
    let post = PostId::try_from(post).map_err(|_| CommentsApiError::InvalidPost)?;
    let page = params.page.unwrap_or(1);
    if page == 0 {
        return Err(CommentsApiError::InvalidPage);
    }
    let store = state.store.read().await;
    Ok(Json(store.page(post, page, state.page_size)))
}

pub async fn create(
    State(state): State<ServeState>,
    headers: HeaderMap,
    Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, CommentsApiError> {
    let viewer = viewer_from_headers(&headers)?;
    let post = post_from_iri(&body.post).ok_or(CommentsApiError::InvalidPost)?;
    check_content(&body.content)?;
    let author = Author {
        id: viewer,
        username: format!("user-{viewer}"),
    };
    let mut store = state.store.write().await;
    let comment = store.create(post, author, &body.content, Utc::now());
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn update(
    State(state): State<ServeState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<UpdateBody>,
) -> Result<Json<Comment>, CommentsApiError> {
    let viewer = viewer_from_headers(&headers)?;
    let mut store = state.store.write().await;
    let current = store.get(id).ok_or(CommentsApiError::UnknownComment)?;
    check_edit_grant(viewer, current)?;
    check_content(&body.content)?;
    let updated = store
        .update(id, &body.content)
        .ok_or(CommentsApiError::UnknownComment)?;
    Ok(Json(updated))
}

pub async fn remove(
    State(state): State<ServeState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<StatusCode, CommentsApiError> {
    let viewer = viewer_from_headers(&headers)?;
    let mut store = state.store.write().await;
    let current = store.get(id).ok_or(CommentsApiError::UnknownComment)?;
    check_edit_grant(viewer, current)?;
    store.delete(id);
    Ok(StatusCode::NO_CONTENT)
}

/// The voter chain the real deployment would run inside its security
/// framework; all-abstain falls through to deny.
fn check_edit_grant(viewer: i64, comment: &Comment) -> Result<(), CommentsApiError> {
    let voter = CommentVoter;
    let granted = authz::is_granted(
        &[&voter],
        &Actor::user(viewer),
        authz::EDIT_COMMENT,
        &Subject::Comment(comment),
    );
    if granted {
        Ok(())
    } else {
        Err(CommentsApiError::Forbidden)
    }
}

fn check_content(content: &str) -> Result<(), CommentsApiError> {
    match validate_content(content) {
        Some(message) => {
            let mut errors = FieldErrors::new();
            errors.insert(CONTENT_FIELD, message);
            Err(CommentsApiError::Validation(errors))
        }
        None => Ok(()),
    }
}

fn viewer_from_headers(headers: &HeaderMap) -> Result<i64, CommentsApiError> {
    headers
        .get(VIEWER_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .ok_or(CommentsApiError::MissingUser)
}

fn post_from_iri(value: &str) -> Option<PostId> {
    let raw = value.strip_prefix("/api/posts/").unwrap_or(value);
    let raw = raw.trim_end_matches('/');
    let id: i64 = raw.parse().ok()?;
    PostId::try_from(id).ok()
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct ViolationBody {
    violations: Vec<ViolationEntry>,
}

#[derive(Debug, Serialize)]
struct ViolationEntry {
    #[serde(rename = "propertyPath")]
    property_path: String,
    message: String,
}

impl IntoResponse for CommentsApiError {
    fn into_response(self) -> axum::response::Response {
        if let CommentsApiError::Validation(errors) = self {
            let violations = errors
                .iter()
                .map(|(field, message)| ViolationEntry {
                    property_path: field.to_string(),
                    message: message.to_string(),
                })
                .collect();
            let body = Json(ViolationBody { violations });
            return (StatusCode::UNPROCESSABLE_ENTITY, body).into_response();
        }
        let status = match self {
            CommentsApiError::MissingUser => StatusCode::UNAUTHORIZED,
            CommentsApiError::Forbidden => StatusCode::FORBIDDEN,
            CommentsApiError::UnknownComment => StatusCode::NOT_FOUND,
            CommentsApiError::MissingPost
            | CommentsApiError::InvalidPost
            | CommentsApiError::InvalidPage => StatusCode::BAD_REQUEST,
            CommentsApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::{ViolationBody, ViolationEntry, post_from_iri};

    #[test]
    fn post_from_iri_accepts_api_platform_shape() {
        assert_eq!(post_from_iri("/api/posts/42").unwrap().as_i64(), 42);
        assert_eq!(post_from_iri("/api/posts/42/").unwrap().as_i64(), 42);
    }

    #[test]
    fn post_from_iri_accepts_bare_integer() {
        assert_eq!(post_from_iri("42").unwrap().as_i64(), 42);
    }

    #[test]
    fn post_from_iri_rejects_garbage() {
        assert!(post_from_iri("/api/posts/abc").is_none());
        assert!(post_from_iri("").is_none());
        assert!(post_from_iri("/api/posts/-3").is_none());
    }

    #[test]
    fn violation_wire_shape_uses_property_path() {
        let body = ViolationBody {
            violations: vec![ViolationEntry {
                property_path: "content".to_string(),
                message: "too short".to_string(),
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["violations"][0]["propertyPath"], "content");
        assert_eq!(json["violations"][0]["message"], "too short");
    }
}
