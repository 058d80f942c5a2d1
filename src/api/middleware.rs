//! API middleware
//!
//! Application state, the error envelope, and session-token
//! authentication for admin routes.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::User;
use crate::services::error::ServiceError;
use crate::services::{LinkService, MemoService, PostService, SiteService, TagService, UserService};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub post_service: Arc<PostService>,
    pub tag_service: Arc<TagService>,
    pub memo_service: Arc<MemoService>,
    pub link_service: Arc<LinkService>,
    pub site_service: Arc<SiteService>,
    pub user_service: Arc<UserService>,
}

/// Authenticated user extracted from the request
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// Error response envelope for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(message) => ApiError::not_found(message),
            ServiceError::Conflict(message) => ApiError::new("CONFLICT", message),
            ServiceError::BadRequest(message) => ApiError::bad_request(message),
            ServiceError::Forbidden(message) => ApiError::forbidden(message),
            ServiceError::Unauthorized(message) => ApiError::unauthorized(message),
            ServiceError::Internal(source) => {
                // Full detail stays server-side; the caller gets a generic message
                tracing::error!(error = ?source, "Internal error");
                ApiError::internal_error("internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            // Conflicts surface as 400, matching the established API contract
            "CONFLICT" | "BAD_REQUEST" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

/// Extract the session token from a Bearer header or session cookie
fn extract_session_token(request: &Request) -> Option<String> {
    if let Some(auth_header) = request.headers().get(header::AUTHORIZATION) {
        if let Ok(auth_str) = auth_header.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    if let Some(cookie_header) = request.headers().get(header::COOKIE) {
        if let Ok(cookie_str) = cookie_header.to_str() {
            for cookie in cookie_str.split(';') {
                let cookie = cookie.trim();
                if let Some(token) = cookie.strip_prefix("session=") {
                    return Some(token.to_string());
                }
            }
        }
    }

    None
}

/// Authentication middleware for admin routes
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_session_token(&request)
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let user = state
        .user_service
        .validate_session(&token)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired session"))?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_header(name: header::HeaderName, value: &str) -> Request<Body> {
        Request::builder()
            .uri("/test")
            .header(name, value)
            .body(Body::empty())
            .expect("valid request")
    }

    #[test]
    fn test_extract_token_from_bearer() {
        let request = request_with_header(header::AUTHORIZATION, "Bearer token-123");
        assert_eq!(extract_session_token(&request), Some("token-123".to_string()));
    }

    #[test]
    fn test_extract_token_from_cookie() {
        let request = request_with_header(header::COOKIE, "theme=dark; session=token-456");
        assert_eq!(extract_session_token(&request), Some("token-456".to_string()));
    }

    #[test]
    fn test_extract_token_bearer_wins_over_cookie() {
        let request = Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, "Bearer from-header")
            .header(header::COOKIE, "session=from-cookie")
            .body(Body::empty())
            .expect("valid request");
        assert_eq!(extract_session_token(&request), Some("from-header".to_string()));
    }

    #[test]
    fn test_extract_token_missing() {
        let request = Request::builder().uri("/test").body(Body::empty()).expect("valid request");
        assert!(extract_session_token(&request).is_none());
    }

    #[test]
    fn test_service_error_mapping() {
        let err: ApiError = ServiceError::NotFound("missing".to_string()).into();
        assert_eq!(err.error.code, "NOT_FOUND");

        let err: ApiError = ServiceError::Conflict("taken".to_string()).into();
        assert_eq!(err.error.code, "CONFLICT");

        let err: ApiError = ServiceError::Forbidden("in use".to_string()).into();
        assert_eq!(err.error.code, "FORBIDDEN");

        let err: ApiError = ServiceError::Internal(anyhow::anyhow!("disk error")).into();
        assert_eq!(err.error.code, "INTERNAL_ERROR");
        assert_eq!(err.error.message, "internal server error");
    }
}
