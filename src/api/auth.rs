use axum::{
    Json,
    extract::{Request, State, rejection::JsonRejection},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{AUTHORIZATION, COOKIE, SET_COOKIE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{ApiError, AppState};

pub const SESSION_COOKIE_NAME: &str = "x-session-id";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginResponse {
    pub name: String,
    pub email: String,
}

// ============================================================================
// Middleware
// ============================================================================

/// Admits requests carrying a valid admin session, from either the
/// `x-session-id` cookie or an `Authorization: Bearer` header.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_session_token(&headers).ok_or_else(ApiError::unauthorized)?;
    let claims = state.sessions().validate(&token)?;

    tracing::Span::current().record("user_id", claims.sub.as_str());
    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /admin/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(payload) = payload?;

    if payload.email.is_empty() {
        return Err(ApiError::validation("email is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("password is required"));
    }

    let session = state
        .sessions()
        .login(&payload.email, &payload.password)
        .await?;

    let cookie = session_cookie(
        &session.token,
        state.sessions().ttl().as_secs(),
        state.config().server.secure_cookies,
    )
    .map_err(|e| ApiError::internal(format!("Invalid session cookie: {e}")))?;

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);

    Ok((
        headers,
        Json(LoginResponse {
            name: session.name,
            email: session.email,
        }),
    )
        .into_response())
}

/// POST /admin/logout
///
/// Tokens are stateless, so this only tells the browser to drop the cookie.
pub async fn logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie(state.config().server.secure_cookies) {
        headers.insert(SET_COOKIE, cookie);
    }
    (StatusCode::NO_CONTENT, headers)
}

// ============================================================================
// Helpers
// ============================================================================

fn session_cookie(
    token: &str,
    ttl_seconds: u64,
    secure: bool,
) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_session_cookie(secure: bool) -> Result<HeaderValue, axum::http::header::InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }

    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            if let Some((key, val)) = pair.trim().split_once('=')
                && key.trim() == SESSION_COOKIE_NAME
                && !val.trim().is_empty()
            {
                return Some(val.trim().to_string());
            }
        }
    }

    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie("abc", 86400, true).unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("x-session-id=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=86400"));
        assert!(cookie.ends_with("; Secure"));

        let plain = session_cookie("abc", 60, false).unwrap();
        assert!(!plain.to_str().unwrap().contains("Secure"));
    }

    #[test]
    fn test_token_from_cookie_or_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; x-session-id=tok123"));
        assert_eq!(extract_session_token(&headers).as_deref(), Some("tok123"));

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer tok456"));
        assert_eq!(extract_session_token(&headers).as_deref(), Some("tok456"));

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("x-session-id="));
        assert_eq!(extract_session_token(&headers), None);
    }
}
