// Authentication gate - every protected route redirects to /login without a session

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::debug;

use crate::infrastructure::session::SessionProvider;

pub const LOGIN_ROUTE: &str = "/login";
pub const LANDING_ROUTE: &str = "/dashboard";

/// Routes reachable without a session.
pub const PUBLIC_ROUTES: &[&str] = &[LOGIN_ROUTE];

/// Trait for application state that can resolve sessions
pub trait HasSessions {
    fn sessions(&self) -> &Arc<dyn SessionProvider>;

    /// Name of the cookie carrying the session token.
    fn session_cookie(&self) -> &str;
}

/// Resolve the caller's session and inject it into request extensions,
/// or redirect to the login route. Public routes pass through untouched.
pub async fn auth_gate<T>(State(app_state): State<T>, mut request: Request, next: Next) -> Response
where
    T: HasSessions + Clone + Send + Sync + 'static,
{
    if PUBLIC_ROUTES.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let session = match session_token(request.headers(), app_state.session_cookie()) {
        Some(token) => app_state.sessions().current_session(&token).await,
        None => None,
    };

    match session {
        Some(session) => {
            request.extensions_mut().insert(Arc::new(session));
            next.run(request).await
        }
        None => {
            debug!("No session for {}, redirecting to {}", request.uri().path(), LOGIN_ROUTE);
            Redirect::to(LOGIN_ROUTE).into_response()
        }
    }
}

/// Session token from `Authorization: Bearer <token>` or the session cookie.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Some(token) = auth_header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
        {
            return Some(token.to_string());
        }
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value that stores the session token in the browser.
pub fn session_cookie_header(cookie_name: &str, token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", cookie_name, token)
}

/// `Set-Cookie` value that clears the session cookie.
pub fn clear_session_cookie_header(cookie_name: &str) -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", cookie_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer token123"));

        assert_eq!(session_token(&headers, "erp_session"), Some("token123".to_string()));
    }

    #[test]
    fn test_cookie_token() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_static("theme=dark; erp_session=abc; x=1"));

        assert_eq!(session_token(&headers, "erp_session"), Some("abc".to_string()));
    }

    #[test]
    fn test_no_token() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_static("erp_session="));
        headers.insert("authorization", HeaderValue::from_static("Basic Zm9v"));

        assert_eq!(session_token(&headers, "erp_session"), None);
        assert_eq!(session_token(&HeaderMap::new(), "erp_session"), None);
    }
}
