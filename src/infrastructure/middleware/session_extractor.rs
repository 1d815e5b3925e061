// CurrentSession Extractor - the session injected by the auth gate

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};

use crate::infrastructure::session::{Role, Session};

/// Session of the authenticated caller.
///
/// Only available on routes behind [`auth_gate`](super::auth_gate); cloning
/// is just an `Arc` clone.
#[derive(Debug, Clone)]
pub struct CurrentSession(Arc<Session>);

impl CurrentSession {
    pub fn current_role(&self) -> Role {
        self.0.role
    }
}

impl std::ops::Deref for CurrentSession {
    type Target = Session;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let session = parts
            .extensions
            .get::<Arc<Session>>()
            .map(|session| CurrentSession(session.clone()))
            .ok_or(StatusCode::UNAUTHORIZED);

        async move { session }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use chrono::Utc;

    #[tokio::test]
    async fn test_extracts_injected_session() {
        let session = Arc::new(Session {
            token: "t".to_string(),
            username: "flyweis".to_string(),
            role: Role::Employee,
            authenticated_at: Utc::now(),
        });
        let mut request = Request::new(());
        request.extensions_mut().insert(session);
        let (mut parts, _) = request.into_parts();

        let current = CurrentSession::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(current.username, "flyweis");
        assert_eq!(current.current_role(), Role::Employee);
    }

    #[tokio::test]
    async fn test_missing_session_rejected() {
        let (mut parts, _) = Request::new(()).into_parts();
        let result = CurrentSession::from_request_parts(&mut parts, &()).await;
        assert_eq!(result.unwrap_err(), StatusCode::UNAUTHORIZED);
    }
}
