// Session handling - placeholder login gate for the dashboard
// Credentials are compared literally; sessions live in memory only

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::{AppError, AppResult};

pub const INVALID_CREDENTIALS: &str = "Invalid credentials. Try again!";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Admin,
    Manager,
    Employee,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::Employee];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::Employee => "Employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::Validation(format!("Unknown role: {}", s)))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub role: Role,
    pub authenticated_at: DateTime<Utc>,
}

/// Identity collaborator the routing layer depends on.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn login(&self, credentials: &Credentials, role: Role) -> AppResult<Session>;

    /// End a session; `false` when the token was unknown.
    async fn logout(&self, token: &str) -> bool;

    async fn current_session(&self, token: &str) -> Option<Session>;

    async fn is_authenticated(&self, token: &str) -> bool {
        self.current_session(token).await.is_some()
    }

    async fn current_role(&self, token: &str) -> Option<Role> {
        self.current_session(token).await.map(|s| s.role)
    }
}

/// Single hard-coded account, sessions kept until logout.
pub struct InMemorySessionStore {
    username: String,
    password: String,
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStore {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_config(auth: &AuthConfig) -> Self {
        Self::new(&auth.username, &auth.password)
    }
}

#[async_trait]
impl SessionProvider for InMemorySessionStore {
    async fn login(&self, credentials: &Credentials, role: Role) -> AppResult<Session> {
        if credentials.username != self.username || credentials.password != self.password {
            warn!("Rejected login for '{}'", credentials.username);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        let session = Session {
            token: Uuid::new_v4().to_string(),
            username: credentials.username.clone(),
            role,
            authenticated_at: Utc::now(),
        };
        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session.clone());

        info!("User '{}' logged in as {}", session.username, role);
        Ok(session)
    }

    async fn logout(&self, token: &str) -> bool {
        let removed = self.sessions.write().await.remove(token);
        if let Some(session) = &removed {
            info!("User '{}' logged out", session.username);
        }
        removed.is_some()
    }

    async fn current_session(&self, token: &str) -> Option<Session> {
        self.sessions.read().await.get(token).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_logout_cycle() {
        let store = InMemorySessionStore::new("flyweis", "1234");
        let session = store.login(&creds("flyweis", "1234"), Role::Manager).await.unwrap();

        assert!(store.is_authenticated(&session.token).await);
        assert_eq!(store.current_role(&session.token).await, Some(Role::Manager));

        assert!(store.logout(&session.token).await);
        assert!(!store.logout(&session.token).await);
        assert!(!store.is_authenticated(&session.token).await);
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let store = InMemorySessionStore::new("flyweis", "1234");
        let err = store.login(&creds("flyweis", "12345"), Role::Admin).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(msg) if msg == INVALID_CREDENTIALS));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("employee".parse::<Role>().unwrap(), Role::Employee);
        assert_eq!(" Admin ".parse::<Role>().unwrap(), Role::Admin);
        assert!("Owner".parse::<Role>().is_err());
    }
}
