use std::sync::Arc;

use crate::{
    config::Config,
    error::AppResult,
    infrastructure::{
        id_generator::RecordIdGenerator,
        middleware::HasSessions,
        session::{InMemorySessionStore, SessionProvider},
        workspace::Workspace,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub workspace: Arc<Workspace>,
    pub sessions: Arc<dyn SessionProvider>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> AppResult<Self> {
        let sessions: Arc<dyn SessionProvider> = Arc::new(InMemorySessionStore::from_config(&config.auth));
        Self::with_sessions(config, sessions)
    }

    /// Build state around an external identity collaborator.
    pub fn with_sessions(config: Config, sessions: Arc<dyn SessionProvider>) -> AppResult<Self> {
        let ids = Arc::new(RecordIdGenerator::new());
        let workspace = Arc::new(Workspace::with_default_pages(ids)?);

        Ok(Self {
            workspace,
            sessions,
            config,
        })
    }
}

impl HasSessions for AppState {
    fn sessions(&self) -> &Arc<dyn SessionProvider> {
        &self.sessions
    }

    fn session_cookie(&self) -> &str {
        &self.config.auth.session_cookie
    }
}
