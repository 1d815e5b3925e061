use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Placeholder credentials checked literally at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
    pub session_cookie: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            auth: AuthConfig {
                username: "flyweis".to_string(),
                password: "1234".to_string(),
                session_cookie: "erp_session".to_string(),
            },
            export: ExportConfig {
                dir: PathBuf::from("exports"),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();

        let session_cookie = env::var("SESSION_COOKIE").unwrap_or(defaults.auth.session_cookie);
        if session_cookie.is_empty() || session_cookie.contains(['=', ';', ' ']) {
            return Err(AppError::ConfigurationError(format!(
                "SESSION_COOKIE is not a usable cookie name: {:?}",
                session_cookie
            )));
        }

        Ok(Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
            },
            auth: AuthConfig {
                username: env::var("AUTH_USERNAME").unwrap_or(defaults.auth.username),
                password: env::var("AUTH_PASSWORD").unwrap_or(defaults.auth.password),
                session_cookie,
            },
            export: ExportConfig {
                dir: env::var("EXPORT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.export.dir),
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server_address(), "0.0.0.0:3000");
        assert_eq!(config.auth.username, "flyweis");
        assert_eq!(config.auth.session_cookie, "erp_session");
    }
}
