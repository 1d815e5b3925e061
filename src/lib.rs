// ERP Dashboard - managed record pages behind a session gate

// Managed record framework - records, schemas, filtering, metrics and export
pub mod framework;

// Infrastructure - sessions, auth middleware, id generation and downloads
pub mod infrastructure;

// Page schemas - one module per dashboard section
pub mod schemas;

// HTTP surface
pub mod api;
pub mod app_state;

// Common utilities
pub mod config;
pub mod error;

// Re-exports for convenience
pub use error::{AppError, AppResult};
