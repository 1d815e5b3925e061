// Core infrastructure modules
pub mod id_generator;          // Record ID generation
pub mod session;               // Login sessions and roles
pub mod middleware;            // Authentication gate
pub mod download;              // Export destinations
pub mod workspace;             // Page collections

pub use id_generator::RecordIdGenerator;
pub use session::{Credentials, InMemorySessionStore, Role, Session, SessionProvider};
pub use download::{DirectorySink, DownloadSink, RecordingSink};
pub use workspace::Workspace;
