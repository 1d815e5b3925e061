// Session middleware - authentication gate and request-scoped session access
// Handlers behind the gate only ever see an authenticated CurrentSession

pub mod auth_gate;
pub mod session_extractor;

pub use auth_gate::*;
pub use session_extractor::CurrentSession;
