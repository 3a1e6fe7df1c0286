mod progress;
mod service;

// Public API of the test-session subsystem.
pub use progress::{SessionProgress, SessionState};
pub use service::TestSession;
