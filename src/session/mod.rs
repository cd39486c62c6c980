//! Session state and the login/logout actions that drive it.

pub mod state;
pub mod store;

pub use state::{Session, SessionState, SubmitGuard};
pub use store::SessionStore;
