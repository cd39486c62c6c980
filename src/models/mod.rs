//! Wire-format contracts for the endpoints this client talks to.

pub mod envelope;
pub mod login;
pub mod profile;

pub use envelope::ApiEnvelope;
pub use login::{Credentials, LoginResponse, TokenResponse};
pub use profile::AdminProfile;
