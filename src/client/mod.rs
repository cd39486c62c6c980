//! The authenticated fetch helper.

pub mod fetch;
pub mod request;

pub use fetch::{ApiClient, AuthErrorPolicy};
pub use request::{FormPart, FormValue, RequestBody, RequestOptions};
