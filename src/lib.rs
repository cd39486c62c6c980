//! Library exports for adminauth, shared between the binary and tests.

pub mod client;
pub mod config;
pub mod error;
pub mod guard;
pub mod models;
pub mod navigation;
pub mod profile;
pub mod session;
pub mod startup;
pub mod state;
pub mod store;
pub mod utils;
