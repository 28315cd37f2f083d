//! Bearer-token acquisition for the Google REST APIs.
//!
//! Layout:
//! - `endpoints.rs`: stateless calls against the token endpoints
//! - `token.rs`: the caching provider shared by all API callers

pub mod endpoints;
pub mod token;

pub use token::{AccessTokenProvider, RefreshCredentials};
