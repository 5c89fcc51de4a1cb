//! Authentication module
//!
//! OAuth2 client-credentials only: the exporter trades its client id and
//! secret for an app access token and caches it for the rest of the run.
//! Failures are fatal; there is no retry and no mid-run refresh.

mod provider;
mod types;

pub use provider::TokenProvider;
pub use types::AppToken;

#[cfg(test)]
mod tests;
