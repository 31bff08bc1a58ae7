//! # clubledger_core
//!
//! Core session and access-control logic for Clubledger.

pub mod access;
pub mod auth;
pub mod config;
pub mod members;
pub mod models;
pub mod navigation;
pub mod session;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
