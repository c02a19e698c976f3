//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: domain-level parse errors

pub mod error;
