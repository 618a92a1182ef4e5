//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: hosted chat models served by the provider
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod model;
pub mod string;
