//! Core domain concepts shared across all subdomains.
//!
//! - [`stage::Stage`]: the ordered pipeline stages plus custom ones
//! - [`error::DomainError`]: configuration and invariant errors
//! - [`string`]: display helpers

pub mod error;
pub mod stage;
pub mod string;
