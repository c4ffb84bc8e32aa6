//! Shared domain types for the Herald notification hub.
//!
//! Kept free of runtime dependencies so that every other crate in the
//! workspace can depend on it.

pub mod error;
pub mod policy;
pub mod types;
