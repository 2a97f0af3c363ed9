//! Errors raised by index profile operations.
//!
//! These are user-input or state-precondition failures. They travel inside
//! `anyhow::Error` so callers can `downcast_ref::<IndexError>()` when they
//! need to tell them apart from I/O or parse faults.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// The registry has no profiles to switch to
    #[error("There is no available index to change. Please use `chpip set` to set one.")]
    NoAvailableIndex,

    /// An explicit name was given that the registry does not know
    #[error("There is no index with name {name}. Please use `chpip set` to set one.")]
    IndexNameNotFound { name: String },

    /// The name is reserved (or blank)
    #[error("Invalid index name `{name}`. Cannot use reserved name.")]
    InvalidIndexName { name: String },

    /// The URL has no http:// or https:// scheme
    #[error("Invalid base URL `{url}` for Python package index.")]
    InvalidIndexURL { url: String },
}
