//! Unified error type shared by the ledger service and its client.
//!
//! Business failures (`ProductNotFound`, `InsufficientStock`, ...) are plain
//! variants so both sides of the HTTP boundary can match on them; the API layer
//! maps them to status codes and the client maps them back.

use thiserror::Error;

/// Every failure the crate can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Application configuration could not be loaded or is inconsistent
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Malformed input, rejected before any state change
    #[error("Validation error: {message}")]
    Validation {
        /// Which field was rejected and why
        message: String,
    },

    /// No stock line matches the requested product
    #[error("Product '{name}' not found")]
    ProductNotFound {
        /// Name or id the caller asked for
        name: String,
    },

    /// Several stock lines share the requested name and no line id was given
    #[error("Product '{name}' matches {lines} stock lines, select one by id")]
    AmbiguousProduct {
        /// Shared product name
        name: String,
        /// Number of matching lines
        lines: usize,
    },

    /// The sale asks for more units than the line holds
    #[error("Insufficient stock for '{product}': {available} available, {requested} requested")]
    InsufficientStock {
        /// Product name of the line
        product: String,
        /// Units currently available
        available: i64,
        /// Units the sale asked for
        requested: i64,
    },

    /// The invoice key was already used by a different sale
    #[error("Invoice '{invoice}' is already recorded for a different sale")]
    DuplicateInvoice {
        /// Canonical invoice key
        invoice: String,
    },

    /// Missing or unknown bearer credential
    #[error("Missing or invalid credential")]
    Unauthorized,

    /// The identity lacks the role required for the action
    #[error("Only administrators may {action}")]
    Forbidden {
        /// Action that was refused
        action: String,
    },

    /// Network failure or a non-success response without a structured body
    #[error("Transport failure: {message}")]
    Transport {
        /// HTTP status, when a response was received at all
        status: Option<u16>,
        /// Human-readable cause
        message: String,
    },

    /// Database layer failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O failure (config files, sockets)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport {
            status: value.status().map(|s| s.as_u16()),
            message: value.to_string(),
        }
    }
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
