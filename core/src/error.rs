//! Error types for the users client.
//!
//! # Design
//! `NetworkError` covers everything that can go wrong between building a
//! request and decoding its response. Its `Display` text is what the screen
//! shows to the user, so the messages are phrased for people, not logs.
//! `ValidationError` never leaves the form; it exists so the form can report
//! a missing field without touching the store.

use thiserror::Error;

/// Failures of the HTTP adapter and the transport beneath it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NetworkError {
    /// The transport gave up waiting for a response.
    #[error("timeout of {millis}ms exceeded")]
    Timeout { millis: u128 },

    /// The request never produced a response (connection refused, DNS, TLS).
    #[error("{0}")]
    Transport(String),

    /// The server answered 404.
    #[error("Request failed with status code 404")]
    NotFound,

    /// The server answered with any other non-2xx status.
    #[error("Request failed with status code {status}")]
    Status { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("failed to decode response: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("failed to encode request: {0}")]
    Serialization(String),
}

/// Client-side form validation failures.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Nombre y correo son obligatorios.")]
    MissingRequired,
}

/// Outcome of a failed form submission.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Network(#[from] NetworkError),
}
