//! Error types for anistream
//!
//! This module defines all error types used throughout the library.
//! AnistreamError implements Serialize for Tauri compatibility.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for anistream operations
#[derive(Error, Debug)]
pub enum AnistreamError {
    /// HTTP request failed (connection error, timeout, body read)
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    /// Response body could not be decoded
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Rate limited by the server (HTTP 429)
    #[error("Rate limited - too many requests")]
    RateLimited,

    /// Requested resource was not found (HTTP 404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid MyAnimeList ID provided
    #[error("Invalid anime ID: {0}")]
    InvalidId(u32),

    /// Episode ordinals start at 1
    #[error("Invalid episode number: {0}")]
    InvalidEpisode(u32),

    /// Slug is empty or not in canonical form
    #[error("Invalid slug: {0:?}")]
    InvalidSlug(String),

    /// Search text was blank after trimming
    #[error("Search query cannot be empty")]
    EmptyQuery,

    /// Every candidate page was tried without finding a player frame
    #[error("No stream available for {slug} episode {episode}")]
    NoStreamFound { slug: String, episode: u32 },

    /// Configuration could not be loaded or is invalid
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Serialize AnistreamError as a string for Tauri compatibility
impl Serialize for AnistreamError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias for anistream operations
pub type Result<T> = std::result::Result<T, AnistreamError>;
