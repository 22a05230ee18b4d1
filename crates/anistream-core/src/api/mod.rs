//! Jikan API v4 (MyAnimeList metadata) integration
//!
//! - `client`: catalog, genre and episode endpoints
//! - `types`: response payloads and their conversion into crate types

pub mod client;
pub mod types;

pub use client::JikanClient;
