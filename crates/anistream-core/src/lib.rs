//! anistream Core Library
//!
//! Catalog browsing over the Jikan API (MyAnimeList metadata) and episode
//! stream resolution against a streaming site.
//!
//! # Features
//! - Top-list, genre and title browsing with paging
//! - Catalog state machine with incremental-search debounce and cancellation
//!   of superseded fetches
//! - Episode lists
//! - Stream resolution by probing episode-page naming conventions in order
//! - Configurable override table of known-good embeds
//! - Rate-limited HTTP client

pub mod api;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod parser;
pub mod resolver;
pub mod slug;
pub mod types;

// Re-export main types for convenience
pub use api::JikanClient;
pub use catalog::{CatalogBrowser, CatalogEngine, CatalogFilterState, CatalogRequest, CatalogSource};
pub use client::{ClientConfig, HttpClient, PageFetcher, RateLimiter};
pub use config::{ApiConfig, AppConfig, StreamingConfig};
pub use error::{AnistreamError, Result};
pub use logging::init_logging;
pub use resolver::{NamingVariant, StreamOverrides, StreamResolver};
pub use slug::{slugify, Slug};
pub use types::{
    CatalogEntry, CatalogView, Episode, Genre, PaginatedResult, ResolvedStream, StreamSource,
};
