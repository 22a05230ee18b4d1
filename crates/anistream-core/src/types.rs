//! Data types for anistream
//!
//! This module contains the core data structures handed to callers.
//! All types implement Serialize and Deserialize for JSON compatibility with Tauri.

use serde::{Deserialize, Serialize};

use crate::slug::Slug;

/// One listed anime in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// MyAnimeList identifier
    pub id: u32,
    /// Display title
    pub title: String,
    /// Poster image URL
    pub image_url: Option<String>,
    /// Slug derived from the title, `None` when the title has no Latin letters
    pub slug: Option<Slug>,
}

/// Genre available for filtering the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    /// MyAnimeList genre identifier
    pub id: u32,
    /// Display name
    pub name: String,
    /// Number of anime tagged with this genre
    pub count: u32,
}

/// Episode information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    /// Episode ordinal (1-based)
    pub number: u32,
    /// Episode title, if known
    pub title: Option<String>,
    /// Air date as reported by the API (ISO 8601)
    pub aired: Option<String>,
    /// Filler episode
    pub filler: bool,
    /// Recap episode
    pub recap: bool,
}

/// Paginated result wrapper for catalog pages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    /// Items on the current page
    pub items: Vec<T>,
    /// Current page number (1-based)
    pub current_page: u32,
    /// Whether there are more pages available
    pub has_next_page: bool,
}

impl<T> PaginatedResult<T> {
    /// Create a new paginated result
    pub fn new(items: Vec<T>, current_page: u32, has_next_page: bool) -> Self {
        Self {
            items,
            current_page,
            has_next_page,
        }
    }
}

/// Where a resolved stream URL came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StreamSource {
    /// Scraped from an episode page
    Scraped {
        /// Episode page the player frame was found on
        page_url: String,
    },
    /// Taken from the override table
    Override,
}

/// Embeddable player URL for one episode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedStream {
    /// Player URL
    pub url: String,
    pub source: StreamSource,
}

/// Snapshot of the catalog handed to the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogView {
    /// Entries currently displayed
    pub entries: Vec<CatalogEntry>,
    /// Requested page (1-based)
    pub page: u32,
    /// Active genre filter
    pub genre_id: Option<u32>,
    /// Active text filter
    pub search_query: Option<String>,
    /// Forward navigation enabled
    pub has_next_page: bool,
    /// Backward navigation enabled
    pub has_previous_page: bool,
    /// A fetch is in flight
    pub loading: bool,
    /// Last fetch failed; calling reload retries it
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_entry_serialization() {
        let entry = CatalogEntry {
            id: 21,
            title: "One Piece".to_string(),
            image_url: Some("https://cdn.myanimelist.net/images/anime/6/73245.jpg".to_string()),
            slug: Slug::from_title("One Piece"),
        };

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"slug\":\"one-piece\""));

        let deserialized: CatalogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, entry);
    }

    #[test]
    fn test_stream_source_tagging() {
        let stream = ResolvedStream {
            url: "https://streamtape.com/e/abc".to_string(),
            source: StreamSource::Override,
        };
        let json = serde_json::to_string(&stream).unwrap();
        assert_eq!(
            json,
            "{\"url\":\"https://streamtape.com/e/abc\",\"source\":{\"kind\":\"override\"}}"
        );
    }
}
