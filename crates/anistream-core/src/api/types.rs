//! Jikan API v4 response types.
//!
//! Only the fields this crate reads are modelled; everything else in the
//! payload is ignored.

use serde::Deserialize;

use crate::slug::Slug;
use crate::types::{CatalogEntry, Episode, Genre};

/// List endpoint wrapper, pagination is absent on some endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl<T> ListResponse<T> {
    pub fn has_next_page(&self) -> bool {
        self.pagination.as_ref().is_some_and(|p| p.has_next_page)
    }
}

/// Pagination metadata
#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub last_visible_page: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnimeData {
    pub mal_id: u32,
    pub title: String,
    #[serde(default)]
    pub images: Option<AnimeImages>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnimeImages {
    #[serde(default)]
    pub jpg: Option<ImageUrls>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageUrls {
    #[serde(default)]
    pub image_url: Option<String>,
}

impl From<AnimeData> for CatalogEntry {
    fn from(anime: AnimeData) -> Self {
        let slug = Slug::from_title(&anime.title);
        let image_url = anime
            .images
            .and_then(|images| images.jpg)
            .and_then(|jpg| jpg.image_url);

        Self {
            id: anime.mal_id,
            title: anime.title,
            image_url,
            slug,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenreData {
    pub mal_id: u32,
    pub name: String,
    #[serde(default)]
    pub count: u32,
}

impl From<GenreData> for Genre {
    fn from(genre: GenreData) -> Self {
        Self {
            id: genre.mal_id,
            name: genre.name,
            count: genre.count,
        }
    }
}

/// Episode as listed by `/anime/{id}/episodes`; `mal_id` is the episode number
#[derive(Debug, Clone, Deserialize)]
pub struct EpisodeData {
    pub mal_id: u32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub aired: Option<String>,
    #[serde(default)]
    pub filler: bool,
    #[serde(default)]
    pub recap: bool,
}

impl From<EpisodeData> for Episode {
    fn from(episode: EpisodeData) -> Self {
        Self {
            number: episode.mal_id,
            title: episode.title,
            aired: episode.aired,
            filler: episode.filler,
            recap: episode.recap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anime_list_with_pagination() {
        let json = r#"{
            "pagination": {"last_visible_page": 1093, "has_next_page": true, "current_page": 1},
            "data": [
                {"mal_id": 21, "title": "One Piece", "type": "TV",
                 "images": {"jpg": {"image_url": "https://cdn.myanimelist.net/images/anime/6/73245.jpg"}}}
            ]
        }"#;

        let response: ListResponse<AnimeData> = serde_json::from_str(json).unwrap();
        assert!(response.has_next_page());

        let entries: Vec<CatalogEntry> = response.data.into_iter().map(Into::into).collect();
        assert_eq!(entries[0].id, 21);
        assert_eq!(entries[0].slug.as_ref().map(Slug::as_str), Some("one-piece"));
        assert_eq!(
            entries[0].image_url.as_deref(),
            Some("https://cdn.myanimelist.net/images/anime/6/73245.jpg")
        );
    }

    #[test]
    fn test_missing_pagination_means_last_page() {
        let json = r#"{"data": [{"mal_id": 1, "title": "Cowboy Bebop"}]}"#;
        let response: ListResponse<AnimeData> = serde_json::from_str(json).unwrap();
        assert!(!response.has_next_page());

        let entry: CatalogEntry = response.data[0].clone().into();
        assert!(entry.image_url.is_none());
    }

    #[test]
    fn test_episode_conversion() {
        let json = r#"{"data": [
            {"mal_id": 1, "title": "I'm Luffy!", "aired": "1999-10-20T00:00:00+00:00", "filler": false, "recap": false},
            {"mal_id": 2, "title": null}
        ]}"#;
        let response: ListResponse<EpisodeData> = serde_json::from_str(json).unwrap();
        let episodes: Vec<Episode> = response.data.into_iter().map(Into::into).collect();

        assert_eq!(episodes[0].number, 1);
        assert_eq!(episodes[0].title.as_deref(), Some("I'm Luffy!"));
        assert_eq!(episodes[1].number, 2);
        assert!(episodes[1].title.is_none());
        assert!(!episodes[1].filler);
    }

    #[test]
    fn test_genre_conversion() {
        let json = r#"{"data": [{"mal_id": 1, "name": "Action", "url": "https://myanimelist.net/anime/genre/1/Action", "count": 5084}]}"#;
        let response: ListResponse<GenreData> = serde_json::from_str(json).unwrap();
        let genre: Genre = response.data[0].clone().into();
        assert_eq!(
            genre,
            Genre {
                id: 1,
                name: "Action".to_string(),
                count: 5084,
            }
        );
    }
}
