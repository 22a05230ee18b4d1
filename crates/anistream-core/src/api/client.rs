//! Jikan API v4 client.

use std::future::Future;

use tracing::{debug, info};

use super::types::{AnimeData, EpisodeData, GenreData, ListResponse};
use crate::catalog::{CatalogRequest, CatalogSource};
use crate::client::HttpClient;
use crate::config::ApiConfig;
use crate::error::{AnistreamError, Result};
use crate::types::{CatalogEntry, Episode, Genre, PaginatedResult};

/// Upper bound on episode-list pages followed for one anime
const MAX_EPISODE_PAGES: u32 = 40;

/// Jikan API v4 client
///
/// # Example
/// ```no_run
/// use anistream_core::JikanClient;
///
/// # async fn example() -> Result<(), anistream_core::AnistreamError> {
/// let api = JikanClient::new()?;
/// let top = api.top_anime(1).await?;
/// for entry in top.items {
///     println!("{} ({})", entry.title, entry.id);
/// }
/// # Ok(())
/// # }
/// ```
pub struct JikanClient {
    http: HttpClient,
    base_url: String,
}

impl JikanClient {
    /// Create a client for the public Jikan instance
    pub fn new() -> Result<Self> {
        Self::with_config(&ApiConfig::default())
    }

    pub fn with_config(config: &ApiConfig) -> Result<Self> {
        let http = HttpClient::with_config(config.client_config())?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Top-ranked anime
    pub async fn top_anime(&self, page: u32) -> Result<PaginatedResult<CatalogEntry>> {
        self.catalog_page(&CatalogRequest::TopAnime { page: page.max(1) })
            .await
    }

    pub async fn anime_by_genre(
        &self,
        genre_id: u32,
        page: u32,
    ) -> Result<PaginatedResult<CatalogEntry>> {
        if genre_id == 0 {
            return Err(AnistreamError::InvalidId(genre_id));
        }
        self.catalog_page(&CatalogRequest::ByGenre {
            genre_id,
            page: page.max(1),
        })
        .await
    }

    /// Search anime by title.
    ///
    /// # Errors
    /// `AnistreamError::EmptyQuery` if the query is blank.
    pub async fn search(&self, query: &str, page: u32) -> Result<PaginatedResult<CatalogEntry>> {
        let query = non_blank(query)?;
        self.catalog_page(&CatalogRequest::Search {
            query,
            page: page.max(1),
        })
        .await
    }

    pub async fn search_with_genre(
        &self,
        query: &str,
        genre_id: u32,
        page: u32,
    ) -> Result<PaginatedResult<CatalogEntry>> {
        let query = non_blank(query)?;
        if genre_id == 0 {
            return Err(AnistreamError::InvalidId(genre_id));
        }
        self.catalog_page(&CatalogRequest::SearchWithGenre {
            query,
            genre_id,
            page: page.max(1),
        })
        .await
    }

    /// All anime genres
    pub async fn genres(&self) -> Result<Vec<Genre>> {
        info!("Fetching anime genres");
        let response: ListResponse<GenreData> =
            self.http.fetch_json(&self.url("/genres/anime")).await?;
        Ok(response.data.into_iter().map(Genre::from).collect())
    }

    /// One page of an anime's episode list
    pub async fn episodes_page(&self, anime_id: u32, page: u32) -> Result<PaginatedResult<Episode>> {
        if anime_id == 0 {
            return Err(AnistreamError::InvalidId(anime_id));
        }

        let page = page.max(1);
        let path = format!("/anime/{}/episodes?page={}", anime_id, page);
        let response: ListResponse<EpisodeData> = self.http.fetch_json(&self.url(&path)).await?;
        let has_next_page = response.has_next_page();
        let items = response.data.into_iter().map(Episode::from).collect();

        Ok(PaginatedResult::new(items, page, has_next_page))
    }

    /// Every episode of an anime, following pagination
    pub async fn episodes(&self, anime_id: u32) -> Result<Vec<Episode>> {
        info!(anime_id, "Fetching episode list");

        let mut episodes = Vec::new();
        let mut page = 1;
        loop {
            let result = self.episodes_page(anime_id, page).await?;
            episodes.extend(result.items);

            if !result.has_next_page || page >= MAX_EPISODE_PAGES {
                break;
            }
            page += 1;
        }

        debug!(anime_id, count = episodes.len(), "Episode list complete");
        Ok(episodes)
    }

    async fn catalog_page(&self, request: &CatalogRequest) -> Result<PaginatedResult<CatalogEntry>> {
        debug!(request = ?request, "Fetching catalog page");
        let response: ListResponse<AnimeData> =
            self.http.fetch_json(&self.url(&request.path())).await?;
        let has_next_page = response.has_next_page();
        let items = response.data.into_iter().map(CatalogEntry::from).collect();

        Ok(PaginatedResult::new(items, request.page(), has_next_page))
    }
}

impl CatalogSource for JikanClient {
    fn fetch_catalog(
        &self,
        request: &CatalogRequest,
    ) -> impl Future<Output = Result<PaginatedResult<CatalogEntry>>> + Send {
        self.catalog_page(request)
    }
}

fn non_blank(query: &str) -> Result<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        Err(AnistreamError::EmptyQuery)
    } else {
        Ok(trimmed.to_string())
    }
}
