//! Catalog filter state, request selection and paging
//!
//! [`CatalogEngine`] is a synchronous state machine: user events mutate the
//! filter and hand back a [`FetchTicket`] describing the one request to make;
//! completed fetches are fed back through [`CatalogEngine::apply`].
//! [`CatalogBrowser`] drives it against a [`CatalogSource`] and cancels a
//! fetch as soon as a newer one is issued.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use crate::error::{AnistreamError, Result};
use crate::types::{CatalogEntry, CatalogView, PaginatedResult};

/// Incremental search waits for this many characters of trimmed input
pub const MIN_INCREMENTAL_QUERY_CHARS: usize = 3;

/// What to fetch next.
///
/// Setting the search query or the genre always resets the page to 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFilterState {
    page: u32,
    genre_id: Option<u32>,
    search_query: Option<String>,
}

impl Default for CatalogFilterState {
    fn default() -> Self {
        Self {
            page: 1,
            genre_id: None,
            search_query: None,
        }
    }
}

impl CatalogFilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn genre_id(&self) -> Option<u32> {
        self.genre_id
    }

    pub fn search_query(&self) -> Option<&str> {
        self.search_query.as_deref()
    }

    /// Move to another page, keeping both filters. Page 0 is treated as 1.
    pub fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    pub fn set_genre(&mut self, genre_id: Option<u32>) {
        self.genre_id = genre_id;
        self.page = 1;
    }

    /// Set the text filter. Blank text clears it.
    pub fn set_search_query(&mut self, query: Option<&str>) {
        self.search_query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);
        self.page = 1;
    }

    /// The single request this state maps to.
    pub fn request(&self) -> CatalogRequest {
        let page = self.page;
        match (&self.search_query, self.genre_id) {
            (Some(query), Some(genre_id)) => CatalogRequest::SearchWithGenre {
                query: query.clone(),
                genre_id,
                page,
            },
            (Some(query), None) => CatalogRequest::Search {
                query: query.clone(),
                page,
            },
            (None, Some(genre_id)) => CatalogRequest::ByGenre { genre_id, page },
            (None, None) => CatalogRequest::TopAnime { page },
        }
    }
}

/// One metadata-API list request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogRequest {
    TopAnime { page: u32 },
    ByGenre { genre_id: u32, page: u32 },
    Search { query: String, page: u32 },
    SearchWithGenre { query: String, genre_id: u32, page: u32 },
}

impl CatalogRequest {
    pub fn page(&self) -> u32 {
        match self {
            Self::TopAnime { page }
            | Self::ByGenre { page, .. }
            | Self::Search { page, .. }
            | Self::SearchWithGenre { page, .. } => *page,
        }
    }

    /// Path and query relative to the API base URL
    ///
    /// # Examples
    /// ```
    /// use anistream_core::catalog::CatalogRequest;
    ///
    /// let request = CatalogRequest::SearchWithGenre {
    ///     query: "one piece".to_string(),
    ///     genre_id: 1,
    ///     page: 2,
    /// };
    /// assert_eq!(request.path(), "/anime?q=one%20piece&genres=1&page=2");
    /// ```
    pub fn path(&self) -> String {
        match self {
            Self::TopAnime { page } => format!("/top/anime?page={}", page),
            Self::ByGenre { genre_id, page } => {
                format!("/anime?genres={}&page={}", genre_id, page)
            }
            Self::Search { query, page } => {
                format!("/anime?q={}&page={}", urlencoding::encode(query), page)
            }
            Self::SearchWithGenre {
                query,
                genre_id,
                page,
            } => format!(
                "/anime?q={}&genres={}&page={}",
                urlencoding::encode(query),
                genre_id,
                page
            ),
        }
    }
}

/// Where catalog pages come from
pub trait CatalogSource: Send + Sync {
    fn fetch_catalog(
        &self,
        request: &CatalogRequest,
    ) -> impl Future<Output = Result<PaginatedResult<CatalogEntry>>> + Send;
}

impl<T: CatalogSource> CatalogSource for Arc<T> {
    fn fetch_catalog(
        &self,
        request: &CatalogRequest,
    ) -> impl Future<Output = Result<PaginatedResult<CatalogEntry>>> + Send {
        (**self).fetch_catalog(request)
    }
}

/// A request the engine wants made, tagged with the generation that issued it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub request: CatalogRequest,
}

/// Catalog state machine
///
/// `filter` is what the last issued request asked for; `shown` is the filter
/// the displayed entries were loaded with. A failed fetch puts `filter` back
/// to `shown` and parks the attempt in `retry` for [`CatalogEngine::reload`].
#[derive(Debug, Default)]
pub struct CatalogEngine {
    filter: CatalogFilterState,
    shown: CatalogFilterState,
    retry: Option<CatalogFilterState>,
    entries: Vec<CatalogEntry>,
    has_next_page: bool,
    last_error: Option<String>,
    generation: u64,
    in_flight: Option<u64>,
}

impl CatalogEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&self) -> &CatalogFilterState {
        &self.filter
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Taken from the last successful response's pagination descriptor
    pub fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    pub fn has_previous_page(&self) -> bool {
        self.filter.page > 1
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Request for the current filter. Used for the first load and for retry:
    /// after a failure this re-issues the request that failed.
    pub fn reload(&mut self) -> FetchTicket {
        if let Some(failed) = self.retry.take() {
            self.filter = failed;
        }
        self.issue()
    }

    pub fn next_page(&mut self) -> Option<FetchTicket> {
        if !self.has_next_page {
            return None;
        }
        self.filter.set_page(self.filter.page + 1);
        Some(self.issue())
    }

    pub fn previous_page(&mut self) -> Option<FetchTicket> {
        if !self.has_previous_page() {
            return None;
        }
        self.filter.set_page(self.filter.page - 1);
        Some(self.issue())
    }

    /// `None` selects every genre.
    pub fn select_genre(&mut self, genre_id: Option<u32>) -> FetchTicket {
        self.filter.set_genre(genre_id);
        self.issue()
    }

    /// Search text edited.
    ///
    /// Searches once the trimmed text has at least
    /// [`MIN_INCREMENTAL_QUERY_CHARS`] characters. Clearing the text drops
    /// the text filter and goes back to page 1. Anything in between is
    /// ignored.
    pub fn query_changed(&mut self, text: &str) -> Option<FetchTicket> {
        if text.is_empty() {
            self.filter.set_search_query(None);
            return Some(self.issue());
        }

        let trimmed = text.trim();
        if trimmed.chars().count() < MIN_INCREMENTAL_QUERY_CHARS {
            return None;
        }

        self.filter.set_search_query(Some(trimmed));
        Some(self.issue())
    }

    /// Search text confirmed. Any non-blank text searches.
    pub fn query_submitted(&mut self, text: &str) -> Result<FetchTicket> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(AnistreamError::EmptyQuery);
        }

        self.filter.set_search_query(Some(trimmed));
        Ok(self.issue())
    }

    /// Feed back the outcome of a fetch.
    ///
    /// Outcomes from superseded tickets are dropped. A success replaces the
    /// whole list; a failure keeps the list, the filter and paging as they
    /// were and records the error. Returns whether the outcome was applied.
    pub fn apply(
        &mut self,
        generation: u64,
        outcome: Result<PaginatedResult<CatalogEntry>>,
    ) -> bool {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "Dropping stale catalog response"
            );
            return false;
        }
        self.in_flight = None;

        match outcome {
            Ok(page) => {
                debug!(
                    page = self.filter.page,
                    items = page.items.len(),
                    has_next_page = page.has_next_page,
                    "Catalog page loaded"
                );
                self.entries = page.items;
                self.has_next_page = page.has_next_page;
                self.shown = self.filter.clone();
                self.last_error = None;
            }
            Err(e) => {
                warn!(error = %e, "Catalog fetch failed, keeping previous page");
                let failed = std::mem::replace(&mut self.filter, self.shown.clone());
                self.retry = Some(failed);
                self.last_error = Some(e.to_string());
            }
        }
        true
    }

    pub fn view(&self) -> CatalogView {
        CatalogView {
            entries: self.entries.clone(),
            page: self.filter.page,
            genre_id: self.filter.genre_id,
            search_query: self.filter.search_query.clone(),
            has_next_page: self.has_next_page,
            has_previous_page: self.has_previous_page(),
            loading: self.is_loading(),
            error: self.last_error.clone(),
        }
    }

    fn issue(&mut self) -> FetchTicket {
        self.retry = None;
        self.generation += 1;
        self.in_flight = Some(self.generation);
        FetchTicket {
            generation: self.generation,
            request: self.filter.request(),
        }
    }
}

/// Drives a [`CatalogEngine`] against a [`CatalogSource`].
///
/// Every event method returns the view after the fetch it triggered has
/// finished. If a newer event is issued meanwhile, the older fetch is
/// dropped and its caller gets the view as it stands.
pub struct CatalogBrowser<S> {
    source: S,
    engine: Mutex<CatalogEngine>,
    latest: watch::Sender<u64>,
}

impl<S: CatalogSource> CatalogBrowser<S> {
    pub fn new(source: S) -> Self {
        let (latest, _) = watch::channel(0);
        Self {
            source,
            engine: Mutex::new(CatalogEngine::new()),
            latest,
        }
    }

    pub async fn view(&self) -> CatalogView {
        self.engine.lock().await.view()
    }

    /// Load the current filter again. Also the retry for a failed fetch.
    pub async fn reload(&self) -> CatalogView {
        let ticket = self.issue(|engine| Some(engine.reload())).await;
        self.run(ticket).await
    }

    pub async fn next_page(&self) -> CatalogView {
        let ticket = self.issue(CatalogEngine::next_page).await;
        self.run(ticket).await
    }

    pub async fn previous_page(&self) -> CatalogView {
        let ticket = self.issue(CatalogEngine::previous_page).await;
        self.run(ticket).await
    }

    pub async fn select_genre(&self, genre_id: Option<u32>) -> CatalogView {
        info!(?genre_id, "Genre selected");
        let ticket = self
            .issue(|engine| Some(engine.select_genre(genre_id)))
            .await;
        self.run(ticket).await
    }

    pub async fn query_changed(&self, text: &str) -> CatalogView {
        let ticket = self.issue(|engine| engine.query_changed(text)).await;
        self.run(ticket).await
    }

    /// # Errors
    /// `AnistreamError::EmptyQuery` if the text is blank; nothing is fetched.
    pub async fn query_submitted(&self, text: &str) -> Result<CatalogView> {
        let ticket = {
            let mut engine = self.engine.lock().await;
            let ticket = engine.query_submitted(text)?;
            self.latest.send_replace(ticket.generation);
            ticket
        };
        info!(query = %text.trim(), "Search submitted");
        Ok(self.run(Some(ticket)).await)
    }

    /// Run an engine event and publish the ticket's generation while still
    /// holding the lock, so generations are announced in issue order.
    async fn issue<F>(&self, event: F) -> Option<FetchTicket>
    where
        F: FnOnce(&mut CatalogEngine) -> Option<FetchTicket>,
    {
        let mut engine = self.engine.lock().await;
        let ticket = event(&mut engine);
        if let Some(ticket) = &ticket {
            self.latest.send_replace(ticket.generation);
        }
        ticket
    }

    async fn run(&self, ticket: Option<FetchTicket>) -> CatalogView {
        if let Some(ticket) = ticket {
            debug!(generation = ticket.generation, request = ?ticket.request, "Fetching catalog page");
            let superseded = wait_superseded(self.latest.subscribe(), ticket.generation);

            tokio::select! {
                outcome = self.source.fetch_catalog(&ticket.request) => {
                    self.engine.lock().await.apply(ticket.generation, outcome);
                }
                _ = superseded => {
                    debug!(generation = ticket.generation, "Catalog fetch cancelled by a newer request");
                }
            }
        }

        self.view().await
    }
}

/// Resolves once the published generation differs from `generation`.
async fn wait_superseded(mut latest: watch::Receiver<u64>, generation: u64) {
    loop {
        if *latest.borrow_and_update() != generation {
            return;
        }
        if latest.changed().await.is_err() {
            // Sender gone: nothing can supersede this fetch any more.
            std::future::pending::<()>().await;
        }
    }
}
