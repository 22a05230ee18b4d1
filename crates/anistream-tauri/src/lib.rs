//! anistream Tauri Integration
//!
//! This crate provides Tauri commands for integrating the catalog browser
//! and stream resolver into Tauri 2.0 applications.
//!
//! # Usage
//!
//! ```rust,ignore
//! use anistream_tauri::AppState;
//! use tauri::Manager;
//!
//! fn main() {
//!     anistream_core::init_logging(tracing::Level::INFO);
//!
//!     tauri::Builder::default()
//!         .setup(|app| {
//!             app.manage(AppState::new()?);
//!             Ok(())
//!         })
//!         .invoke_handler(tauri::generate_handler![
//!             anistream_tauri::commands::list_genres,
//!             anistream_tauri::commands::load_catalog,
//!             anistream_tauri::commands::reload_catalog,
//!             anistream_tauri::commands::next_page,
//!             anistream_tauri::commands::previous_page,
//!             anistream_tauri::commands::select_genre,
//!             anistream_tauri::commands::query_changed,
//!             anistream_tauri::commands::submit_query,
//!             anistream_tauri::commands::get_episodes,
//!             anistream_tauri::commands::resolve_stream,
//!         ])
//!         .run(tauri::generate_context!())
//!         .expect("error while running tauri application");
//! }
//! ```
//!
//! # Commands
//! - `list_genres` - Genres for the filter picker
//! - `load_catalog` / `reload_catalog` - Load the current page, retry after a failure
//! - `next_page` / `previous_page` - Paging
//! - `select_genre` - Genre filter (`null` for all genres)
//! - `query_changed` / `submit_query` - Incremental and confirmed search
//! - `get_episodes` - Episode list for an anime
//! - `resolve_stream` - Player URL for an episode

pub mod commands;

use std::path::Path;
use std::sync::Arc;

use anistream_core::{
    AnistreamError, AppConfig, CatalogBrowser, HttpClient, JikanClient, StreamResolver,
};
use tracing::info;

/// Shared state for all commands.
///
/// The catalog browser serialises its own state changes, the Jikan client and
/// the resolver take `&self`, so no outer lock is needed.
pub struct AppState {
    api: Arc<JikanClient>,
    catalog: CatalogBrowser<Arc<JikanClient>>,
    resolver: StreamResolver<HttpClient>,
}

impl AppState {
    /// Create a new AppState with default configuration.
    ///
    /// # Errors
    /// Returns an error string if an HTTP client cannot be created.
    pub fn new() -> Result<Self, String> {
        Self::with_config(&AppConfig::default()).map_err(|e| e.to_string())
    }

    /// Create a new AppState from a TOML config file.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let config = AppConfig::load(path).map_err(|e| e.to_string())?;
        Self::with_config(&config).map_err(|e| e.to_string())
    }

    pub fn with_config(config: &AppConfig) -> Result<Self, AnistreamError> {
        config.validate()?;

        let api = Arc::new(JikanClient::with_config(&config.api)?);
        let resolver = StreamResolver::from_config(&config.streaming)?;
        info!(
            overrides = resolver.overrides().len(),
            use_overrides = config.streaming.use_overrides,
            "anistream state ready"
        );

        Ok(Self {
            catalog: CatalogBrowser::new(Arc::clone(&api)),
            api,
            resolver,
        })
    }

    pub fn api(&self) -> &JikanClient {
        &self.api
    }

    pub fn catalog(&self) -> &CatalogBrowser<Arc<JikanClient>> {
        &self.catalog
    }

    pub fn resolver(&self) -> &StreamResolver<HttpClient> {
        &self.resolver
    }
}
