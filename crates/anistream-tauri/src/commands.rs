//! Tauri commands for anistream
//!
//! This module contains all Tauri commands that can be invoked from the frontend.
//! Catalog commands return the catalog view after the triggered fetch; a
//! failed fetch shows up in `CatalogView::error` and is retried with
//! `reload_catalog`.

use tauri::State;

use crate::AppState;
use anistream_core::{CatalogView, Episode, Genre, ResolvedStream, Slug};

/// List all genres for the genre picker.
#[tauri::command]
pub async fn list_genres(state: State<'_, AppState>) -> Result<Vec<Genre>, String> {
    state.api().genres().await.map_err(|e| e.to_string())
}

/// Load the catalog for the current filter (first screen).
#[tauri::command]
pub async fn load_catalog(state: State<'_, AppState>) -> Result<CatalogView, String> {
    Ok(state.catalog().reload().await)
}

/// Fetch the current filter again after a failure.
#[tauri::command]
pub async fn reload_catalog(state: State<'_, AppState>) -> Result<CatalogView, String> {
    Ok(state.catalog().reload().await)
}

/// Go to the next page. Does nothing if the last page is shown.
#[tauri::command]
pub async fn next_page(state: State<'_, AppState>) -> Result<CatalogView, String> {
    Ok(state.catalog().next_page().await)
}

/// Go to the previous page. Does nothing on page 1.
#[tauri::command]
pub async fn previous_page(state: State<'_, AppState>) -> Result<CatalogView, String> {
    Ok(state.catalog().previous_page().await)
}

/// Filter by genre.
///
/// # Arguments
/// * `genre_id` - MyAnimeList genre ID, `null` for all genres
#[tauri::command]
pub async fn select_genre(
    state: State<'_, AppState>,
    genre_id: Option<u32>,
) -> Result<CatalogView, String> {
    Ok(state.catalog().select_genre(genre_id).await)
}

/// Search text edited. Searches from three characters on.
#[tauri::command]
pub async fn query_changed(
    state: State<'_, AppState>,
    text: String,
) -> Result<CatalogView, String> {
    Ok(state.catalog().query_changed(&text).await)
}

/// Search text confirmed.
///
/// # Returns
/// * `Err(String)` if the text is blank
#[tauri::command]
pub async fn submit_query(
    state: State<'_, AppState>,
    text: String,
) -> Result<CatalogView, String> {
    state
        .catalog()
        .query_submitted(&text)
        .await
        .map_err(|e| e.to_string())
}

/// Get all episodes of an anime.
///
/// # Arguments
/// * `anime_id` - MyAnimeList ID
#[tauri::command]
pub async fn get_episodes(
    state: State<'_, AppState>,
    anime_id: u32,
) -> Result<Vec<Episode>, String> {
    state
        .api()
        .episodes(anime_id)
        .await
        .map_err(|e| e.to_string())
}

/// Resolve the player URL for an episode.
///
/// # Arguments
/// * `anime_id` - MyAnimeList ID, used for the override table
/// * `slug` - Slug of the catalog entry
/// * `episode` - Episode number (1-based)
///
/// # Returns
/// * `Err(String)` with a displayable message when no stream is found
#[tauri::command]
pub async fn resolve_stream(
    state: State<'_, AppState>,
    anime_id: u32,
    slug: String,
    episode: u32,
) -> Result<ResolvedStream, String> {
    let slug = Slug::parse(&slug).map_err(|e| e.to_string())?;
    state
        .resolver()
        .resolve_entry(anime_id, &slug, episode)
        .await
        .map_err(|e| e.to_string())
}
