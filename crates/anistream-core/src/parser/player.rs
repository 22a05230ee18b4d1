//! Player frame parser for episode pages
//!
//! Episode pages embed the video player as an iframe inside
//! `div#chapter-video-frame`; its `src` is the stream URL.

use scraper::{Html, Selector};

use crate::error::{AnistreamError, Result};

/// Selector for the embedded player frame
pub const PLAYER_FRAME_SELECTOR: &str = "div#chapter-video-frame iframe";

/// Extract the player URL from an episode page.
///
/// # Returns
/// * `Ok(Some(url))` for the first matching frame with a non-blank `src`
/// * `Ok(None)` if the frame is missing or its `src` is blank
///
/// Protocol-relative sources (`//host/path`) are returned with an `https:`
/// scheme.
///
/// # Examples
/// ```
/// use anistream_core::parser::extract_player_src;
///
/// let html = r#"<div id="chapter-video-frame"><iframe src="https://vidmoly.to/embed-abc.html"></iframe></div>"#;
/// assert_eq!(
///     extract_player_src(html).unwrap(),
///     Some("https://vidmoly.to/embed-abc.html".to_string())
/// );
/// assert_eq!(extract_player_src("<html></html>").unwrap(), None);
/// ```
pub fn extract_player_src(html: &str) -> Result<Option<String>> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(PLAYER_FRAME_SELECTOR)
        .map_err(|e| AnistreamError::ParseError(format!("Invalid selector: {:?}", e)))?;

    let src = document
        .select(&selector)
        .next()
        .and_then(|frame| frame.value().attr("src"))
        .map(str::trim)
        .filter(|src| !src.is_empty())
        .map(normalize_src);

    Ok(src)
}

fn normalize_src(src: &str) -> String {
    if src.starts_with("//") {
        format!("https:{}", src)
    } else {
        src.to_string()
    }
}
