//! HTML parsers for streaming-site pages
//!
//! - `player`: Extract the embedded player URL from an episode page

pub mod player;

pub use player::{extract_player_src, PLAYER_FRAME_SELECTOR};
