//! Debounced user search with a favorites-filtered view.
//!
//! - [`debounce`] - Quiet-period, dedup and emptiness filtering of raw input
//! - [`favorites`] - Session favorites keyed by user id
//! - [`display`] - Projection of results through favorites, and the display state machine
//! - [`pipeline`] - The single-writer actor tying it all to the GitHub client

mod debounce;
mod display;
mod favorites;
mod pipeline;

pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use display::{DisplayState, project};
pub use favorites::Favorites;
pub use pipeline::{SearchOptions, SearchPipeline, SearchSnapshot};
