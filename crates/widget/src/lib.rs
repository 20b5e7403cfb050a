//! Embeddable autocomplete widget logic.
//!
//! This crate is the headless core shared by every frontend: it owns the
//! query, the suggestion list, the lazy sheet load, and the debounce and
//! blur timing, and emits protocol messages through a [`HostPort`]. It does
//! no IO of its own. Frontends pump host events in, tick
//! [`AutocompleteController::poll`], and run returned [`LoadRequest`]s on a
//! worker thread.

pub mod controller;
pub mod debounce;
pub mod state;

pub use controller::{
    AutocompleteController, HostPort, LoadRequest, BLUR_GRACE, FIXED_HEIGHT, INPUT_AREA_HEIGHT,
    LAZY_LOAD_MIN_CHARS, RESIZE_PADDING, SUGGESTION_ROW_HEIGHT,
};
pub use debounce::Debouncer;
pub use state::{LoadState, UiState};
