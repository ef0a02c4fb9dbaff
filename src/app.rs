//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the browsing state: the
//! result lists, the active view and selection, the search input and the
//! latest playback snapshot.

mod model;

pub use model::*;
