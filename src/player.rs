//! External player adapter.
//!
//! `PlayerAdapter` keeps exactly one widget alive for the loaded track and
//! turns its callbacks into `AdapterEvent`s. Widgets come from a
//! `WidgetBackend`: `FakeBackend` simulates one, `MprisBackend` drives a
//! media player on the session bus.

mod adapter;
mod fake;
mod mpris;
mod widget;

pub use adapter::*;
pub use fake::*;
pub use mpris::MprisBackend;
pub use widget::*;
