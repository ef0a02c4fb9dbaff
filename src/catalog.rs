//! Track catalog: the records we play and where they come from.
//!
//! `CatalogClient` talks to the Muse proxy over HTTP, `CatalogWorker` runs
//! those requests off the UI thread.

mod client;
mod model;
mod worker;

pub use client::*;
pub use model::*;
pub use worker::*;
