//! Keeps the on-screen progress and volume in step with the player.
//!
//! Progress is pulled from the adapter on a fixed period while a ready
//! session is playing; volume and seeks are pushed from the UI to the
//! adapter and never read back.

mod synchronizer;
mod task;

pub use synchronizer::*;
pub use task::*;

#[cfg(test)]
mod tests;
