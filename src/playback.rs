//! Playback state: what is playing, the playlist around it, and how to move
//! through that playlist.

mod controller;
mod policy;

pub use controller::*;

#[cfg(test)]
mod tests;
