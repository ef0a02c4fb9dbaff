mod app;
mod catalog;
mod config;
mod logging;
mod playback;
mod player;
mod runtime;
mod sync;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
