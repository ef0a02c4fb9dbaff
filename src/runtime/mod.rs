use std::env;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::config;
use crate::logging;
use crate::playback::PlaybackController;

mod event_loop;
mod session;
mod settings;
mod startup;

pub use session::SessionDriver;


pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let arg = env::args().nth(1);
    if arg.as_deref() == Some("--print-default-config") {
        print!("{}", config::Settings::default_toml()?);
        return Ok(());
    }

    let settings = settings::load_settings();
    logging::init(&settings.logging);
    log::info!("muse starting");

    let mut catalog = startup::spawn_catalog(&settings.catalog)?;
    let mut driver = startup::build_driver(&settings);
    let mut controls = PlaybackController::new(settings.playback.advance);
    let mut app = App::new();
    startup::request_initial_feeds(&mut app, &mut catalog, arg.as_deref());

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::default();

        event_loop::run(
            &mut terminal,
            &settings,
            &mut app,
            &mut controls,
            &mut driver,
            &mut catalog,
            &mut state,
        )
    })();

    controls.stop();
    driver.shutdown();
    catalog.shutdown(false);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    log::info!("muse stopped");
    run_result
}
