use color_eyre::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use ratatui::{backend::CrosstermBackend, Terminal};
use spark_clock::{
    api::WeatherProvider,
    app::App,
    config::Config,
    events::{Event, EventHandler},
    location::{IpLocator, LocationResolver},
    logging, ui,
};
use std::{io, sync::Arc, time::Instant};
use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Instrumentation and safety
    let _log_guard = logging::initialize_logging();
    install_panic_hook();
    color_eyre::install()?;

    let config = Config::load();
    let resolver = Arc::new(LocationResolver::from_config(&config.location));
    let provider = Arc::new(WeatherProvider::new(&config.api)?);

    // Ready terminal and state
    let mut terminal = setup_terminal()?;
    let mut app = App::new(config, Instant::now(), chrono::Local::now().date_naive());
    let mut events = EventHandler::new(app.config.ui.tick_rate_ms);

    // Main loop
    while !app.should_quit {
        if app.take_refresh_request() {
            spawn_pipeline(resolver.clone(), provider.clone(), events.tx.clone());
        }

        terminal.draw(|f| ui::render(f, &app))?;

        match events.next().await {
            Some(Event::Tick) => app.on_tick(Instant::now()),
            Some(Event::Input(key)) => app.handle_key(key),
            Some(Event::Mouse(mouse)) => {
                let size = terminal.size()?;
                app.handle_mouse(mouse, size, Instant::now());
            }
            Some(Event::LocationResolved(pos)) => app.apply_position(pos),
            Some(Event::WeatherUpdate(result)) => app.apply_weather(result),
            Some(Event::InputClosed) | None => break,
        }
    }

    restore_terminal(terminal)?;
    info!("Shutting down.");
    Ok(())
}

/// One run of the weather pipeline: position, then forecast and place name.
/// Strictly sequential; the result goes back to the main loop as events.
fn spawn_pipeline(
    resolver: Arc<LocationResolver<IpLocator>>,
    provider: Arc<WeatherProvider>,
    tx: UnboundedSender<Event>,
) {
    tokio::spawn(async move {
        let pos = resolver.resolve().await;
        let _ = tx.send(Event::LocationResolved(pos));

        let result = provider.fetch_weather(pos).await;
        let _ = tx.send(Event::WeatherUpdate(result));
    });
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(
        stdout,
        crossterm::terminal::EnterAlternateScreen,
        EnableMouseCapture,
        crossterm::cursor::Hide
    )?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(mut terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    )?;
    Ok(())
}

fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Force terminal cleanup!
        crossterm::terminal::disable_raw_mode().ok();
        crossterm::execute!(
            std::io::stdout(),
            DisableMouseCapture,
            crossterm::terminal::LeaveAlternateScreen,
            crossterm::cursor::Show
        )
        .ok();
        original_hook(panic_info);
    }));
}
