use photoyeet::app::{App, AppSettings};
use photoyeet::cli::{AppConfig, Args};
use photoyeet::config::{SecureStore, UserConfig};
use photoyeet::domain::{LoadingIndicator, PhotoCollection};
use photoyeet::library::{LocalLibrary, MediaLibrary};
use photoyeet::logging;
use photoyeet::store::AssetStore;
use photoyeet::tui;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, sync::Arc, time::Duration};
use tracing::{error, info, warn};

/// Animation frame interval
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

fn main() -> io::Result<()> {
    // Parse command line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Convert to config
    let config: AppConfig = args.into();

    if let Err(e) = logging::init(&config.log_file) {
        eprintln!("Warning: {}", e);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_app_with_config(&config))
}

/// Runs the TUI application with configuration
async fn run_app_with_config(config: &AppConfig) -> io::Result<()> {
    info!(
        "Starting photoyeet on {} ({:?} staging)",
        config.library.display(),
        config.staging
    );
    std::fs::create_dir_all(&config.sandbox)?;

    let library: Arc<dyn MediaLibrary> = Arc::new(LocalLibrary::new(&config.library));
    let store = AssetStore::open(library, config.staging, &config.sandbox).await;
    let collection = PhotoCollection::new(store, LoadingIndicator::new());

    // Load user configuration
    let user_config = UserConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load user config: {}", e);
        UserConfig::default()
    });
    let settings = AppSettings {
        show_welcome: config.show_welcome,
        config_path: UserConfig::config_path(),
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let columns = terminal.size()?.width;
    let mut app = App::new(
        collection,
        SecureStore::in_dir(&config.sandbox),
        user_config,
        settings,
        columns,
    );

    // Main loop
    let result = run_loop(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        error!("Exited with error: {}", e);
    }
    result
}

/// Main application loop
async fn run_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    let mut events = EventStream::new();
    let mut frames = tokio::time::interval(FRAME_INTERVAL);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    app.start().await;
    terminal.draw(|frame| tui::render(frame, app))?;

    loop {
        // Library work runs one command at a time with the overlay up
        if let Some(command) = app.next_command() {
            if let Some(message) = app.loading_message(&command) {
                app.collection().loading().show(message);
            }
            terminal.draw(|frame| tui::render(frame, app))?;
            app.run(command).await;
            terminal.draw(|frame| tui::render(frame, app))?;
            continue;
        }

        if app.should_quit() {
            break;
        }

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(event)) => app.handle_event(event, std::time::Instant::now()),
                Some(Err(e)) => return Err(e),
                None => break,
            },
            _ = frames.tick() => {
                app.on_tick(std::time::Instant::now());
                terminal.draw(|frame| tui::render(frame, app))?;
            }
        }
    }

    info!("Quitting");
    Ok(())
}
