use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use ratatui::prelude::*;
use ratatui_image::picker::Picker;
use std::{io, time::Duration};
use tokio::sync::mpsc;

use rmanhwa::{
    api::Client,
    app::App,
    config::Settings,
    logging,
    net::{run_config_watcher, run_network_loop},
    ui::ui,
};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load();
    let log_path = logging::init(settings.log_file.clone())?;
    info!(
        "starting rmanhwa (api {}, relay {:?}), logging to {}",
        settings.api_base,
        settings.relay,
        log_path.display()
    );

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, settings).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    result
}

async fn run<B: Backend>(terminal: &mut Terminal<B>, settings: Settings) -> Result<()> {
    let (action_tx, action_rx) = mpsc::unbounded_channel();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();

    let image_picker =
        Picker::from_query_stdio().unwrap_or_else(|_| Picker::from_fontsize((8, 12)));
    let mut app = App::new(action_tx, settings.theme, settings.mature, Some(image_picker));
    tokio::spawn(run_network_loop(
        Client::from_settings(&settings),
        action_rx,
        event_tx.clone(),
    ));
    tokio::spawn(run_config_watcher(event_tx));

    app.start();

    let tick_rate = Duration::from_millis(100);
    let mut last_tick = std::time::Instant::now();

    loop {
        terminal.draw(|f| ui(f, &mut app))?;
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::from_secs(0));
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Press && app.handle_key(key.code) {
                        break;
                    }
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }
        while let Ok(e) = event_rx.try_recv() {
            app.on_network_event(e);
        }
        if last_tick.elapsed() >= tick_rate {
            last_tick = std::time::Instant::now();
        }
    }

    info!("bye");
    Ok(())
}
