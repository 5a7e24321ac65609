mod app;
mod cli;
mod components;
mod draw;
mod export;
mod keys;
mod state;
mod ui;
mod view;

use crate::app::App;
use crate::cli::{Cli, Command, ExportFormat};
use crate::state::app_settings::AppSettings;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crate::state::refresher::PeriodicRefresher;
use clap::Parser;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use legends_api::client::LegendsApi;
use log::{LevelFilter, debug, error, info};
use std::io::Stdout;
use std::sync::Arc;
use std::time::Instant;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tokio::time::Duration;
use tui::{Terminal, backend::CrosstermBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = AppSettings::from_cli(&cli);

    if let Some(Command::Export { format }) = cli.command {
        return run_export(settings, format).await;
    }

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(LevelFilter::Trace)?;
    tui_logger::set_default_level(LevelFilter::Info);

    let client = LegendsApi::new(settings.api_url.as_str());
    let refresh_every = settings.refresh_every;
    info!(
        "{} against {} (refresh every {}s)",
        settings.profile.title(),
        client.base_url(),
        refresh_every.as_secs()
    );
    let app = Arc::new(Mutex::new(App::new(settings)));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(client, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Periodic roster refresh thread
    let periodic_updater = PeriodicRefresher::new(ui_event_tx.clone(), refresh_every);
    let periodic_task = tokio::spawn(periodic_updater.run());

    // Banner expiry tick
    let tick_tx = ui_event_tx.clone();
    let tick_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(250));
        loop {
            interval.tick().await;
            if tick_tx.send(UiEvent::Tick).await.is_err() {
                break;
            }
        }
    });

    // Trigger roster load on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();
    periodic_task.abort();
    tick_task.abort();

    Ok(())
}

async fn run_export(settings: AppSettings, format: ExportFormat) -> anyhow::Result<()> {
    env_logger::Builder::new()
        .filter_level(settings.log_level.unwrap_or(LevelFilter::Info))
        .init();

    match format {
        ExportFormat::Pdf { dir } => {
            let dir = dir.unwrap_or_else(|| settings.export_dir.clone());
            let client = LegendsApi::new(settings.api_url.as_str());
            let (path, count) = export::export_pdf(&client, &dir).await?;
            println!("Exported {count} teams to {}", path.display());
        }
        ExportFormat::Html { out } => {
            let out = out.unwrap_or_else(|| settings.export_dir.join(view::html::REPORT_FILE_NAME));
            let path = export::export_html(&settings, &out).await?;
            println!("Wrote report to {}", path.display());
        }
    }
    Ok(())
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                if should_redraw && !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw =
                    handle_network_response(response, &app, &network_requests, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let request = app.lock().await.request_refresh(true);
            if let Some(request) = request {
                let _ = network_requests.send(request).await;
            }
            true
        }
        UiEvent::RefreshDue => {
            let request = app.lock().await.request_refresh(false);
            match request {
                Some(request) => {
                    let _ = network_requests.send(request).await;
                }
                None => debug!("refresh still in flight, skipping tick"),
            }
            false
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
        UiEvent::Tick => app.lock().await.on_tick(Instant::now()),
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    loading: &mut LoadingState,
) -> bool {
    let mut guard = app.lock().await;
    let follow_up = match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            return true;
        }
        NetworkResponse::DataLoaded { ticket, snapshot, partial } => {
            guard.on_data_loaded(ticket, snapshot, partial);
            None
        }
        NetworkResponse::DataFailed { ticket, message, transport } => {
            error!("Roster fetch failed: {message}");
            guard.on_data_failed(ticket, message, transport);
            None
        }
        NetworkResponse::CodeGenerated { code } => {
            guard.on_code_generated(code);
            None
        }
        NetworkResponse::CodeFailed { message } => {
            guard.on_code_failed(message);
            None
        }
        NetworkResponse::Registered { ack } => guard.on_registered(ack),
        NetworkResponse::RegistrationFailed { message } => {
            error!("Registration failed: {message}");
            guard.on_registration_failed(message);
            None
        }
        NetworkResponse::MutationSucceeded { mutation, message } => guard.on_mutation_succeeded(mutation, message),
        NetworkResponse::MutationFailed { mutation, message } => {
            guard.on_mutation_failed(mutation, message);
            None
        }
        NetworkResponse::Exported { path, count } => {
            guard.on_exported(path, count);
            None
        }
        NetworkResponse::ExportFailed { message } => {
            error!("Export failed: {message}");
            guard.on_export_failed(message);
            None
        }
    };

    drop(guard);
    if let Some(request) = follow_up {
        let _ = network_requests.send(request).await;
    }
    !loading.is_loading
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        let event = match tokio::task::spawn_blocking(crossterm_event::read).await {
            Ok(Ok(event)) => event,
            Ok(Err(e)) => {
                error!("terminal input error: {e}");
                continue;
            }
            Err(_) => break,
        };

        let ui_event = match event {
            Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
            Event::Resize(_, _) => Some(UiEvent::Resize),
            _ => None,
        };

        if let Some(ui_event) = ui_event
            && ui_events.send(ui_event).await.is_err()
        {
            break;
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}
