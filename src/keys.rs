use crate::app::{App, MenuItem};
use crate::state::app_state::Modal;
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    if let (Char('c'), KeyModifiers::CONTROL) = (key_event.code, key_event.modifiers) {
        crate::cleanup_terminal();
        std::process::exit(0);
    }

    let request = if guard.state.modal.is_some() {
        handle_modal(&mut guard, key_event)
    } else if guard.state.active_tab == MenuItem::Register {
        handle_form(&mut guard, key_event)
    } else {
        handle_browse(&mut guard, key_event)
    };

    if let Some(request) = request {
        drop(guard);
        let _ = network_requests.send(request).await;
    }
}

fn handle_modal(app: &mut App, key_event: KeyEvent) -> Option<NetworkRequest> {
    let picker = matches!(app.state.modal, Some(Modal::StatusPicker { .. }));
    match key_event.code {
        Char('y') | KeyCode::Enter => return app.confirm_modal(),
        Char('n') | KeyCode::Esc => app.cancel_modal(),
        Char('j') | Char('k') | KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right
            if picker =>
        {
            if let Some(modal) = app.state.modal.as_mut() {
                modal.cycle_choice();
            }
        }
        _ => {}
    }
    None
}

/// The form swallows printable keys, so only function and control keys
/// act as commands here.
fn handle_form(app: &mut App, key_event: KeyEvent) -> Option<NetworkRequest> {
    match (key_event.code, key_event.modifiers) {
        (KeyCode::Esc, _) => {
            if app.state.notice.is_some() {
                app.dismiss_notice();
            } else {
                app.exit_to_previous();
            }
        }
        (KeyCode::Enter, _) => return app.submit_registration(),
        (KeyCode::F(2), _) | (Char('g'), KeyModifiers::CONTROL) => return app.generate_code(),
        (KeyCode::Tab | KeyCode::Down, _) => app.state.form.focus_next(),
        (KeyCode::BackTab | KeyCode::Up, _) => app.state.form.focus_prev(),
        (KeyCode::Backspace, _) => app.state.form.backspace(),
        (Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => app.state.form.push_char(c),
        _ => {}
    }
    None
}

fn handle_browse(app: &mut App, key_event: KeyEvent) -> Option<NetworkRequest> {
    match (app.state.active_tab, key_event.code) {
        (_, Char('q')) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1')) => app.update_tab(MenuItem::Registrations),
        (_, Char('2')) => app.update_tab(MenuItem::AllTeams),
        (_, Char('3')) => app.update_tab(MenuItem::Leaderboard),
        (_, Char('4')) => app.update_tab(MenuItem::Analytics),
        (_, Char('5')) => app.update_tab(MenuItem::Register),
        (_, Char('?')) => app.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc) => app.exit_to_previous(),
        (_, KeyCode::Esc) => app.dismiss_notice(),

        // Table navigation and row actions
        (_, Char('j') | KeyCode::Down) => app.select_next(),
        (_, Char('k') | KeyCode::Up) => app.select_prev(),
        (_, Char('s')) => app.request_promote(),
        (_, Char('d')) => app.request_delete(),
        (_, Char('t')) => app.request_status_change(),

        // Commands
        (_, Char('r')) => return app.request_refresh(true),
        (_, Char('g')) => return app.generate_code(),
        (_, Char('e')) => return app.export_pdf(),

        // Global
        (_, Char('f')) => app.toggle_full_screen(),
        (_, Char('"')) => app.toggle_show_logs(),

        _ => {}
    }
    None
}
