//! Async event handler for the playground TUI.

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::{
    app::{App, View, TAB_INDENT},
    events::TuiEvent,
    ui::render_ui,
};
use crate::bridge::ExecutionBridge;
use crate::consent::BannerDecision;

/// What the main loop must do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Run,
    Quit,
}

/// Run the interactive playground until the user quits.
pub async fn run_playground(mut app: App, bridge: ExecutionBridge) -> Result<()> {
    if !io::IsTerminal::is_terminal(&io::stdout()) {
        return Err(anyhow::anyhow!("the playground requires a proper terminal environment"));
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, bridge).await;

    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    bridge: ExecutionBridge,
) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<TuiEvent>();

    // The screen is up: the consent banner may now be shown.
    if app.consent.initialize() == BannerDecision::Show {
        debug!("consent banner shown");
    }

    // Start loading the engine right away; runs join this attempt.
    let loader = bridge.loader().clone();
    let load_tx = event_tx.clone();
    tokio::spawn(async move {
        let result = loader.ensure_ready().await.map(|_| ());
        let _ = load_tx.send(TuiEvent::EngineLoaded(result));
    });

    let input_tx = event_tx.clone();
    tokio::task::spawn_blocking(move || loop {
        if event::poll(Duration::from_millis(100)).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                if input_tx.send(TuiEvent::Key(key)).is_err() {
                    break;
                }
            }
        } else if input_tx.is_closed() {
            break;
        }
    });

    let mut current_run: Option<JoinHandle<()>> = None;
    loop {
        terminal.draw(|frame| render_ui(frame, app))?;

        let mut quit = false;
        while let Ok(tui_event) = event_rx.try_recv() {
            match tui_event {
                TuiEvent::Key(key) => match handle_key_event(app, key) {
                    KeyAction::Quit => quit = true,
                    KeyAction::Run => {
                        if let Some(handle) = spawn_run(app, &bridge, event_tx.clone()) {
                            current_run = Some(handle);
                        }
                    }
                    KeyAction::None => {}
                },
                TuiEvent::EngineLoaded(result) => app.engine_loaded(result),
                TuiEvent::Status(status) => app.set_status(status),
                TuiEvent::RunFinished(result) => app.finish_run(result),
                TuiEvent::Quit => quit = true,
            }
            if quit {
                break;
            }
        }
        if quit {
            break;
        }

        tokio::time::sleep(Duration::from_millis(16)).await;
    }

    // Dropping the run future kills the engine child.
    if let Some(handle) = current_run.take() {
        handle.abort();
        let _ = handle.await;
    }
    Ok(())
}

fn spawn_run(
    app: &mut App,
    bridge: &ExecutionBridge,
    event_tx: mpsc::UnboundedSender<TuiEvent>,
) -> Option<JoinHandle<()>> {
    let source = app.begin_run()?;
    info!(example = app.current_example_name().unwrap_or("custom"), "run requested");
    let bridge = bridge.clone();
    Some(tokio::spawn(async move {
        let status_tx = event_tx.clone();
        let result = bridge
            .run_with(&source, move |status| {
                let _ = status_tx.send(TuiEvent::Status(status));
            })
            .await;
        let _ = event_tx.send(TuiEvent::RunFinished(result));
    }))
}

/// Apply one key press to the app state.
pub fn handle_key_event(app: &mut App, key: KeyEvent) -> KeyAction {
    if key.kind == KeyEventKind::Release {
        return KeyAction::None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') | KeyCode::Char('q') if ctrl => return KeyAction::Quit,
        _ => {}
    }

    // The banner takes every other key until the user decides.
    if app.consent.is_visible() {
        match key.code {
            KeyCode::Char('a') | KeyCode::Char('A') => app.consent.accept(),
            KeyCode::Char('r') | KeyCode::Char('R') => app.consent.reject(),
            _ => {}
        }
        return KeyAction::None;
    }

    if app.is_overlay_shown() {
        app.hide_overlay();
        return KeyAction::None;
    }

    match key.code {
        KeyCode::F(1) => app.toggle_help(),
        KeyCode::F(2) => app.nav.toggle(),
        KeyCode::F(3) | KeyCode::BackTab => app.tabs.next(),
        KeyCode::F(5) => return KeyAction::Run,
        KeyCode::Char('r') if ctrl => return KeyAction::Run,
        KeyCode::Enter if ctrl => return KeyAction::Run,
        KeyCode::Char('n') if ctrl => app.next_example(),
        KeyCode::Char('p') if ctrl => app.prev_example(),
        KeyCode::Char('s') if ctrl => app.show_share(),
        KeyCode::Char('l') if ctrl => app.clear_output(),
        KeyCode::PageUp => app.scroll_output_up(),
        KeyCode::PageDown => app.scroll_output_down(),
        _ => match app.view() {
            View::Playground => handle_editor_key(app, key),
            View::Examples => handle_gallery_key(app, key),
        },
    }
    KeyAction::None
}

fn handle_editor_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return;
    }
    let editor = &mut app.editor;
    match key.code {
        KeyCode::Char(c) => editor.insert_char(c),
        KeyCode::Tab => editor.insert_str(TAB_INDENT),
        KeyCode::Enter => editor.newline(),
        KeyCode::Backspace => editor.backspace(),
        KeyCode::Delete => editor.delete(),
        KeyCode::Left => editor.move_left(),
        KeyCode::Right => editor.move_right(),
        KeyCode::Up => editor.move_up(),
        KeyCode::Down => editor.move_down(),
        KeyCode::Home => editor.move_home(),
        KeyCode::End => editor.move_end(),
        _ => {}
    }
}

fn handle_gallery_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Left => app.gallery.prev(),
        KeyCode::Right | KeyCode::Tab => app.gallery.next(),
        KeyCode::Enter => app.open_gallery_example(),
        _ => {}
    }
}
