use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, Tab};
use crate::tui::AppEvent;

const WHEEL_LINES: u16 = 3;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        // The loop redraws after every event, which picks up the new size
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work on either tab
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            return;
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.next_tab();
            return;
        }
        KeyCode::F(1) => {
            app.select_tab(Tab::Ask);
            return;
        }
        KeyCode::F(2) => {
            app.select_tab(Tab::Context);
            return;
        }
        _ => {}
    }

    match app.tab {
        Tab::Ask => handle_ask_key(app, key),
        Tab::Context => handle_context_key(app, key),
    }
}

fn handle_ask_key(app: &mut App, key: KeyEvent) {
    match key.code {
        // History scrolling works while waiting too
        KeyCode::PageUp => app.scroll_chat_up(app.half_page()),
        KeyCode::PageDown => app.scroll_chat_down(app.half_page()),
        KeyCode::Up => app.scroll_chat_up(1),
        KeyCode::Down => app.scroll_chat_down(1),
        KeyCode::Char('o') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(url) = app.latest_reference_url() {
                open_in_browser(&url);
            }
        }
        KeyCode::Esc => {
            if app.input.value().is_empty() {
                app.should_quit = true;
            } else if !app.chat.is_sending() {
                app.input.clear();
            }
        }

        // Input is disabled while a question is in flight
        _ if app.chat.is_sending() => {}

        KeyCode::Enter
            if key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
        {
            app.input.insert('\n');
        }
        KeyCode::Enter => {
            app.submit_question();
        }
        KeyCode::Backspace => app.input.backspace(),
        KeyCode::Delete => app.input.delete(),
        KeyCode::Left => app.input.move_left(),
        KeyCode::Right => app.input.move_right(),
        KeyCode::Home => app.input.move_home(),
        KeyCode::End => app.input.move_end(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.input.insert(c);
        }
        _ => {}
    }
}

fn handle_context_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => {
            app.provide_context();
        }
        KeyCode::Esc | KeyCode::Char('q') => app.should_quit = true,
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    if app.tab != Tab::Ask {
        return;
    }

    let in_chat = app
        .chat_area
        .is_some_and(|r| point_in_rect(mouse.column, mouse.row, r));
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_chat_down(WHEEL_LINES),
        MouseEventKind::ScrollUp => app.scroll_chat_up(WHEEL_LINES),
        _ => {}
    }
}

/// Open `url` in the system browser, detached from the terminal
fn open_in_browser(url: &str) {
    use std::process::{Command, Stdio};

    #[cfg(target_os = "macos")]
    let mut command = Command::new("open");
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    };
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let mut command = Command::new("xdg-open");

    let spawned = command
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();

    match spawned {
        Ok(_) => tracing::info!(%url, "opened reference"),
        Err(err) => tracing::warn!(%url, error = %err, "could not open reference"),
    }
}
