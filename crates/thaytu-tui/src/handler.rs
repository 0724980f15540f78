use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::App;
use crate::tui::AppEvent;

const WHEEL_ROWS: usize = 3;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Session(event) => app.session.handle(event),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work whether or not the input has focus
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => app.should_quit = true,
            KeyCode::Char('r') => {
                app.session.reset();
            }
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::F(n @ 1..=4) => {
            app.session.apply_suggestion(n as usize - 1);
            return;
        }
        KeyCode::PageUp => {
            app.scroll_half_page_up();
            return;
        }
        KeyCode::PageDown => {
            app.scroll_half_page_down();
            return;
        }
        KeyCode::Tab => {
            let input = app.session.input_mut();
            if input.is_focused() {
                input.blur();
            } else {
                input.focus();
            }
            return;
        }
        _ => {}
    }

    if app.session.input().is_focused() {
        handle_input_key(app, key);
    } else {
        handle_normal_key(app, key);
    }
}

fn handle_normal_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('i') | KeyCode::Enter => app.session.input_mut().focus(),
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::Char('G') | KeyCode::End => app.scroll_to_bottom(),
        _ => {}
    }
}

fn handle_input_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.session.input_mut().blur(),
        KeyCode::Enter => {
            if app.session.submit_input() {
                app.scroll_to_bottom();
            }
        }
        KeyCode::Backspace => app.session.input_mut().backspace(),
        KeyCode::Delete => app.session.input_mut().delete(),
        KeyCode::Left => app.session.input_mut().move_left(),
        KeyCode::Right => app.session.input_mut().move_right(),
        KeyCode::Home => app.session.input_mut().move_home(),
        KeyCode::End => app.session.input_mut().move_end(),
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::Char(c) => app.session.input_mut().insert(c),
        _ => {}
    }
}

fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(WHEEL_ROWS),
        MouseEventKind::ScrollUp => app.scroll_up(WHEEL_ROWS),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use thaytu_core::{ChatRole, Config};
    use tokio::sync::mpsc;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn ctrl(c: char) -> AppEvent {
        AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL))
    }

    fn app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        let config = Config {
            // Nothing listens on the discard port, so sends fail fast
            server_url: Some("http://127.0.0.1:9".to_string()),
            rotate_loading_phrases: Some(false),
            rotation_interval_ms: None,
        };
        App::new(&config, tx).unwrap()
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c))).unwrap();
        }
    }

    #[tokio::test]
    async fn test_enter_sends_typed_question() {
        let mut app = app();
        type_text(&mut app, "2k1 nam");
        assert_eq!(app.session.input().text(), "2k1 nam");

        handle_event(&mut app, key(KeyCode::Enter)).unwrap();

        assert!(app.session.is_pending());
        assert_eq!(app.session.input().text(), "");
        let last = app.session.transcript().last().unwrap();
        assert_eq!(last.message.role, ChatRole::User);
        assert_eq!(last.message.content, "2k1 nam");

        // Typing is ignored until the reply settles
        type_text(&mut app, "x");
        assert_eq!(app.session.input().text(), "");
    }

    #[tokio::test]
    async fn test_enter_on_blank_input_does_nothing() {
        let mut app = app();
        type_text(&mut app, "   ");
        handle_event(&mut app, key(KeyCode::Enter)).unwrap();
        assert!(!app.session.is_pending());
        assert_eq!(app.session.transcript().len(), 1);
    }

    #[test]
    fn test_q_only_quits_outside_the_input() {
        let mut app = app();
        handle_event(&mut app, key(KeyCode::Char('q'))).unwrap();
        assert!(!app.should_quit);
        assert_eq!(app.session.input().text(), "q");

        handle_event(&mut app, key(KeyCode::Esc)).unwrap();
        assert!(!app.session.input().is_focused());
        handle_event(&mut app, key(KeyCode::Char('q'))).unwrap();
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_from_input() {
        let mut app = app();
        handle_event(&mut app, ctrl('c')).unwrap();
        assert!(app.should_quit);
    }

    #[test]
    fn test_function_keys_prefill_suggestions() {
        let mut app = app();
        handle_event(&mut app, key(KeyCode::Esc)).unwrap();
        handle_event(&mut app, key(KeyCode::F(2))).unwrap();
        assert!(app.session.input().is_focused());
        assert!(app.session.input().text().contains("1995"));
    }

    #[test]
    fn test_tab_toggles_focus() {
        let mut app = app();
        handle_event(&mut app, key(KeyCode::Tab)).unwrap();
        assert!(!app.session.input().is_focused());
        handle_event(&mut app, key(KeyCode::Tab)).unwrap();
        assert!(app.session.input().is_focused());
    }
}
