use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, InputMode};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => app.scroll_to_bottom(),
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Reply { ticket, result } => app.apply_reply(ticket, result),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                app.should_quit = true;
                return;
            }
            KeyCode::Char('n') => {
                app.new_chat();
                return;
            }
            _ => {}
        }
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,

        KeyCode::Char('i') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
        }

        KeyCode::Char('n') => app.new_chat(),

        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::PageDown => app.scroll_down(app.chat_height.max(1)),
        KeyCode::PageUp => app.scroll_up(app.chat_height.max(1)),
        KeyCode::Char('g') => app.chat_scroll = 0,
        KeyCode::Char('G') => app.scroll_to_bottom(),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => app.send_input(),
        KeyCode::Backspace => app.view.input_mut().backspace(),
        KeyCode::Delete => app.view.input_mut().delete(),
        KeyCode::Left => app.view.input_mut().move_left(),
        KeyCode::Right => app.view.input_mut().move_right(),
        KeyCode::Home => app.view.input_mut().move_home(),
        KeyCode::End => app.view.input_mut().move_end(),
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(app.chat_height.max(1)),
        KeyCode::PageDown => app.scroll_down(app.chat_height.max(1)),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.view.input_mut().insert(c)
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
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
        MouseEventKind::ScrollDown => app.scroll_down(3),
        MouseEventKind::ScrollUp => app.scroll_up(3),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use tokio::sync::mpsc;
    use trendspotter_core::{ChatClient, Phase};

    fn test_app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(ChatClient::new("http://127.0.0.1:9/chat"), tx), rx)
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn ctrl(c: char) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c)));
        }
    }

    #[tokio::test]
    async fn test_typing_and_enter_submits() {
        let (mut app, _rx) = test_app();
        type_text(&mut app, "helo");
        handle_event(&mut app, key(KeyCode::Left));
        handle_event(&mut app, key(KeyCode::Char('l')));
        assert_eq!(app.view.input().text(), "hello");

        handle_event(&mut app, key(KeyCode::Enter));

        assert_eq!(app.view.phase(), Phase::Sending);
        assert_eq!(app.view.messages()[0].content, "hello");
        assert!(app.view.input().is_empty());
    }

    #[tokio::test]
    async fn test_enter_while_sending_keeps_draft() {
        let (mut app, _rx) = test_app();
        type_text(&mut app, "first");
        handle_event(&mut app, key(KeyCode::Enter));

        type_text(&mut app, "second");
        handle_event(&mut app, key(KeyCode::Enter));

        assert_eq!(app.view.messages().len(), 1);
        assert_eq!(app.view.input().text(), "second");
    }

    #[tokio::test]
    async fn test_ctrl_n_starts_new_chat() {
        let (mut app, _rx) = test_app();
        type_text(&mut app, "hello");
        handle_event(&mut app, key(KeyCode::Enter));
        type_text(&mut app, "draft");

        handle_event(&mut app, ctrl('n'));

        assert!(app.view.messages().is_empty());
        assert!(app.view.input().is_empty());
        assert_eq!(app.view.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_control_chords_do_not_type() {
        let (mut app, _rx) = test_app();
        type_text(&mut app, "hi");

        handle_event(&mut app, ctrl('a'));
        handle_event(&mut app, ctrl('w'));

        assert_eq!(app.view.input().text(), "hi");
        assert!(!app.should_quit);
    }

    #[test]
    fn test_quit_keys() {
        let (mut app, _rx) = test_app();
        handle_event(&mut app, ctrl('c'));
        assert!(app.should_quit);

        let (mut app, _rx) = test_app();
        handle_event(&mut app, key(KeyCode::Esc));
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(!app.should_quit);
        handle_event(&mut app, key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_mouse_scroll_outside_chat_is_ignored() {
        let (mut app, _rx) = test_app();
        app.chat_scroll = 5;
        app.chat_area = Some(Rect::new(0, 1, 40, 10));

        handle_event(
            &mut app,
            AppEvent::Mouse(MouseEvent {
                kind: MouseEventKind::ScrollUp,
                column: 50,
                row: 3,
                modifiers: KeyModifiers::NONE,
            }),
        );
        assert_eq!(app.chat_scroll, 5);

        handle_event(
            &mut app,
            AppEvent::Mouse(MouseEvent {
                kind: MouseEventKind::ScrollUp,
                column: 10,
                row: 3,
                modifiers: KeyModifiers::NONE,
            }),
        );
        assert_eq!(app.chat_scroll, 2);
    }
}
