use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Quit,
    /// Pointer press at a terminal cell.
    Click { col: u16, row: u16 },
    /// Press at the middle of the screen (keyboard stand-in for a click).
    ClickCentre,
    Pointer { col: u16, row: u16 },
    ToggleAudio,
    OpenPremium,
    ToggleSparkles,
    Visibility(bool),
    Resize { cols: u16, rows: u16 },
}

pub(crate) fn collect_input_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<Event>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        out.push(event::read()?);
        if out.len() >= 64 {
            break;
        }
    }
    Ok(out)
}

pub(crate) fn map_event(ev: &Event) -> Option<Action> {
    match ev {
        Event::Key(k) => map_key(k),
        Event::Mouse(m) => map_mouse(m),
        Event::FocusLost => Some(Action::Visibility(false)),
        Event::FocusGained => Some(Action::Visibility(true)),
        Event::Resize(cols, rows) => Some(Action::Resize {
            cols: *cols,
            rows: *rows,
        }),
        _ => None,
    }
}

fn map_key(k: &KeyEvent) -> Option<Action> {
    if k.kind == KeyEventKind::Release {
        return None;
    }
    if k.modifiers.contains(KeyModifiers::CONTROL) && matches!(k.code, KeyCode::Char('c')) {
        return Some(Action::Quit);
    }
    match k.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char(' ') | KeyCode::Enter => Some(Action::ClickCentre),
        KeyCode::Char('m') | KeyCode::Char('M') => Some(Action::ToggleAudio),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(Action::OpenPremium),
        KeyCode::Char('s') | KeyCode::Char('S') => Some(Action::ToggleSparkles),
        _ => None,
    }
}

fn map_mouse(m: &MouseEvent) -> Option<Action> {
    let (col, row) = (m.column, m.row);
    match m.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Action::Click { col, row }),
        MouseEventKind::Moved | MouseEventKind::Drag(_) => Some(Action::Pointer { col, row }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(map_event(&key(KeyCode::Char('q'))), Some(Action::Quit));
        assert_eq!(map_event(&key(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(map_event(&key(KeyCode::Char('m'))), Some(Action::ToggleAudio));
        assert_eq!(map_event(&key(KeyCode::Char('P'))), Some(Action::OpenPremium));
        assert_eq!(map_event(&key(KeyCode::Char(' '))), Some(Action::ClickCentre));
        assert_eq!(map_event(&key(KeyCode::Char('z'))), None);
    }

    #[test]
    fn key_release_is_ignored() {
        let ev = Event::Key(KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert_eq!(map_event(&ev), None);
    }

    #[test]
    fn mouse_and_focus() {
        assert_eq!(
            map_event(&mouse(MouseEventKind::Down(MouseButton::Left), 4, 7)),
            Some(Action::Click { col: 4, row: 7 })
        );
        assert_eq!(
            map_event(&mouse(MouseEventKind::Moved, 1, 2)),
            Some(Action::Pointer { col: 1, row: 2 })
        );
        assert_eq!(map_event(&mouse(MouseEventKind::ScrollUp, 1, 2)), None);
        assert_eq!(map_event(&Event::FocusLost), Some(Action::Visibility(false)));
        assert_eq!(map_event(&Event::FocusGained), Some(Action::Visibility(true)));
        assert_eq!(
            map_event(&Event::Resize(80, 24)),
            Some(Action::Resize { cols: 80, rows: 24 })
        );
    }
}
