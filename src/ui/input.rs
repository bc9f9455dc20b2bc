/// Keyboard input.
///
/// Reads crossterm's async event stream and turns each key press into a
/// `MoveCharacter` proposal. Only Press events count; Repeat and Release
/// are ignored so one physical press is one step.
///
/// Keys:
///   Arrows / WASD   move
///   Esc / Q         quit
///   Ctrl+C          quit

use std::io;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use tracing::debug;

use crate::sim::proposal::{Proposal, ProposalSender};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Command {
    Move { dx: i32, dy: i32 },
    Quit,
}

pub fn map_key(key: KeyEvent) -> Option<Command> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }
    let (dx, dy) = match key.code {
        KeyCode::Esc => return Some(Command::Quit),
        KeyCode::Char(c) if c.eq_ignore_ascii_case(&'q') => return Some(Command::Quit),
        KeyCode::Up => (0, -1),
        KeyCode::Down => (0, 1),
        KeyCode::Left => (-1, 0),
        KeyCode::Right => (1, 0),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' => (0, -1),
            's' => (0, 1),
            'a' => (-1, 0),
            'd' => (1, 0),
            _ => return None,
        },
        _ => return None,
    };
    Some(Command::Move { dx, dy })
}

/// Forward key presses until a quit key or the end of the event stream.
/// Moves sent after the game has ended are simply dropped.
pub async fn run(proposals: ProposalSender) -> io::Result<()> {
    let mut events = EventStream::new();
    while let Some(event) = events.next().await {
        let Event::Key(key) = event? else { continue };
        match map_key(key) {
            Some(Command::Quit) => {
                debug!("quit requested");
                return Ok(());
            }
            Some(Command::Move { dx, dy }) => {
                let _ = proposals.send(Proposal::MoveCharacter { dx, dy });
            }
            None => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrows_and_wasd_move() {
        assert_eq!(map_key(press(KeyCode::Up)), Some(Command::Move { dx: 0, dy: -1 }));
        assert_eq!(map_key(press(KeyCode::Char('s'))), Some(Command::Move { dx: 0, dy: 1 }));
        assert_eq!(map_key(press(KeyCode::Char('A'))), Some(Command::Move { dx: -1, dy: 0 }));
        assert_eq!(map_key(press(KeyCode::Right)), Some(Command::Move { dx: 1, dy: 0 }));
    }

    #[test]
    fn quit_keys() {
        assert_eq!(map_key(press(KeyCode::Esc)), Some(Command::Quit));
        assert_eq!(map_key(press(KeyCode::Char('q'))), Some(Command::Quit));
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl_c), Some(Command::Quit));
    }

    #[test]
    fn releases_and_other_keys_are_ignored() {
        let release = KeyEvent {
            code: KeyCode::Up,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(map_key(release), None);
        assert_eq!(map_key(press(KeyCode::Char('x'))), None);
        assert_eq!(map_key(press(KeyCode::Enter)), None);
    }
}
