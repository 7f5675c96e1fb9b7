use crate::model::Room;
use crate::sim::PetAction;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum UiAction {
    Pet(PetAction),
    Room(Room),
    NextRoom,
    HelpToggle,
    Quit,
}

#[derive(Clone, Debug)]
pub(crate) struct InputEvent {
    pub(crate) key: KeyCode,
    pub(crate) mods: KeyModifiers,
}

pub(crate) fn collect_input_nonblocking(
    max_frame_time: Duration,
) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        if let Event::Key(k) = event::read()? {
            // repeats are dropped: holding a key is not a second press
            if k.kind == KeyEventKind::Press {
                out.push(InputEvent {
                    key: k.code,
                    mods: k.modifiers,
                });
                if out.len() >= 32 {
                    break;
                }
            }
        }
    }
    Ok(out)
}

pub(crate) fn map_event_to_action(help_open: bool, ev: &InputEvent) -> Option<UiAction> {
    if matches!(ev.key, KeyCode::Char('c') | KeyCode::Char('C'))
        && ev.mods.contains(KeyModifiers::CONTROL)
    {
        return Some(UiAction::Quit);
    }
    match ev.key {
        KeyCode::Char('q') | KeyCode::Char('Q') => return Some(UiAction::Quit),
        KeyCode::Char('h') | KeyCode::Char('H') => return Some(UiAction::HelpToggle),
        KeyCode::Esc if help_open => return Some(UiAction::HelpToggle),
        KeyCode::Esc => return Some(UiAction::Quit),
        _ => {}
    }
    if help_open {
        return None;
    }

    match ev.key {
        KeyCode::Char('f') | KeyCode::Char('F') => Some(UiAction::Pet(PetAction::Feed)),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(UiAction::Pet(PetAction::Play)),
        KeyCode::Char('s') | KeyCode::Char('S') => Some(UiAction::Pet(PetAction::Sleep)),
        KeyCode::Char('1') => Some(UiAction::Room(Room::Bedroom)),
        KeyCode::Char('2') => Some(UiAction::Room(Room::Kitchen)),
        KeyCode::Char('3') => Some(UiAction::Room(Room::Living)),
        KeyCode::Tab => Some(UiAction::NextRoom),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> InputEvent {
        InputEvent {
            key: code,
            mods: KeyModifiers::NONE,
        }
    }

    #[test]
    fn action_keys() {
        assert_eq!(
            map_event_to_action(false, &key(KeyCode::Char('f'))),
            Some(UiAction::Pet(PetAction::Feed))
        );
        assert_eq!(
            map_event_to_action(false, &key(KeyCode::Char('P'))),
            Some(UiAction::Pet(PetAction::Play))
        );
        assert_eq!(
            map_event_to_action(false, &key(KeyCode::Char('s'))),
            Some(UiAction::Pet(PetAction::Sleep))
        );
    }

    #[test]
    fn room_keys() {
        assert_eq!(
            map_event_to_action(false, &key(KeyCode::Char('2'))),
            Some(UiAction::Room(Room::Kitchen))
        );
        assert_eq!(
            map_event_to_action(false, &key(KeyCode::Tab)),
            Some(UiAction::NextRoom)
        );
    }

    #[test]
    fn help_swallows_actions() {
        assert_eq!(map_event_to_action(true, &key(KeyCode::Char('f'))), None);
        assert_eq!(
            map_event_to_action(true, &key(KeyCode::Esc)),
            Some(UiAction::HelpToggle)
        );
        assert_eq!(
            map_event_to_action(true, &key(KeyCode::Char('q'))),
            Some(UiAction::Quit)
        );
    }

    #[test]
    fn ctrl_c_quits() {
        let ev = InputEvent {
            key: KeyCode::Char('c'),
            mods: KeyModifiers::CONTROL,
        };
        assert_eq!(map_event_to_action(false, &ev), Some(UiAction::Quit));
        assert_eq!(map_event_to_action(false, &key(KeyCode::Char('c'))), None);
    }
}
