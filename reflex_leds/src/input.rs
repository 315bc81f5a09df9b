use core::fmt;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::Direction;

pub const GAMEPAD_PAUSE_BUTTON: u8 = 9;
/// Face buttons: Y/△, X/□, B/○, A/×.
pub const GAMEPAD_DIRECTION_BUTTONS: [(u8, Direction); 4] = [
    (0, Direction::South),
    (1, Direction::East),
    (2, Direction::West),
    (3, Direction::North),
];

pub const RESET_KEY: &str = "r";
pub const PAUSE_KEY: &str = " ";

#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeySet { P1, P2 }

impl KeySet {
    pub const ALL: [KeySet; 2] = [KeySet::P1, KeySet::P2];

    pub fn keys(self) -> [(&'static str, Direction); 4] {
        match self {
            KeySet::P1 => [
                ("ArrowUp", Direction::North),
                ("ArrowLeft", Direction::West),
                ("ArrowRight", Direction::East),
                ("ArrowDown", Direction::South),
            ],
            KeySet::P2 => [
                ("w", Direction::North),
                ("a", Direction::West),
                ("d", Direction::East),
                ("s", Direction::South),
            ],
        }
    }

    pub fn direction_for(self, key: &str) -> Option<Direction> {
        self.keys().iter().find(|(k, _)| *k == key).map(|(_, d)| *d)
    }
}

/// Physical device a player is bound to.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ControlSource {
    Keyboard(KeySet),
    Gamepad(u32),
}

impl ControlSource {
    /// Every input this source claims on join.
    pub fn bindings(self) -> Vec<InputBinding> {
        match self {
            ControlSource::Keyboard(set) => set.keys().iter().map(|(k, _)| InputBinding::Key(k.to_string())).collect(),
            ControlSource::Gamepad(pad) => GAMEPAD_DIRECTION_BUTTONS
                .iter()
                .map(|(button, _)| InputBinding::PadButton { pad, button: *button })
                .collect(),
        }
    }

    /// The raw event this source emits for `direction`.
    pub fn raw_press(self, direction: Direction) -> RawInput {
        match self {
            ControlSource::Keyboard(set) => {
                let key = set.keys().iter().find(|(_, d)| *d == direction).map(|(k, _)| *k).unwrap_or_default();
                RawInput::key(key)
            }
            ControlSource::Gamepad(pad) => {
                let button = GAMEPAD_DIRECTION_BUTTONS.iter().find(|(_, d)| *d == direction).map(|(b, _)| *b).unwrap_or_default();
                RawInput::PadButton { pad, button }
            }
        }
    }
}

impl fmt::Display for ControlSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlSource::Keyboard(set) => write!(f, "Keyboard {:?}", set),
            ControlSource::Gamepad(pad) => write!(f, "Gamepad {}", pad),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InputBinding {
    Key(String),
    PadButton { pad: u32, button: u8 },
}

/// Raw event as delivered by the host (DOM-style key names, gamepad button indices).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum RawInput {
    Key { key: String, repeat: bool },
    PadButton { pad: u32, button: u8 },
}

impl RawInput {
    pub fn key(key: impl Into<String>) -> Self { RawInput::Key { key: key.into(), repeat: false } }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputAction {
    Direction { source: ControlSource, direction: Direction },
    TogglePause,
    Reset,
    Ignored,
}

/// Maps a raw event to what it means, independent of who has joined.
pub fn normalize(raw: &RawInput) -> InputAction {
    match raw {
        RawInput::Key { repeat: true, .. } => InputAction::Ignored,
        RawInput::Key { key, .. } => {
            if key == RESET_KEY { return InputAction::Reset; }
            if key == PAUSE_KEY { return InputAction::TogglePause; }
            KeySet::ALL
                .iter()
                .find_map(|set| set.direction_for(key).map(|direction| InputAction::Direction {
                    source: ControlSource::Keyboard(*set),
                    direction,
                }))
                .unwrap_or(InputAction::Ignored)
        }
        RawInput::PadButton { pad, button } => {
            if *button == GAMEPAD_PAUSE_BUTTON { return InputAction::TogglePause; }
            GAMEPAD_DIRECTION_BUTTONS
                .iter()
                .find(|(b, _)| b == button)
                .map(|(_, direction)| InputAction::Direction { source: ControlSource::Gamepad(*pad), direction: *direction })
                .unwrap_or(InputAction::Ignored)
        }
    }
}

/// Turns polled gamepad button levels into press events (rising edges only).
#[derive(Debug, Default, Clone)]
pub struct PadEdgeDetector {
    last: HashMap<u32, Vec<bool>>,
}

impl PadEdgeDetector {
    pub fn new() -> Self { Self::default() }

    pub fn poll(&mut self, pad: u32, pressed: &[bool]) -> Vec<RawInput> {
        let prev = self.last.get(&pad);
        let was = |i: usize| prev.and_then(|p| p.get(i)).copied().unwrap_or(false);
        let is = |i: usize| pressed.get(i).copied().unwrap_or(false);

        let mut events = Vec::new();
        let pause = usize::from(GAMEPAD_PAUSE_BUTTON);
        if is(pause) && !was(pause) {
            events.push(RawInput::PadButton { pad, button: GAMEPAD_PAUSE_BUTTON });
        }
        for (button, _) in GAMEPAD_DIRECTION_BUTTONS {
            let i = usize::from(button);
            if is(i) && !was(i) {
                events.push(RawInput::PadButton { pad, button });
            }
        }
        self.last.insert(pad, pressed.to_vec());
        events
    }

    pub fn disconnect(&mut self, pad: u32) { self.last.remove(&pad); }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_sets_map_to_directions() {
        assert_eq!(
            normalize(&RawInput::key("ArrowLeft")),
            InputAction::Direction { source: ControlSource::Keyboard(KeySet::P1), direction: Direction::West }
        );
        assert_eq!(
            normalize(&RawInput::key("s")),
            InputAction::Direction { source: ControlSource::Keyboard(KeySet::P2), direction: Direction::South }
        );
        assert_eq!(normalize(&RawInput::key("q")), InputAction::Ignored);
    }

    #[test]
    fn commands_and_repeats() {
        assert_eq!(normalize(&RawInput::key("r")), InputAction::Reset);
        assert_eq!(normalize(&RawInput::key(" ")), InputAction::TogglePause);
        assert_eq!(
            normalize(&RawInput::Key { key: "ArrowUp".into(), repeat: true }),
            InputAction::Ignored
        );
    }

    #[test]
    fn gamepad_buttons() {
        assert_eq!(
            normalize(&RawInput::PadButton { pad: 2, button: 3 }),
            InputAction::Direction { source: ControlSource::Gamepad(2), direction: Direction::North }
        );
        assert_eq!(normalize(&RawInput::PadButton { pad: 0, button: 9 }), InputAction::TogglePause);
        assert_eq!(normalize(&RawInput::PadButton { pad: 0, button: 5 }), InputAction::Ignored);
    }

    #[test]
    fn edge_detector_emits_only_rising_edges() {
        let mut pads = PadEdgeDetector::new();
        let mut levels = vec![false; 10];
        levels[1] = true;
        assert_eq!(pads.poll(0, &levels), vec![RawInput::PadButton { pad: 0, button: 1 }]);
        // held: nothing new
        assert!(pads.poll(0, &levels).is_empty());
        levels[1] = false;
        assert!(pads.poll(0, &levels).is_empty());
        levels[1] = true;
        levels[9] = true;
        assert_eq!(
            pads.poll(0, &levels),
            vec![RawInput::PadButton { pad: 0, button: 9 }, RawInput::PadButton { pad: 0, button: 1 }]
        );
    }

    #[test]
    fn bindings_cover_whole_source() {
        assert_eq!(ControlSource::Keyboard(KeySet::P2).bindings().len(), 4);
        assert!(ControlSource::Gamepad(1)
            .bindings()
            .contains(&InputBinding::PadButton { pad: 1, button: 0 }));
        assert_eq!(ControlSource::Gamepad(1).to_string(), "Gamepad 1");
    }
}
