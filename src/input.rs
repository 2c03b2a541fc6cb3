//! Keyboard input with DAS (Delayed Auto Shift) and ARR (Auto Repeat Rate)
//!
//! Uses a polling-based approach that doesn't rely on key release events,
//! which are unreliable on Linux terminals.

use crate::game::Command;
use crate::settings::Settings;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, ModifierKeyCode};
use std::time::{Duration, Instant};
use tracing::warn;

/// Time after which we consider a key "released" if no repeat received
const KEY_TIMEOUT: Duration = Duration::from_millis(100);

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Command(Command),
    NewGame,
    Quit,
}

/// Input handler with DAS/ARR support
pub struct InputHandler {
    /// Held movement keys (for DAS)
    left_state: Option<KeyPressState>,
    right_state: Option<KeyPressState>,
    /// Last time the soft drop key was seen while held
    soft_drop_seen: Option<Instant>,
    /// Key bindings
    bindings: KeyBindings,
    /// DAS duration
    das: Duration,
    /// ARR duration
    arr: Duration,
}

#[derive(Debug, Clone)]
struct KeyPressState {
    first_press: Instant,
    last_seen: Instant,
    das_triggered: bool,
    last_arr: Option<Instant>,
}

impl KeyPressState {
    fn new(now: Instant) -> Self {
        Self {
            first_press: now,
            last_seen: now,
            das_triggered: false,
            last_arr: None,
        }
    }
}

/// Key bindings configuration - supports multiple keys per action
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub move_left: Vec<KeyCode>,
    pub move_right: Vec<KeyCode>,
    pub soft_drop: Vec<KeyCode>,
    pub hard_drop: Vec<KeyCode>,
    pub rotate: Vec<KeyCode>,
    pub rotate_cw: Vec<KeyCode>,
    pub new_game: Vec<KeyCode>,
    pub quit: Vec<KeyCode>,
}

impl KeyBindings {
    /// Parse a key string into KeyCode
    fn parse_key(s: &str) -> Option<KeyCode> {
        let lower = s.to_lowercase();
        let code = match lower.as_str() {
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "space" => KeyCode::Char(' '),
            "enter" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "backspace" => KeyCode::Backspace,
            "esc" | "escape" => KeyCode::Esc,
            "shift" => KeyCode::Modifier(ModifierKeyCode::LeftShift),
            "ctrl" | "control" => KeyCode::Modifier(ModifierKeyCode::LeftControl),
            "alt" => KeyCode::Modifier(ModifierKeyCode::LeftAlt),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return None,
                }
            }
        };
        Some(code)
    }

    /// Parse a list of key strings into KeyCodes
    fn parse_keys(keys: &[String]) -> Vec<KeyCode> {
        keys.iter()
            .filter_map(|s| {
                let code = Self::parse_key(s);
                if code.is_none() {
                    warn!("Ignoring unknown key binding '{}'", s);
                }
                code
            })
            .collect()
    }

    /// Create keybindings from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            move_left: Self::parse_keys(&settings.keys.move_left),
            move_right: Self::parse_keys(&settings.keys.move_right),
            soft_drop: Self::parse_keys(&settings.keys.soft_drop),
            hard_drop: Self::parse_keys(&settings.keys.hard_drop),
            rotate: Self::parse_keys(&settings.keys.rotate),
            rotate_cw: Self::parse_keys(&settings.keys.rotate_cw),
            new_game: Self::parse_keys(&settings.keys.new_game),
            quit: Self::parse_keys(&settings.keys.quit),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl InputHandler {
    pub fn new() -> Self {
        Self::from_settings(&Settings::default())
    }

    /// Create input handler from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            left_state: None,
            right_state: None,
            soft_drop_seen: None,
            bindings: KeyBindings::from_settings(settings),
            das: Duration::from_millis(settings.gameplay.das_ms),
            arr: Duration::from_millis(settings.gameplay.arr_ms),
        }
    }

    /// Handle a key press event - returns immediate actions
    pub fn key_down(&mut self, key: KeyEvent) -> Vec<Action> {
        self.key_down_at(key, Instant::now())
    }

    fn key_down_at(&mut self, key: KeyEvent, now: Instant) -> Vec<Action> {
        let mut actions = Vec::new();

        // Handle Ctrl+C for quit
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            actions.push(Action::Quit);
            return actions;
        }

        let code = normalize_key(key.code);
        let bindings = &self.bindings;

        if bindings.move_left.contains(&code) {
            match &mut self.left_state {
                Some(state) => state.last_seen = now,
                None => {
                    actions.push(Action::Command(Command::MoveLeft));
                    self.left_state = Some(KeyPressState::new(now));
                }
            }
            // Cancel opposite direction
            self.right_state = None;
        } else if bindings.move_right.contains(&code) {
            match &mut self.right_state {
                Some(state) => state.last_seen = now,
                None => {
                    actions.push(Action::Command(Command::MoveRight));
                    self.right_state = Some(KeyPressState::new(now));
                }
            }
            self.left_state = None;
        } else if bindings.soft_drop.contains(&code) {
            if self.soft_drop_seen.is_none() {
                actions.push(Action::Command(Command::SoftDropStart));
            }
            self.soft_drop_seen = Some(now);
        } else if bindings.hard_drop.contains(&code) {
            actions.push(Action::Command(Command::HardDrop));
        } else if bindings.rotate.contains(&code) {
            actions.push(Action::Command(Command::Rotate));
        } else if bindings.rotate_cw.contains(&code) {
            actions.push(Action::Command(Command::RotateClockwise));
        } else if bindings.new_game.contains(&code) {
            actions.push(Action::NewGame);
        } else if bindings.quit.contains(&code) {
            actions.push(Action::Quit);
        }

        actions
    }

    /// Handle a key release event (may not be called on Linux)
    pub fn key_up(&mut self, key: KeyEvent) -> Vec<Action> {
        let code = normalize_key(key.code);

        if self.bindings.move_left.contains(&code) {
            self.left_state = None;
        } else if self.bindings.move_right.contains(&code) {
            self.right_state = None;
        } else if self.bindings.soft_drop.contains(&code) && self.soft_drop_seen.take().is_some() {
            return vec![Action::Command(Command::SoftDropStop)];
        }
        Vec::new()
    }

    /// Update held keys and return repeat actions (call every frame)
    pub fn update(&mut self) -> Vec<Action> {
        self.update_at(Instant::now())
    }

    fn update_at(&mut self, now: Instant) -> Vec<Action> {
        let mut actions = Vec::new();

        // Check for timed-out keys (no recent key event = released)
        let timed_out = |seen: Instant| now.duration_since(seen) > KEY_TIMEOUT;
        if self.left_state.as_ref().is_some_and(|s| timed_out(s.last_seen)) {
            self.left_state = None;
        }
        if self.right_state.as_ref().is_some_and(|s| timed_out(s.last_seen)) {
            self.right_state = None;
        }
        if self.soft_drop_seen.is_some_and(timed_out) {
            self.soft_drop_seen = None;
            actions.push(Action::Command(Command::SoftDropStop));
        }

        let (das, arr) = (self.das, self.arr);
        if let Some(state) = &mut self.left_state {
            if process_das_arr(state, now, das, arr) {
                actions.push(Action::Command(Command::MoveLeft));
            }
        }
        if let Some(state) = &mut self.right_state {
            if process_das_arr(state, now, das, arr) {
                actions.push(Action::Command(Command::MoveRight));
            }
        }

        actions
    }

    /// Forget all held keys, releasing soft drop if it was held
    pub fn clear(&mut self) -> Vec<Action> {
        self.left_state = None;
        self.right_state = None;
        match self.soft_drop_seen.take() {
            Some(_) => vec![Action::Command(Command::SoftDropStop)],
            None => Vec::new(),
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Process DAS/ARR logic for a key state, returns true if should trigger action
fn process_das_arr(state: &mut KeyPressState, now: Instant, das: Duration, arr: Duration) -> bool {
    let held_duration = now.duration_since(state.first_press);

    if held_duration >= das {
        if !state.das_triggered {
            // First trigger after DAS
            state.das_triggered = true;
            state.last_arr = Some(now);
            return true;
        } else if let Some(last) = state.last_arr {
            if now.duration_since(last) >= arr {
                state.last_arr = Some(now);
                return true;
            }
        }
    }

    false
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn command(command: Command) -> Action {
        Action::Command(command)
    }

    #[test]
    fn test_parse_key_names() {
        assert_eq!(KeyBindings::parse_key("Left"), Some(KeyCode::Left));
        assert_eq!(KeyBindings::parse_key("space"), Some(KeyCode::Char(' ')));
        assert_eq!(KeyBindings::parse_key("x"), Some(KeyCode::Char('x')));
        assert_eq!(KeyBindings::parse_key("nonsense"), None);
        assert_eq!(KeyBindings::parse_key(""), None);
    }

    #[test]
    fn test_single_presses_map_to_commands() {
        let mut input = InputHandler::new();
        assert_eq!(input.key_down(key(KeyCode::Up)), vec![command(Command::Rotate)]);
        assert_eq!(
            input.key_down(key(KeyCode::Char('X'))),
            vec![command(Command::RotateClockwise)]
        );
        assert_eq!(input.key_down(key(KeyCode::Char(' '))), vec![command(Command::HardDrop)]);
        assert_eq!(input.key_down(key(KeyCode::Char('n'))), vec![Action::NewGame]);
        assert_eq!(input.key_down(key(KeyCode::Char('q'))), vec![Action::Quit]);
        assert_eq!(
            input.key_down(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            vec![Action::Quit]
        );
    }

    #[test]
    fn test_held_move_repeats_after_das() {
        let mut input = InputHandler::new();
        let start = Instant::now();
        assert_eq!(
            input.key_down_at(key(KeyCode::Left), start),
            vec![command(Command::MoveLeft)]
        );

        // Terminal key repeats keep the key alive
        let mut now = start;
        let mut repeats = 0;
        for _ in 0..6 {
            now += Duration::from_millis(50);
            assert!(input.key_down_at(key(KeyCode::Left), now).is_empty());
            repeats += input.update_at(now).len();
        }
        // 300ms held: DAS fires at 200ms, ARR again at 250 and 300
        assert_eq!(repeats, 3);
    }

    #[test]
    fn test_opposite_direction_cancels() {
        let mut input = InputHandler::new();
        let now = Instant::now();
        input.key_down_at(key(KeyCode::Left), now);
        assert_eq!(
            input.key_down_at(key(KeyCode::Right), now),
            vec![command(Command::MoveRight)]
        );
        assert!(input.left_state.is_none());
    }

    #[test]
    fn test_soft_drop_starts_once_and_stops_on_timeout() {
        let mut input = InputHandler::new();
        let start = Instant::now();
        assert_eq!(
            input.key_down_at(key(KeyCode::Down), start),
            vec![command(Command::SoftDropStart)]
        );
        assert!(input.key_down_at(key(KeyCode::Down), start + Duration::from_millis(40)).is_empty());
        assert!(input.update_at(start + Duration::from_millis(100)).is_empty());
        assert_eq!(
            input.update_at(start + Duration::from_millis(200)),
            vec![command(Command::SoftDropStop)]
        );
    }

    #[test]
    fn test_soft_drop_stops_on_release() {
        let mut input = InputHandler::new();
        input.key_down(key(KeyCode::Down));
        assert_eq!(input.key_up(key(KeyCode::Down)), vec![command(Command::SoftDropStop)]);
        assert!(input.key_up(key(KeyCode::Down)).is_empty());
        assert!(input.clear().is_empty());
    }
}
