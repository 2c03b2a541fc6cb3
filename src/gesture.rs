//! Pointer gestures to game commands
//!
//! A tap rotates. A horizontal pan drags the piece, scaled so a pan across
//! the whole view covers `PAN_SCALE` columns. Dragging down far enough holds
//! soft drop for the rest of the pan, and a fast downward flick on release
//! hard drops.

use crate::game::Command;
use std::time::Instant;

/// Columns covered by a pan across the full view width
pub const PAN_SCALE: f32 = 17.0;
/// Downward drag, in view units, that starts a soft drop
pub const SOFT_DROP_DRAG: f32 = 40.0;
/// Downward release speed, in view units per second, that hard drops
pub const HARD_DROP_VELOCITY: f32 = 1500.0;

/// Decoded gesture. Offsets and velocities are in view units, y pointing
/// down the screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Tap,
    PanBegan,
    /// Offset from where the pan began
    PanChanged { dx: f32, dy: f32 },
    PanEnded { velocity_y: f32 },
}

/// Turns gestures into engine commands
#[derive(Debug, Clone)]
pub struct GestureMapper {
    view_width: f32,
    soft_drop_drag: f32,
    hard_drop_velocity: f32,
    /// Piece x when the pan began
    pan_start_x: Option<f32>,
    soft_dropping: bool,
}

impl GestureMapper {
    pub fn new(view_width: f32) -> Self {
        Self::with_thresholds(view_width, SOFT_DROP_DRAG, HARD_DROP_VELOCITY)
    }

    pub fn with_thresholds(view_width: f32, soft_drop_drag: f32, hard_drop_velocity: f32) -> Self {
        Self {
            view_width: view_width.max(1.0),
            soft_drop_drag,
            hard_drop_velocity,
            pan_start_x: None,
            soft_dropping: false,
        }
    }

    pub fn set_view_width(&mut self, view_width: f32) {
        self.view_width = view_width.max(1.0);
    }

    /// Map one gesture. `piece_x` is the falling piece's origin x, if any.
    pub fn map(&mut self, gesture: Gesture, piece_x: Option<f32>) -> Vec<Command> {
        match gesture {
            Gesture::Tap => vec![Command::Rotate],
            Gesture::PanBegan => {
                self.pan_start_x = piece_x;
                self.soft_dropping = false;
                Vec::new()
            }
            Gesture::PanChanged { dx, dy } => {
                if self.soft_dropping {
                    return Vec::new();
                }
                if dy > self.soft_drop_drag {
                    self.soft_dropping = true;
                    return vec![Command::SoftDropStart];
                }

                let shift = dx * PAN_SCALE / self.view_width;
                let start = match (self.pan_start_x, piece_x) {
                    (Some(start), _) => start,
                    // Piece appeared mid-pan: anchor so it does not jump
                    (None, Some(x)) => *self.pan_start_x.insert(x - shift),
                    (None, None) => return Vec::new(),
                };
                vec![Command::MoveTo { x: start + shift }]
            }
            Gesture::PanEnded { velocity_y } => {
                let mut commands = Vec::new();
                if std::mem::take(&mut self.soft_dropping) {
                    commands.push(Command::SoftDropStop);
                }
                if velocity_y > self.hard_drop_velocity {
                    commands.push(Command::HardDrop);
                }
                self.pan_start_x = None;
                commands
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Press {
    start_x: f32,
    start_y: f32,
    last_y: f32,
    last_at: Instant,
    velocity_y: f32,
    panning: bool,
}

/// Raw pointer samples (mouse down, drag, up) to gestures
#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    /// Movement allowed before a press stops being a tap
    slop: f32,
    press: Option<Press>,
}

impl PointerTracker {
    pub fn new(slop: f32) -> Self {
        Self { slop, press: None }
    }

    pub fn press(&mut self, x: f32, y: f32, at: Instant) {
        self.press = Some(Press {
            start_x: x,
            start_y: y,
            last_y: y,
            last_at: at,
            velocity_y: 0.0,
            panning: false,
        });
    }

    pub fn drag(&mut self, x: f32, y: f32, at: Instant) -> Vec<Gesture> {
        let slop = self.slop;
        let Some(press) = self.press.as_mut() else {
            return Vec::new();
        };
        press.sample(y, at);

        let dx = x - press.start_x;
        let dy = y - press.start_y;
        let mut gestures = Vec::new();
        if !press.panning {
            if dx.abs() <= slop && dy.abs() <= slop {
                return gestures;
            }
            press.panning = true;
            gestures.push(Gesture::PanBegan);
        }
        gestures.push(Gesture::PanChanged { dx, dy });
        gestures
    }

    pub fn release(&mut self, x: f32, y: f32, at: Instant) -> Vec<Gesture> {
        let mut gestures = self.drag(x, y, at);
        let Some(press) = self.press.take() else {
            return gestures;
        };
        gestures.push(if press.panning {
            Gesture::PanEnded {
                velocity_y: press.velocity_y,
            }
        } else {
            Gesture::Tap
        });
        gestures
    }

    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }
}

impl Press {
    fn sample(&mut self, y: f32, at: Instant) {
        let dt = at.saturating_duration_since(self.last_at).as_secs_f32();
        if dt > 0.0 {
            self.velocity_y = (y - self.last_y) / dt;
            self.last_y = y;
            self.last_at = at;
        } else if y != self.last_y {
            // Same instant: keep the direction, not a made-up speed
            self.last_y = y;
        }
    }
}
