//! Decoded input events delivered by the host event loop.
//!
//! The platform input model lives outside this crate. Hosts translate
//! whatever their backend produces (touch panels, gamepads, keyboards) into
//! these device events before feeding them to a view controller.

use crate::geom::{Dir, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerStatus {
    Down,
    Motion,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonStatus {
    Pressed,
    Released,
    Repeated,
}

/// Logical controls of an emulator front-end: a d-pad, two action buttons
/// and the menu toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonCode {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Cancel,
    Menu,
}

impl ButtonCode {
    /// Direction of travel for d-pad codes, `None` for action buttons.
    pub fn direction(self) -> Option<Dir> {
        match self {
            ButtonCode::Up => Some(Dir::North),
            ButtonCode::Down => Some(Dir::South),
            ButtonCode::Left => Some(Dir::West),
            ButtonCode::Right => Some(Dir::East),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum DeviceEvent {
    Finger {
        id: i32,
        status: FingerStatus,
        position: Point,
    },
    Button {
        code: ButtonCode,
        status: ButtonStatus,
    },
}
