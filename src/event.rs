//! Channels, axes, and decode outcomes.
//!
//! A raw report starts with a channel byte naming the group of values it
//! carries. Split-channel devices send translation and rotation as two
//! back-to-back reports; combined-channel devices put all six axes on the
//! translation channel.
//!
//! ## Channel ids
//! - `1` = translation (x, y, z), or all six axes on combined-channel devices
//! - `2` = rotation (pitch, roll, yaw)
//! - `3` = buttons

use serde::Serialize;
use std::fmt;

/// Report channel identifier (`report[0]`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[repr(u8)]
pub enum Channel {
    Translation = 1,
    Rotation = 2,
    Buttons = 3,
}

impl Channel {
    pub const fn id(self) -> u8 {
        self as u8
    }

    pub const fn from_id(id: u8) -> Option<Channel> {
        match id {
            1 => Some(Channel::Translation),
            2 => Some(Channel::Rotation),
            3 => Some(Channel::Buttons),
            _ => None,
        }
    }
}

/// One of the six motion axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
    Roll,
    Pitch,
    Yaw,
}

impl Axis {
    pub const ALL: [Axis; 6] = [Axis::X, Axis::Y, Axis::Z, Axis::Roll, Axis::Pitch, Axis::Yaw];

    pub const fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
            Axis::Roll => "roll",
            Axis::Pitch => "pitch",
            Axis::Yaw => "yaw",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a single decode step did to the working state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DecodeEvent {
    /// Empty report (read timed out). Nothing changed.
    Idle,
    /// Axes updated but the 6-DoF pair is not complete yet. Nothing published.
    Partial,
    /// The pair completed; a motion snapshot is published.
    Motion,
    /// Button states changed; a button snapshot is published.
    Buttons,
    /// Unknown channel id. Only the timestamp changed.
    Ignored(u8),
}

impl DecodeEvent {
    /// True when this step publishes a new snapshot.
    pub fn publishes(self) -> bool {
        matches!(self, DecodeEvent::Motion | DecodeEvent::Buttons)
    }
}
