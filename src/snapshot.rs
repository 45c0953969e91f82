//! Decoded 6-DoF + button snapshot.
//!
//! [`MotionState`] is an **owned** value. The session keeps one working copy
//! that the decoder mutates in place and hands out clones at publish time,
//! so a consumer never observes a state the next report is still writing.
//!
//! # Value conventions
//! - `t` is monotonic seconds since the session was created.
//! - Axes are `raw / axis_scale`, sign-adjusted. With the usual scale of
//!   `350.0` resting values sit in roughly `[-1, 1]`, but the full 16-bit
//!   range maps to about `[-93.6, 91.1]`. Values are **not** clamped.
//! - Axes are not synchronized across channels: each holds the latest sample
//!   from whichever report carried it.

use crate::event::Axis;
use serde::Serialize;
use std::fmt;

/// Button states in mapping order (index `i` is `DeviceSpec::buttons[i]`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ButtonState(Vec<bool>);

impl ButtonState {
    /// All buttons released.
    pub fn released(count: usize) -> Self {
        ButtonState(vec![false; count])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// State of one button; `false` for out-of-range indices.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        self.0.get(index).copied().unwrap_or(false)
    }

    pub(crate) fn set(&mut self, index: usize, pressed: bool) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = pressed;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    /// Buttons packed into an integer, read as a big-endian bit string:
    /// the first button lands in the most significant used bit.
    pub fn mask(&self) -> u64 {
        self.0
            .iter()
            .fold(0u64, |acc, &pressed| (acc << 1) | u64::from(pressed))
    }
}

impl From<Vec<bool>> for ButtonState {
    fn from(v: Vec<bool>) -> Self {
        ButtonState(v)
    }
}

/// One decoded snapshot.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MotionState {
    pub t: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub buttons: ButtonState,
}

impl MotionState {
    /// Zeroed state with `button_count` released buttons.
    pub fn new(button_count: usize) -> Self {
        MotionState {
            t: 0.0,
            x: 0.0,
            y: 0.0,
            z: 0.0,
            roll: 0.0,
            pitch: 0.0,
            yaw: 0.0,
            buttons: ButtonState::released(button_count),
        }
    }

    pub fn axis(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
            Axis::Roll => self.roll,
            Axis::Pitch => self.pitch,
            Axis::Yaw => self.yaw,
        }
    }

    pub(crate) fn set_axis(&mut self, axis: Axis, value: f64) {
        let slot = match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
            Axis::Roll => &mut self.roll,
            Axis::Pitch => &mut self.pitch,
            Axis::Yaw => &mut self.yaw,
        };
        *slot = value;
    }
}

/// Single line, e.g. `    t +1.25     x +0.29     y -0.03 ...` (buttons omitted).
impl fmt::Display for MotionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>5} {:+.2}", "t", self.t)?;
        for axis in Axis::ALL {
            write!(f, " {:>5} {:+.2}", axis.name(), self.axis(axis))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_puts_first_button_high() {
        let b = ButtonState::from(vec![true, false, false]);
        assert_eq!(b.mask(), 0b100);
        let b = ButtonState::from(vec![false, true, true]);
        assert_eq!(b.mask(), 0b011);
        assert_eq!(ButtonState::released(21).mask(), 0);
    }

    #[test]
    fn out_of_range_button_is_released() {
        let mut b = ButtonState::released(2);
        b.set(5, true);
        assert!(!b.get(5));
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn display_skips_buttons() {
        let mut s = MotionState::new(2);
        s.x = 0.2857;
        s.yaw = -1.0;
        let line = s.to_string();
        assert!(line.starts_with("    t +0.00     x +0.29"));
        assert!(line.ends_with("  yaw -1.00"));
        assert!(!line.contains("buttons"));
    }

    #[test]
    fn serializes_buttons_as_list() {
        let mut s = MotionState::new(2);
        s.buttons.set(1, true);
        let json = serde_json::to_value(&s).expect("serialize");
        assert_eq!(json["buttons"], serde_json::json!([false, true]));
    }
}
