//! Raw report decoding.
//!
//! [`ReportDecoder`] turns one raw report plus the previous working state into
//! the next working state. It is a pure function of `(spec, previous state,
//! report bytes, timestamp)`: the caller supplies the clock reading, so the
//! same inputs always produce the same output.
//!
//! ## Publish rule
//! Translation and rotation always arrive as a back-to-back pair. Decoding the
//! first half updates the working state silently ([`DecodeEvent::Partial`]);
//! decoding the report on the device's [`motion_channel`](DeviceSpec::motion_channel)
//! returns [`DecodeEvent::Motion`], which the session turns into a published
//! snapshot. Button reports return [`DecodeEvent::Buttons`] independently.
//!
//! ## Malformed reports
//! Lengths are checked before anything is written. A short report returns
//! [`SpaceMouseError::MalformedReport`] and leaves the state untouched.

use crate::error::{Result, SpaceMouseError};
use crate::event::{Axis, Channel, DecodeEvent};
use crate::registry::DeviceSpec;
use crate::snapshot::MotionState;

/// Two bytes, little-endian, two's complement.
#[inline]
pub fn to_int16(lo: u8, hi: u8) -> i16 {
    i16::from_le_bytes([lo, hi])
}

#[derive(Clone, Debug)]
pub struct ReportDecoder {
    spec: DeviceSpec,
    motion_channel: Channel,
}

impl ReportDecoder {
    pub fn new(spec: DeviceSpec) -> Self {
        let motion_channel = spec.motion_channel();
        Self {
            spec,
            motion_channel,
        }
    }

    pub fn spec(&self) -> &DeviceSpec {
        &self.spec
    }

    /// Fresh working state sized for this device's buttons.
    pub fn initial_state(&self) -> MotionState {
        MotionState::new(self.spec.buttons.len())
    }

    /// Apply `report` to `state` in place.
    ///
    /// `timestamp` is written on every non-empty report that is not rejected,
    /// unknown channels included. An empty report (read timeout) changes nothing.
    pub fn decode_into(
        &self,
        state: &mut MotionState,
        report: &[u8],
        timestamp: f64,
    ) -> Result<DecodeEvent> {
        let Some(&channel_id) = report.first() else {
            return Ok(DecodeEvent::Idle);
        };
        let Some(channel) = Channel::from_id(channel_id) else {
            state.t = timestamp;
            return Ok(DecodeEvent::Ignored(channel_id));
        };

        if let Some(needed) = self.spec.required_len(channel) {
            if report.len() < needed {
                return Err(SpaceMouseError::MalformedReport {
                    channel: channel_id,
                    needed,
                    actual: report.len(),
                });
            }
        }

        state.t = timestamp;

        if channel == Channel::Buttons {
            for (index, mapping) in self.spec.buttons.iter().enumerate() {
                let byte = report.get(mapping.byte).copied().unwrap_or(0);
                state.buttons.set(index, (byte >> mapping.bit) & 1 == 1);
            }
            return Ok(DecodeEvent::Buttons);
        }

        for (axis, mapping) in self.spec.axes.iter() {
            if mapping.channel != channel {
                continue;
            }
            if let (Some(&lo), Some(&hi)) = (report.get(mapping.byte1), report.get(mapping.byte2)) {
                let raw = f64::from(to_int16(lo, hi));
                state.set_axis(axis, mapping.sign.factor() * raw / self.spec.axis_scale);
            }
        }

        if channel == self.motion_channel {
            Ok(DecodeEvent::Motion)
        } else {
            Ok(DecodeEvent::Partial)
        }
    }

    /// Functional form: returns the next state without touching `previous`.
    pub fn decode(
        &self,
        previous: &MotionState,
        report: &[u8],
        timestamp: f64,
    ) -> Result<(MotionState, DecodeEvent)> {
        let mut next = previous.clone();
        let event = self.decode_into(&mut next, report, timestamp)?;
        Ok((next, event))
    }
}

/// Build the raw report for `channel` from raw (unscaled, unsigned-by-mapping)
/// 16-bit axis values, indexed like [`Axis::ALL`]. Axes mapped elsewhere are skipped.
pub fn encode_axes(spec: &DeviceSpec, channel: Channel, raw: [i16; 6]) -> Vec<u8> {
    let len = spec.required_len(channel).unwrap_or(1);
    let mut report = vec![0u8; len];
    report[0] = channel.id();
    for (axis, mapping) in spec.axes.iter() {
        if mapping.channel != channel {
            continue;
        }
        let [lo, hi] = raw[axis_index(axis)].to_le_bytes();
        report[mapping.byte1] = lo;
        report[mapping.byte2] = hi;
    }
    report
}

/// Build a buttons-channel report with `pressed[i]` at mapping `i`.
pub fn encode_buttons(spec: &DeviceSpec, pressed: &[bool]) -> Vec<u8> {
    let len = spec.required_len(Channel::Buttons).unwrap_or(1);
    let mut report = vec![0u8; len];
    report[0] = Channel::Buttons.id();
    for (mapping, _) in spec
        .buttons
        .iter()
        .zip(pressed.iter())
        .filter(|(_, &down)| down)
    {
        report[mapping.byte] |= 1 << mapping.bit;
    }
    report
}

/// Channels carrying axes for `spec`, in the order the device sends them.
pub fn axis_channels(spec: &DeviceSpec) -> Vec<Channel> {
    let mut channels: Vec<Channel> = spec.axes.iter().map(|(_, m)| m.channel).collect();
    channels.sort();
    channels.dedup();
    channels
}

fn axis_index(axis: Axis) -> usize {
    Axis::ALL.iter().position(|a| *a == axis).unwrap_or(0)
}
