//! Known device models and their report layouts.
//!
//! The registry is a closed, hand-curated table keyed by marketing name.
//! Each [`DeviceSpec`] says where every axis and button lives in the raw
//! reports of that model. Entries are `'static` and never mutated; a session
//! works on its own clone.
//!
//! ## Layouts
//! Every known model uses little-endian 16-bit axis values right after the
//! channel byte. Two layouts exist:
//! - **split**: translation on channel 1 (bytes 1..=6), rotation on channel 2 (bytes 1..=6)
//! - **combined**: all six axes on channel 1 (bytes 1..=12)

use crate::error::{Result, SpaceMouseError};
use crate::event::{Axis, Channel};
use serde::Serialize;

/// Scale that maps the device's nominal deflection to about `[-1, 1]`.
pub const DEFAULT_AXIS_SCALE: f64 = 350.0;

/// HID usage pair for the device LED (page 0x08 LEDs, usage 0x4B generic indicator).
pub const DEFAULT_LED_USAGE: (u16, u16) = (0x08, 0x4B);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Sign {
    Positive,
    Negative,
}

impl Sign {
    #[inline]
    pub const fn factor(self) -> f64 {
        match self {
            Sign::Positive => 1.0,
            Sign::Negative => -1.0,
        }
    }
}

/// Where one axis lives: `report[byte1]` is the low byte, `report[byte2]` the high byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AxisMapping {
    pub channel: Channel,
    pub byte1: usize,
    pub byte2: usize,
    pub sign: Sign,
}

impl AxisMapping {
    pub const fn new(channel: Channel, byte1: usize, byte2: usize, sign: Sign) -> Self {
        Self {
            channel,
            byte1,
            byte2,
            sign,
        }
    }

    /// Highest byte index this mapping reads.
    #[inline]
    pub const fn max_offset(&self) -> usize {
        if self.byte1 > self.byte2 {
            self.byte1
        } else {
            self.byte2
        }
    }
}

/// Mappings for all six axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct AxisMappings {
    pub x: AxisMapping,
    pub y: AxisMapping,
    pub z: AxisMapping,
    pub roll: AxisMapping,
    pub pitch: AxisMapping,
    pub yaw: AxisMapping,
}

impl AxisMappings {
    pub fn get(&self, axis: Axis) -> &AxisMapping {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
            Axis::Roll => &self.roll,
            Axis::Pitch => &self.pitch,
            Axis::Yaw => &self.yaw,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Axis, &AxisMapping)> + '_ {
        Axis::ALL.into_iter().map(move |axis| (axis, self.get(axis)))
    }
}

/// One button: bit `bit` of `report[byte]` on the buttons channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ButtonMapping {
    pub byte: usize,
    pub bit: u8,
    pub label: &'static str,
}

const fn button(byte: usize, bit: u8, label: &'static str) -> ButtonMapping {
    ButtonMapping { byte, bit, label }
}

/// Static description of one supported model.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DeviceSpec {
    pub name: &'static str,
    pub vendor_id: u16,
    pub product_id: u16,
    pub led_usage: (u16, u16),
    pub axes: AxisMappings,
    /// Order defines the index in [`ButtonState`](crate::snapshot::ButtonState).
    pub buttons: &'static [ButtonMapping],
    pub axis_scale: f64,
}

impl DeviceSpec {
    #[inline]
    pub fn transport_id(&self) -> (u16, u16) {
        (self.vendor_id, self.product_id)
    }

    pub fn button_labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.buttons.iter().map(|b| b.label)
    }

    /// Channel whose arrival completes the 6-DoF set: the highest channel any
    /// axis is mapped to. Rotation for split layouts, translation for combined ones.
    pub fn motion_channel(&self) -> Channel {
        self.axes
            .iter()
            .map(|(_, m)| m.channel)
            .max()
            .unwrap_or(Channel::Translation)
    }

    /// Minimum report length (channel byte included) for `channel`, or
    /// `None` when nothing is mapped to it.
    pub fn required_len(&self, channel: Channel) -> Option<usize> {
        let max = match channel {
            Channel::Buttons => self.buttons.iter().map(|b| b.byte).max(),
            _ => self
                .axes
                .iter()
                .filter(|(_, m)| m.channel == channel)
                .map(|(_, m)| m.max_offset())
                .max(),
        };
        max.map(|offset| offset + 1)
    }
}

use self::Sign::{Negative as NEG, Positive as POS};
use crate::event::Channel::{Rotation as PRY, Translation as XYZ};

const SPLIT_AXES: AxisMappings = AxisMappings {
    x: AxisMapping::new(XYZ, 1, 2, POS),
    y: AxisMapping::new(XYZ, 3, 4, NEG),
    z: AxisMapping::new(XYZ, 5, 6, NEG),
    pitch: AxisMapping::new(PRY, 1, 2, NEG),
    roll: AxisMapping::new(PRY, 3, 4, NEG),
    yaw: AxisMapping::new(PRY, 5, 6, POS),
};

const COMBINED_AXES: AxisMappings = AxisMappings {
    x: AxisMapping::new(XYZ, 1, 2, POS),
    y: AxisMapping::new(XYZ, 3, 4, NEG),
    z: AxisMapping::new(XYZ, 5, 6, NEG),
    pitch: AxisMapping::new(XYZ, 7, 8, NEG),
    roll: AxisMapping::new(XYZ, 9, 10, NEG),
    yaw: AxisMapping::new(XYZ, 11, 12, POS),
};

const TWO_BUTTONS: &[ButtonMapping] = &[button(1, 0, "LEFT"), button(1, 1, "RIGHT")];

const PRO_BUTTONS: &[ButtonMapping] = &[
    button(1, 0, "MENU"),
    button(3, 7, "ALT"),
    button(4, 1, "CTRL"),
    button(4, 0, "SHIFT"),
    button(3, 6, "ESC"),
    button(2, 4, "1"),
    button(2, 5, "2"),
    button(2, 6, "3"),
    button(2, 7, "4"),
    button(2, 0, "ROLL CLOCKWISE"),
    button(1, 2, "TOP"),
    button(4, 2, "ROTATION"),
    button(1, 5, "FRONT"),
    button(1, 4, "REAR"),
    button(1, 1, "FIT"),
];

const PILOT_PRO_BUTTONS: &[ButtonMapping] = &[
    button(4, 0, "SHIFT"),
    button(3, 6, "ESC"),
    button(4, 1, "CTRL"),
    button(3, 7, "ALT"),
    button(3, 1, "1"),
    button(3, 2, "2"),
    button(2, 6, "3"),
    button(2, 7, "4"),
    button(3, 0, "5"),
    button(1, 0, "MENU"),
    button(4, 6, "-"),
    button(4, 5, "+"),
    button(4, 4, "DOMINANT"),
    button(4, 3, "PAN/ZOOM"),
    button(4, 2, "ROTATION"),
    button(2, 0, "ROLL CLOCKWISE"),
    button(1, 2, "TOP"),
    button(1, 5, "FRONT"),
    button(1, 4, "REAR"),
    button(2, 2, "ISO"),
    button(1, 1, "FIT"),
];

const fn spec(
    name: &'static str,
    vendor_id: u16,
    product_id: u16,
    axes: AxisMappings,
    buttons: &'static [ButtonMapping],
) -> DeviceSpec {
    DeviceSpec {
        name,
        vendor_id,
        product_id,
        led_usage: DEFAULT_LED_USAGE,
        axes,
        buttons,
        axis_scale: DEFAULT_AXIS_SCALE,
    }
}

// Logitech-era models use VID 0x046D, later ones 0x256F (3Dconnexion).
static DEVICES: [DeviceSpec; 7] = [
    spec("SpaceNavigator", 0x046D, 0xC626, SPLIT_AXES, TWO_BUTTONS),
    spec("SpaceMouse Compact", 0x256F, 0xC635, SPLIT_AXES, TWO_BUTTONS),
    spec("SpaceMouse Pro Wireless", 0x256F, 0xC632, COMBINED_AXES, PRO_BUTTONS),
    spec("SpaceMouse Pro", 0x046D, 0xC62B, SPLIT_AXES, PRO_BUTTONS),
    spec("SpaceMouse Wireless", 0x256F, 0xC62E, COMBINED_AXES, TWO_BUTTONS),
    spec(
        "3Dconnexion Universal Receiver",
        0x256F,
        0xC652,
        COMBINED_AXES,
        PRO_BUTTONS,
    ),
    spec("SpacePilot Pro", 0x046D, 0xC629, SPLIT_AXES, PILOT_PRO_BUTTONS),
];

/// Every known spec, in registry order.
pub fn all() -> &'static [DeviceSpec] {
    &DEVICES
}

/// Names of every known model, in registry order.
pub fn all_names() -> Vec<&'static str> {
    DEVICES.iter().map(|d| d.name).collect()
}

pub fn lookup(name: &str) -> Result<&'static DeviceSpec> {
    DEVICES
        .iter()
        .find(|d| d.name == name)
        .ok_or_else(|| SpaceMouseError::UnknownDevice(name.to_string()))
}

pub fn find_by_transport_id(vendor_id: u16, product_id: u16) -> Option<&'static DeviceSpec> {
    DEVICES
        .iter()
        .find(|d| d.vendor_id == vendor_id && d.product_id == product_id)
}
