// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Input-device domain types shared by the bridge and its consumers.
//
// The numeric values mirror `android.view.InputDevice` and the launcher's
// `GeodeUtils` constants; they travel across the JNI boundary unchanged.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Bitmask of input sources reported by `InputDevice.getSources()`.
///
/// Each source is a class bit plus a specific bit, so membership is
/// "masked value equals the flag", not "masked value is non-zero".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputSource(u32);

impl InputSource {
    pub const UNKNOWN: Self = Self(0);
    pub const KEYBOARD: Self = Self(0x0000_0101);
    pub const DPAD: Self = Self(0x0000_0201);
    pub const GAMEPAD: Self = Self(0x0000_0401);
    pub const TOUCHSCREEN: Self = Self(0x0000_1002);
    pub const MOUSE: Self = Self(0x0000_2002);
    pub const STYLUS: Self = Self(0x0000_4002);
    pub const TRACKBALL: Self = Self(0x0001_0004);
    pub const MOUSE_RELATIVE: Self = Self(0x0002_0004);
    pub const TOUCHPAD: Self = Self(0x0010_0008);
    pub const TOUCH_NAVIGATION: Self = Self(0x0020_0000);
    pub const ROTARY_ENCODER: Self = Self(0x0040_0000);
    pub const JOYSTICK: Self = Self(0x0100_0010);
    pub const SENSOR: Self = Self(0x0400_0000);

    /// Every named source, in canonical order.
    pub const CANONICAL: [(Self, &'static str); 13] = [
        (Self::KEYBOARD, "Keyboard"),
        (Self::DPAD, "DPad"),
        (Self::GAMEPAD, "Gamepad"),
        (Self::TOUCHSCREEN, "Touchscreen"),
        (Self::MOUSE, "Mouse"),
        (Self::STYLUS, "Stylus"),
        (Self::TRACKBALL, "Trackball"),
        (Self::MOUSE_RELATIVE, "MouseRelative"),
        (Self::TOUCHPAD, "Touchpad"),
        (Self::TOUCH_NAVIGATION, "TouchNavigation"),
        (Self::ROTARY_ENCODER, "RotaryEncoder"),
        (Self::JOYSTICK, "Joystick"),
        (Self::SENSOR, "Sensor"),
    ];

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Reinterpret the signed mask the runtime hands back.
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw as u32)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, flag: Self) -> bool {
        self.0 & flag.0 == flag.0
    }

    /// Split a mask into the canonical sources it contains, in canonical order.
    pub fn split(self) -> Vec<Self> {
        Self::CANONICAL
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(flag, _)| *flag)
            .collect()
    }

    /// True for joysticks and gamepads.
    pub const fn is_controller(self) -> bool {
        self.contains(Self::JOYSTICK) || self.contains(Self::GAMEPAD)
    }

    /// Name of a single canonical source; `"Unknown"` for anything else,
    /// including composite masks.
    pub fn name(self) -> &'static str {
        Self::CANONICAL
            .iter()
            .find(|(flag, _)| *flag == self)
            .map_or("Unknown", |(_, name)| *name)
    }
}

impl BitAnd for InputSource {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for InputSource {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for InputSource {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which kinds of indicator light a controller exposes, and which kind a
/// `setDeviceLightColor` call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControllerLightType(i32);

impl ControllerLightType {
    pub const NONE: Self = Self(0);
    pub const PLAYER_NUMBER: Self = Self(1);
    pub const COLOR: Self = Self(2);
    pub const ALL: Self = Self(3);

    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    pub const fn contains(self, flag: Self) -> bool {
        self.0 & flag.0 == flag.0
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::PLAYER_NUMBER => "PlayerNumber",
            Self::COLOR => "Color",
            Self::ALL => "All",
            _ => "None",
        }
    }
}

impl BitAnd for ControllerLightType {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for ControllerLightType {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for ControllerLightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Battery state as reported by `BatteryState.getStatus()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BatteryStatus {
    #[default]
    Unknown = 1,
    Charging = 2,
    Discharging = 3,
    NotCharging = 4,
    Full = 5,
}

impl BatteryStatus {
    /// Unrecognised values collapse to `Unknown`.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            2 => Self::Charging,
            3 => Self::Discharging,
            4 => Self::NotCharging,
            5 => Self::Full,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for BatteryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "Unknown",
            Self::Charging => "Charging",
            Self::Discharging => "Discharging",
            Self::NotCharging => "NotCharging",
            Self::Full => "Full",
        };
        f.write_str(name)
    }
}

/// Light types from `android.hardware.lights.Light`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AndroidLightType {
    Microphone,
    Input,
    PlayerId,
    KeyboardBacklight,
    Other(i32),
}

impl AndroidLightType {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            8 => Self::Microphone,
            10001 => Self::Input,
            10002 => Self::PlayerId,
            10003 => Self::KeyboardBacklight,
            other => Self::Other(other),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Microphone => "Microphone",
            Self::Input => "Input",
            Self::PlayerId => "PlayerId",
            Self::KeyboardBacklight => "KeyboardBacklight",
            Self::Other(_) => "Unknown",
        }
    }
}
