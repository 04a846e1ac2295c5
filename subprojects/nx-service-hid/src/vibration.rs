//! Vibration values and device descriptions.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Amplitude and frequency pair for the low and high bands of a vibration device.
#[derive(Debug, Clone, Copy, PartialEq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct VibrationValue {
    pub amp_low: f32,
    pub freq_low: f32,
    pub amp_high: f32,
    pub freq_high: f32,
}

impl VibrationValue {
    /// No vibration at the default resonance frequencies.
    pub const NEUTRAL: Self = Self {
        amp_low: 0.0,
        freq_low: 160.0,
        amp_high: 0.0,
        freq_high: 320.0,
    };
}

/// Kind of actuator behind a vibration handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VibrationDeviceType {
    Unknown,
    LinearResonantActuator,
    GcErm,
}

/// Side of the controller the actuator sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VibrationDevicePosition {
    None,
    Left,
    Right,
}

/// Reply of GetVibrationDeviceInfo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct VibrationDeviceInfo {
    pub device_type: u32,
    pub position: u32,
}

impl VibrationDeviceInfo {
    pub fn device_type(&self) -> VibrationDeviceType {
        match self.device_type {
            1 => VibrationDeviceType::LinearResonantActuator,
            2 => VibrationDeviceType::GcErm,
            _ => VibrationDeviceType::Unknown,
        }
    }

    pub fn position(&self) -> VibrationDevicePosition {
        match self.position {
            1 => VibrationDevicePosition::Left,
            2 => VibrationDevicePosition::Right,
            _ => VibrationDevicePosition::None,
        }
    }
}
