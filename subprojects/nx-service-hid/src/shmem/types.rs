//! Snapshot payloads of the non-npad input devices.

use bitflags::bitflags;

use super::lifo::SampledState;

/// Maximum number of simultaneous touches reported in one snapshot.
pub const TOUCH_MAX: usize = 16;

/// Analog stick position, each axis in -0x7FFF..=0x7FFF.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalogStickState {
    pub x: i32,
    pub y: i32,
}

/// 3D vector for sensor data.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Orientation matrix reported by a six-axis sensor.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DirectionState {
    pub direction: [[f32; 3]; 3],
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[repr(transparent)]
    pub struct TouchAttribute: u32 {
        const START = 1 << 0;
        const END = 1 << 1;
    }
}

/// One finger on the touch screen.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TouchState {
    pub delta_time: u64,
    pub attributes: TouchAttribute,
    pub finger_id: u32,
    pub x: u32,
    pub y: u32,
    pub diameter_x: u32,
    pub diameter_y: u32,
    pub rotation_angle: u32,
    pub reserved: u32,
}

/// Touch screen snapshot.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TouchScreenState {
    pub sampling_number: u64,
    /// Number of valid entries in `touches`, as reported by the service.
    pub count: i32,
    pub reserved: u32,
    pub touches: [TouchState; TOUCH_MAX],
}

impl TouchScreenState {
    /// Valid touches, with the reported count clamped to `0..=TOUCH_MAX`.
    pub fn touches(&self) -> &[TouchState] {
        &self.touches[..self.clamped_count()]
    }

    #[inline]
    pub(crate) fn clamped_count(&self) -> usize {
        (self.count.max(0) as usize).min(TOUCH_MAX)
    }
}

impl SampledState for TouchScreenState {
    fn sampling_number(&self) -> u64 {
        self.sampling_number
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    #[repr(transparent)]
    pub struct MouseButton: u32 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const MIDDLE = 1 << 2;
        const FORWARD = 1 << 3;
        const BACK = 1 << 4;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[repr(transparent)]
    pub struct MouseAttribute: u32 {
        const TRANSFERABLE = 1 << 0;
        const IS_CONNECTED = 1 << 1;
    }
}

/// Mouse snapshot.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseState {
    pub sampling_number: u64,
    pub x: i32,
    pub y: i32,
    pub delta_x: i32,
    pub delta_y: i32,
    pub wheel_delta_x: i32,
    pub wheel_delta_y: i32,
    pub buttons: MouseButton,
    pub attributes: MouseAttribute,
}

impl SampledState for MouseState {
    fn sampling_number(&self) -> u64 {
        self.sampling_number
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    #[repr(transparent)]
    pub struct KeyboardModifier: u64 {
        const CONTROL = 1 << 0;
        const SHIFT = 1 << 1;
        const LEFT_ALT = 1 << 2;
        const RIGHT_ALT = 1 << 3;
        const GUI = 1 << 4;
        const CAPS_LOCK = 1 << 8;
        const SCROLL_LOCK = 1 << 9;
        const NUM_LOCK = 1 << 10;
        const KATAKANA = 1 << 11;
        const HIRAGANA = 1 << 12;
    }
}

bitflags! {
    /// Lock-key transitions sent to the keyboard.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    #[repr(transparent)]
    pub struct KeyboardLockKeyEvent: u32 {
        const NUM_LOCK_ON = 1 << 0;
        const NUM_LOCK_OFF = 1 << 1;
        const NUM_LOCK_TOGGLE = 1 << 2;
        const CAPS_LOCK_ON = 1 << 3;
        const CAPS_LOCK_OFF = 1 << 4;
        const CAPS_LOCK_TOGGLE = 1 << 5;
        const SCROLL_LOCK_ON = 1 << 6;
        const SCROLL_LOCK_OFF = 1 << 7;
        const SCROLL_LOCK_TOGGLE = 1 << 8;
    }
}

/// USB HID usage id of a keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct KeyboardKey(pub u8);

impl KeyboardKey {
    pub const A: Self = Self(0x04);
    pub const Z: Self = Self(0x1D);
    pub const D1: Self = Self(0x1E);
    pub const D0: Self = Self(0x27);
    pub const RETURN: Self = Self(0x28);
    pub const ESCAPE: Self = Self(0x29);
    pub const BACKSPACE: Self = Self(0x2A);
    pub const TAB: Self = Self(0x2B);
    pub const SPACE: Self = Self(0x2C);
    pub const RIGHT_ARROW: Self = Self(0x4F);
    pub const LEFT_ARROW: Self = Self(0x50);
    pub const DOWN_ARROW: Self = Self(0x51);
    pub const UP_ARROW: Self = Self(0x52);
    pub const LEFT_CONTROL: Self = Self(0xE0);
    pub const LEFT_SHIFT: Self = Self(0xE1);
}

/// 256-bit set of pressed keys, indexed by [`KeyboardKey`].
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct KeyboardKeys(pub [u64; 4]);

impl KeyboardKeys {
    #[inline]
    pub fn contains(&self, key: KeyboardKey) -> bool {
        let index = key.0 as usize;
        self.0[index / 64] & (1 << (index % 64)) != 0
    }

    #[inline]
    pub fn insert(&mut self, key: KeyboardKey) {
        let index = key.0 as usize;
        self.0[index / 64] |= 1 << (index % 64);
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|word| *word == 0)
    }
}

impl core::ops::BitAnd for KeyboardKeys {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(core::array::from_fn(|i| self.0[i] & rhs.0[i]))
    }
}

impl core::ops::BitOr for KeyboardKeys {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(core::array::from_fn(|i| self.0[i] | rhs.0[i]))
    }
}

impl core::ops::Not for KeyboardKeys {
    type Output = Self;

    fn not(self) -> Self {
        Self(self.0.map(|word| !word))
    }
}

/// Keyboard snapshot.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyboardState {
    pub sampling_number: u64,
    pub modifiers: KeyboardModifier,
    pub keys: KeyboardKeys,
}

impl SampledState for KeyboardState {
    fn sampling_number(&self) -> u64 {
        self.sampling_number
    }
}

/// Recognized gesture kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureType {
    Idle,
    Complete,
    Cancel,
    Touch,
    Press,
    Tap,
    Pan,
    Swipe,
    Pinch,
    Rotate,
    Unknown(u32),
}

/// One contact point of a gesture.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GesturePoint {
    pub x: i32,
    pub y: i32,
}

/// Gesture snapshot.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GestureState {
    pub sampling_number: u64,
    pub context_number: u64,
    pub kind: u32,
    pub direction: u32,
    pub x: i32,
    pub y: i32,
    pub delta_x: i32,
    pub delta_y: i32,
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub attributes: u32,
    pub scale: f32,
    pub rotation_angle: f32,
    pub point_count: i32,
    pub points: [GesturePoint; 4],
}

impl GestureState {
    pub fn kind(&self) -> GestureType {
        match self.kind {
            0 => GestureType::Idle,
            1 => GestureType::Complete,
            2 => GestureType::Cancel,
            3 => GestureType::Touch,
            4 => GestureType::Press,
            5 => GestureType::Tap,
            6 => GestureType::Pan,
            7 => GestureType::Swipe,
            8 => GestureType::Pinch,
            9 => GestureType::Rotate,
            other => GestureType::Unknown(other),
        }
    }

    /// Valid contact points, with the count clamped to the array.
    pub fn points(&self) -> &[GesturePoint] {
        let count = (self.point_count.max(0) as usize).min(self.points.len());
        &self.points[..count]
    }
}

impl SampledState for GestureState {
    fn sampling_number(&self) -> u64 {
        self.sampling_number
    }
}
