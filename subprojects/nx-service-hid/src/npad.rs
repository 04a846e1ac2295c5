//! Npad (controller slot) identifiers, styles and button sets.

use bitflags::bitflags;
use zerocopy::{Immutable, IntoBytes};

/// Number of npad entries in shared memory.
pub const NPAD_COUNT: usize = 10;

/// Npad identifier as understood by the HID service.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoBytes, Immutable)]
pub enum NpadIdType {
    No1 = 0,
    No2 = 1,
    No3 = 2,
    No4 = 3,
    No5 = 4,
    No6 = 5,
    No7 = 6,
    No8 = 7,
    Other = 0x10,
    Handheld = 0x20,
}

impl NpadIdType {
    /// The eight numbered players, in order.
    pub const PLAYERS: [Self; 8] = [
        Self::No1,
        Self::No2,
        Self::No3,
        Self::No4,
        Self::No5,
        Self::No6,
        Self::No7,
        Self::No8,
    ];

    pub const fn from_raw(raw: u32) -> Option<Self> {
        Some(match raw {
            0 => Self::No1,
            1 => Self::No2,
            2 => Self::No3,
            3 => Self::No4,
            4 => Self::No5,
            5 => Self::No6,
            6 => Self::No7,
            7 => Self::No8,
            0x10 => Self::Other,
            0x20 => Self::Handheld,
            _ => return None,
        })
    }

    #[inline]
    pub const fn to_raw(self) -> u32 {
        self as u32
    }

    /// Index of this npad's entry in shared memory.
    #[inline]
    pub const fn entry_index(self) -> usize {
        match self {
            Self::Handheld => 8,
            Self::Other => 9,
            player => player as usize,
        }
    }

    /// Inverse of [`entry_index`](Self::entry_index).
    pub const fn from_entry_index(index: usize) -> Option<Self> {
        match index {
            0..=7 => Self::from_raw(index as u32),
            8 => Some(Self::Handheld),
            9 => Some(Self::Other),
            _ => None,
        }
    }
}

bitflags! {
    /// Controller state variants applicable to an npad.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    #[repr(transparent)]
    pub struct NpadStyleSet: u32 {
        /// Pro Controller
        const FULL_KEY = 1 << 0;
        /// Joy-Con pair attached to the console
        const HANDHELD = 1 << 1;
        /// Detached Joy-Con pair
        const JOY_DUAL = 1 << 2;
        const JOY_LEFT = 1 << 3;
        const JOY_RIGHT = 1 << 4;
        /// GameCube controller
        const GC = 1 << 5;
        /// Poké Ball Plus
        const PALMA = 1 << 6;
        /// NES/Famicom controller
        const LARK = 1 << 7;
        /// NES/Famicom controller in handheld mode
        const HANDHELD_LARK = 1 << 8;
        /// SNES controller
        const LUCIA = 1 << 9;
        /// N64 controller
        const LAGON = 1 << 10;
        /// Sega Genesis controller
        const LAGER = 1 << 11;
        /// Generic external controller
        const SYSTEM_EXT = 1 << 29;
        /// Generic controller
        const SYSTEM = 1 << 30;

        const STANDARD = Self::FULL_KEY.bits()
            | Self::HANDHELD.bits()
            | Self::JOY_DUAL.bits()
            | Self::JOY_LEFT.bits()
            | Self::JOY_RIGHT.bits();
    }
}

impl NpadStyleSet {
    /// Picks the style read for a slot when several bits are set.
    #[inline]
    pub fn primary(self) -> Option<NpadStyle> {
        NpadStyle::PRIORITY
            .into_iter()
            .find(|style| self.contains(style.bit()))
    }

    /// The lowest set bit only.
    #[inline]
    pub fn lowest(self) -> Self {
        Self::from_bits_retain(self.bits() & self.bits().wrapping_neg())
    }
}

/// The state variant a frame reads for an npad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NpadStyle {
    SystemExt,
    System,
    FullKey,
    Handheld,
    JoyDual,
    JoyLeft,
    JoyRight,
}

impl NpadStyle {
    /// Read priority, highest first.
    pub const PRIORITY: [Self; 7] = [
        Self::SystemExt,
        Self::System,
        Self::FullKey,
        Self::Handheld,
        Self::JoyDual,
        Self::JoyLeft,
        Self::JoyRight,
    ];

    pub const fn bit(self) -> NpadStyleSet {
        match self {
            Self::SystemExt => NpadStyleSet::SYSTEM_EXT,
            Self::System => NpadStyleSet::SYSTEM,
            Self::FullKey => NpadStyleSet::FULL_KEY,
            Self::Handheld => NpadStyleSet::HANDHELD,
            Self::JoyDual => NpadStyleSet::JOY_DUAL,
            Self::JoyLeft => NpadStyleSet::JOY_LEFT,
            Self::JoyRight => NpadStyleSet::JOY_RIGHT,
        }
    }
}

bitflags! {
    /// Npad button bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    #[repr(transparent)]
    pub struct NpadButton: u64 {
        const A = 1 << 0;
        const B = 1 << 1;
        const X = 1 << 2;
        const Y = 1 << 3;
        const STICK_L = 1 << 4;
        const STICK_R = 1 << 5;
        const L = 1 << 6;
        const R = 1 << 7;
        const ZL = 1 << 8;
        const ZR = 1 << 9;
        const PLUS = 1 << 10;
        const MINUS = 1 << 11;
        /// D-pad
        const LEFT = 1 << 12;
        const UP = 1 << 13;
        const RIGHT = 1 << 14;
        const DOWN = 1 << 15;
        const STICK_L_LEFT = 1 << 16;
        const STICK_L_UP = 1 << 17;
        const STICK_L_RIGHT = 1 << 18;
        const STICK_L_DOWN = 1 << 19;
        const STICK_R_LEFT = 1 << 20;
        const STICK_R_UP = 1 << 21;
        const STICK_R_RIGHT = 1 << 22;
        const STICK_R_DOWN = 1 << 23;
        const LEFT_SL = 1 << 24;
        const LEFT_SR = 1 << 25;
        const RIGHT_SL = 1 << 26;
        const RIGHT_SR = 1 << 27;
        /// At least one finger on the touch screen. Reported on the handheld slot.
        const TOUCH = 1 << 28;
        const VERIFICATION = 1 << 29;
        const HANDHELD_LEFT_B = 1 << 30;
        const LAGON_C_LEFT = 1 << 31;
        const LAGON_C_UP = 1 << 32;
        const LAGON_C_RIGHT = 1 << 33;
        const LAGON_C_DOWN = 1 << 34;

        /// D-pad or either stick pointing left.
        const ANY_LEFT = Self::LEFT.bits() | Self::STICK_L_LEFT.bits() | Self::STICK_R_LEFT.bits();
        const ANY_UP = Self::UP.bits() | Self::STICK_L_UP.bits() | Self::STICK_R_UP.bits();
        const ANY_RIGHT =
            Self::RIGHT.bits() | Self::STICK_L_RIGHT.bits() | Self::STICK_R_RIGHT.bits();
        const ANY_DOWN = Self::DOWN.bits() | Self::STICK_L_DOWN.bits() | Self::STICK_R_DOWN.bits();
        const ANY_SL = Self::LEFT_SL.bits() | Self::RIGHT_SL.bits();
        const ANY_SR = Self::LEFT_SR.bits() | Self::RIGHT_SR.bits();
    }
}

bitflags! {
    /// Per-state npad attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    #[repr(transparent)]
    pub struct NpadAttribute: u32 {
        const IS_CONNECTED = 1 << 0;
        const IS_WIRED = 1 << 1;
        const IS_LEFT_CONNECTED = 1 << 2;
        const IS_LEFT_WIRED = 1 << 3;
        const IS_RIGHT_CONNECTED = 1 << 4;
        const IS_RIGHT_WIRED = 1 << 5;
    }
}

bitflags! {
    /// Physical device types backing an npad.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    #[repr(transparent)]
    pub struct DeviceType: u32 {
        const FULL_KEY = 1 << 0;
        const DEBUG_PAD = 1 << 1;
        const HANDHELD_LEFT = 1 << 2;
        const HANDHELD_RIGHT = 1 << 3;
        const JOY_LEFT = 1 << 4;
        const JOY_RIGHT = 1 << 5;
        const PALMA = 1 << 6;
        const LARK_HVC_LEFT = 1 << 7;
        const LARK_HVC_RIGHT = 1 << 8;
        const LARK_NES_LEFT = 1 << 9;
        const LARK_NES_RIGHT = 1 << 10;
        const HANDHELD_LARK_HVC_LEFT = 1 << 11;
        const HANDHELD_LARK_HVC_RIGHT = 1 << 12;
        const HANDHELD_LARK_NES_LEFT = 1 << 13;
        const HANDHELD_LARK_NES_RIGHT = 1 << 14;
        const LUCIA = 1 << 15;
        const SYSTEM = 1 << 31;
    }
}

bitflags! {
    /// Power and button-layout properties of an npad.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    #[repr(transparent)]
    pub struct NpadSystemProperties: u64 {
        const IS_CHARGING_JOY_DUAL = 1 << 0;
        const IS_CHARGING_JOY_LEFT = 1 << 1;
        const IS_CHARGING_JOY_RIGHT = 1 << 2;
        const IS_POWERED_JOY_DUAL = 1 << 3;
        const IS_POWERED_JOY_LEFT = 1 << 4;
        const IS_POWERED_JOY_RIGHT = 1 << 5;
        const IS_UNSUPPORTED_BUTTON_PRESSED_ON_SYSTEM = 1 << 9;
        const IS_UNSUPPORTED_BUTTON_PRESSED_ON_SYSTEM_EXT = 1 << 10;
        const IS_ABXY_BUTTON_ORIENTED = 1 << 11;
        const IS_SL_SR_BUTTON_ORIENTED = 1 << 12;
        const IS_PLUS_AVAILABLE = 1 << 13;
        const IS_MINUS_AVAILABLE = 1 << 14;
        const IS_DIRECTIONAL_BUTTONS_AVAILABLE = 1 << 15;
    }
}

/// Joy-Con orientation convention.
#[repr(u64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoyHoldType {
    #[default]
    Vertical = 0,
    Horizontal = 1,
}

impl JoyHoldType {
    pub const fn from_raw(raw: u64) -> Option<Self> {
        match raw {
            0 => Some(Self::Vertical),
            1 => Some(Self::Horizontal),
            _ => None,
        }
    }
}

/// Whether a Joy-Con pair is read as one controller or two.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoyAssignmentMode {
    Dual = 0,
    Single = 1,
}

/// Which half of a pair a single Joy-Con assignment refers to.
#[repr(u64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoyDeviceType {
    Left = 0,
    Right = 1,
}

/// NES/Famicom controller sub-type.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LarkType {
    #[default]
    Invalid = 0,
    /// Famicom controller, player 1
    H1 = 1,
    /// Famicom controller, player 2
    H2 = 2,
    NesLeft = 3,
    NesRight = 4,
}

impl LarkType {
    /// Out-of-range values read as [`LarkType::Invalid`].
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            1 => Self::H1,
            2 => Self::H2,
            3 => Self::NesLeft,
            4 => Self::NesRight,
            _ => Self::Invalid,
        }
    }
}

/// SNES controller region.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LuciaType {
    #[default]
    Invalid = 0,
    Japan = 1,
    Europe = 2,
    Usa = 3,
}

impl LuciaType {
    /// Out-of-range values read as [`LuciaType::Invalid`].
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            1 => Self::Japan,
            2 => Self::Europe,
            3 => Self::Usa,
            _ => Self::Invalid,
        }
    }
}

/// Body and button colors of a controller, as RGBA.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NpadControllerColor {
    pub main: u32,
    pub sub: u32,
}

/// Battery and charge state of one controller half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NpadPowerInfo {
    pub is_powered: bool,
    pub is_charging: bool,
    /// Battery level, 0..=4.
    pub battery_level: u32,
}
