//! Npad snapshot payloads and the per-npad shared-memory entry.

use core::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use static_assertions::const_assert_eq;

use super::{
    cell::SharedCell,
    lifo::{Lifo, SampledState},
    types::{AnalogStickState, DirectionState, Vector},
};
use crate::npad::{
    DeviceType, JoyAssignmentMode, LarkType, LuciaType, NpadAttribute, NpadButton,
    NpadControllerColor, NpadStyleSet, NpadSystemProperties,
};

/// Size of one npad entry.
pub const NPAD_INTERNAL_STATE_SIZE: usize = 0x5000;

/// Button and stick snapshot shared by most npad styles.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NpadCommonState {
    pub sampling_number: u64,
    pub buttons: NpadButton,
    pub analog_stick_l: AnalogStickState,
    pub analog_stick_r: AnalogStickState,
    pub attributes: NpadAttribute,
    pub reserved: u32,
}

impl SampledState for NpadCommonState {
    fn sampling_number(&self) -> u64 {
        self.sampling_number
    }
}

pub type NpadFullKeyState = NpadCommonState;
pub type NpadHandheldState = NpadCommonState;
pub type NpadJoyDualState = NpadCommonState;
pub type NpadJoyLeftState = NpadCommonState;
pub type NpadJoyRightState = NpadCommonState;
pub type NpadPalmaState = NpadCommonState;
/// Buttons-only view; sticks are always zero.
pub type NpadSystemState = NpadCommonState;
pub type NpadSystemExtState = NpadCommonState;

/// GameCube controller snapshot: common state plus analog trigger depth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NpadGcState {
    pub sampling_number: u64,
    pub buttons: NpadButton,
    pub analog_stick_l: AnalogStickState,
    pub analog_stick_r: AnalogStickState,
    pub attributes: NpadAttribute,
    pub trigger_l: u32,
    pub trigger_r: u32,
}

/// NES/Famicom controller snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NpadLarkState {
    pub sampling_number: u64,
    pub buttons: NpadButton,
    pub analog_stick_l: AnalogStickState,
    pub analog_stick_r: AnalogStickState,
    pub attributes: NpadAttribute,
    pub lark_type: LarkType,
}

/// NES/Famicom controller pair attached in handheld mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NpadHandheldLarkState {
    pub sampling_number: u64,
    pub buttons: NpadButton,
    pub analog_stick_l: AnalogStickState,
    pub analog_stick_r: AnalogStickState,
    pub attributes: NpadAttribute,
    pub lark_type_l_and_main: LarkType,
    pub lark_type_r: LarkType,
}

/// SNES controller snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NpadLuciaState {
    pub sampling_number: u64,
    pub buttons: NpadButton,
    pub analog_stick_l: AnalogStickState,
    pub analog_stick_r: AnalogStickState,
    pub attributes: NpadAttribute,
    pub lucia_type: LuciaType,
}

/// GameCube trigger depth snapshot, kept in its own ring.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GcTriggerState {
    pub sampling_number: u64,
    pub trigger_l: u32,
    pub trigger_r: u32,
}

impl SampledState for GcTriggerState {
    fn sampling_number(&self) -> u64 {
        self.sampling_number
    }
}

/// Motion sensor snapshot.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SixAxisSensorState {
    pub delta_time: u64,
    pub sampling_number: u64,
    pub acceleration: Vector,
    pub angular_velocity: Vector,
    pub angle: Vector,
    pub direction: DirectionState,
    pub attributes: u32,
    pub reserved: u32,
}

impl SampledState for SixAxisSensorState {
    fn sampling_number(&self) -> u64 {
        self.sampling_number
    }
}

/// Whether a stored controller color is usable.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorAttribute {
    Ok = 0,
    ReadError = 1,
    NoController = 2,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NpadFullKeyColorState {
    pub attribute: u32,
    pub color: NpadControllerColor,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NpadJoyColorState {
    pub attribute: u32,
    pub left: NpadControllerColor,
    pub right: NpadControllerColor,
}

pub type NpadCommonLifo = Lifo<NpadCommonState>;
pub type GcTriggerLifo = Lifo<GcTriggerState>;
pub type SixAxisSensorLifo = Lifo<SixAxisSensorState>;

const_assert_eq!(size_of::<NpadCommonState>(), 0x28);
const_assert_eq!(size_of::<NpadCommonLifo>(), 0x350);
const_assert_eq!(size_of::<GcTriggerLifo>(), 0x1B8);
const_assert_eq!(size_of::<SixAxisSensorState>(), 0x60);
const_assert_eq!(size_of::<SixAxisSensorLifo>(), 0x708);

/// Fields of one npad entry.
#[repr(C)]
pub struct NpadState {
    pub(crate) style_set: AtomicU32,
    pub(crate) joy_assignment_mode: AtomicU32,
    pub(crate) full_key_color: SharedCell<NpadFullKeyColorState>,
    pub(crate) joy_color: SharedCell<NpadJoyColorState>,
    pub full_key_lifo: NpadCommonLifo,
    pub handheld_lifo: NpadCommonLifo,
    pub joy_dual_lifo: NpadCommonLifo,
    pub joy_left_lifo: NpadCommonLifo,
    pub joy_right_lifo: NpadCommonLifo,
    pub palma_lifo: NpadCommonLifo,
    pub system_ext_lifo: NpadCommonLifo,
    pub full_key_six_axis_lifo: SixAxisSensorLifo,
    pub handheld_six_axis_lifo: SixAxisSensorLifo,
    pub joy_dual_left_six_axis_lifo: SixAxisSensorLifo,
    pub joy_dual_right_six_axis_lifo: SixAxisSensorLifo,
    pub joy_left_six_axis_lifo: SixAxisSensorLifo,
    pub joy_right_six_axis_lifo: SixAxisSensorLifo,
    pub(crate) device_type: AtomicU32,
    _reserved0: u32,
    pub(crate) system_properties: AtomicU64,
    _system_button_properties: AtomicU32,
    pub(crate) battery_level: [AtomicU32; 3],
    _applet_footer_ui_attribute: AtomicU32,
    pub(crate) lark_type_l_and_main: AtomicU32,
    pub(crate) lark_type_r: AtomicU32,
    pub(crate) lucia_type: AtomicU32,
    pub gc_trigger_lifo: GcTriggerLifo,
}

/// One npad entry, padded to its fixed size.
#[repr(C)]
pub struct NpadInternalState {
    state: NpadState,
    _padding: [u8; NPAD_INTERNAL_STATE_SIZE - size_of::<NpadState>()],
}

const_assert_eq!(size_of::<NpadInternalState>(), NPAD_INTERNAL_STATE_SIZE);

impl core::ops::Deref for NpadInternalState {
    type Target = NpadState;

    #[inline]
    fn deref(&self) -> &NpadState {
        &self.state
    }
}

impl NpadState {
    /// Styles currently applicable to this npad.
    #[inline]
    pub fn style_set(&self) -> NpadStyleSet {
        NpadStyleSet::from_bits_retain(self.style_set.load(Ordering::Acquire))
    }

    /// Joy-Con assignment mode.
    ///
    /// # Panics
    ///
    /// Panics if the service stored a value other than dual or single.
    pub fn joy_assignment_mode(&self) -> JoyAssignmentMode {
        match self.joy_assignment_mode.load(Ordering::Acquire) {
            0 => JoyAssignmentMode::Dual,
            1 => JoyAssignmentMode::Single,
            other => panic!("unexpected joy assignment mode {other}"),
        }
    }

    #[inline]
    pub fn device_type(&self) -> DeviceType {
        DeviceType::from_bits_retain(self.device_type.load(Ordering::Acquire))
    }

    #[inline]
    pub fn system_properties(&self) -> NpadSystemProperties {
        NpadSystemProperties::from_bits_retain(self.system_properties.load(Ordering::Acquire))
    }

    /// Raw battery level of the dual, left and right device slots.
    #[inline]
    pub fn battery_level(&self, index: usize) -> u32 {
        self.battery_level[index].load(Ordering::Acquire)
    }

    #[inline]
    pub fn lark_type_l_and_main(&self) -> LarkType {
        LarkType::from_raw(self.lark_type_l_and_main.load(Ordering::Acquire))
    }

    #[inline]
    pub fn lark_type_r(&self) -> LarkType {
        LarkType::from_raw(self.lark_type_r.load(Ordering::Acquire))
    }

    #[inline]
    pub fn lucia_type(&self) -> LuciaType {
        LuciaType::from_raw(self.lucia_type.load(Ordering::Acquire))
    }

    #[inline]
    pub fn full_key_color(&self) -> NpadFullKeyColorState {
        self.full_key_color.load()
    }

    #[inline]
    pub fn joy_color(&self) -> NpadJoyColorState {
        self.joy_color.load()
    }
}

#[cfg(any(test, feature = "emulator"))]
impl NpadState {
    pub fn set_style_set(&self, style_set: NpadStyleSet) {
        self.style_set.store(style_set.bits(), Ordering::Release);
    }

    pub fn set_joy_assignment_mode_raw(&self, mode: u32) {
        self.joy_assignment_mode.store(mode, Ordering::Release);
    }

    pub fn set_device_type(&self, device_type: DeviceType) {
        self.device_type.store(device_type.bits(), Ordering::Release);
    }

    pub fn set_system_properties(&self, props: NpadSystemProperties) {
        self.system_properties.store(props.bits(), Ordering::Release);
    }

    pub fn set_battery_level(&self, index: usize, level: u32) {
        self.battery_level[index].store(level, Ordering::Release);
    }

    pub fn set_lark_types_raw(&self, left: u32, right: u32) {
        self.lark_type_l_and_main.store(left, Ordering::Release);
        self.lark_type_r.store(right, Ordering::Release);
    }

    pub fn set_lucia_type_raw(&self, lucia_type: u32) {
        self.lucia_type.store(lucia_type, Ordering::Release);
    }

    pub fn set_full_key_color(&self, color: NpadFullKeyColorState) {
        self.full_key_color.store(color);
    }

    pub fn set_joy_color(&self, color: NpadJoyColorState) {
        self.joy_color.store(color);
    }
}
