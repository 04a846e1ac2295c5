//! Per-device state accessors over a mapped [`HidSharedMemory`].
//!
//! Every ring accessor copies up to `out.len()` snapshots (never more than
//! [`LIFO_CAPACITY`]), oldest first, and returns how many it wrote. When the
//! producer keeps racing the read past the configured [`RetryLimit`], the
//! accessor logs a warning and reports zero snapshots.

use nx_rt_env::{ResultCode, rc::MODULE_HID};

use super::{
    layout::HidSharedMemory,
    lifo::{LIFO_CAPACITY, Lifo, RetryLimit, SampledState},
    npad::{
        ColorAttribute, GcTriggerState, NpadCommonState, NpadFullKeyState, NpadGcState,
        NpadHandheldLarkState, NpadHandheldState, NpadJoyDualState, NpadJoyLeftState,
        NpadJoyRightState, NpadLarkState, NpadLuciaState, NpadPalmaState, NpadState,
        NpadSystemExtState, NpadSystemState, SixAxisSensorLifo, SixAxisSensorState,
    },
    types::{AnalogStickState, GestureState, KeyboardState, MouseState, TouchScreenState},
};
use crate::{
    handles::SixAxisSensorHandle,
    npad::{
        DeviceType, JoyAssignmentMode, NpadButton, NpadControllerColor, NpadIdType, NpadPowerInfo,
        NpadStyleSet, NpadSystemProperties,
    },
};

/// Read-only view of the HID shared memory.
#[derive(Clone, Copy)]
pub struct StateReader<'a> {
    shmem: &'a HidSharedMemory,
    limit: RetryLimit,
}

impl<'a> StateReader<'a> {
    pub fn new(shmem: &'a HidSharedMemory, limit: RetryLimit) -> Self {
        Self { shmem, limit }
    }

    #[inline]
    pub fn shared_memory(&self) -> &'a HidSharedMemory {
        self.shmem
    }

    #[inline]
    pub fn retry_limit(&self) -> RetryLimit {
        self.limit
    }

    /// Entry of one npad.
    #[inline]
    pub fn npad(&self, id: NpadIdType) -> &'a NpadState {
        self.shmem.npad(id)
    }

    fn read<T: SampledState>(&self, lifo: &Lifo<T>, out: &mut [T], ring: &str) -> usize {
        match lifo.read(out, self.limit) {
            Ok(total) => total,
            Err(err) => {
                log::warn!("giving up on {ring} ring: {err}");
                0
            }
        }
    }

    /// Reads a common npad ring into a scratch window sized for `requested` outputs.
    fn read_common(
        &self,
        lifo: &Lifo<NpadCommonState>,
        requested: usize,
        ring: &str,
    ) -> ([NpadCommonState; LIFO_CAPACITY], usize) {
        let mut tmp = [NpadCommonState::default(); LIFO_CAPACITY];
        let requested = requested.min(LIFO_CAPACITY);
        let total = self.read(lifo, &mut tmp[..requested], ring);
        (tmp, total)
    }

    /// Touch screen snapshots. Each snapshot's `count` is clamped to `0..=16`.
    pub fn touch_screen_states(&self, out: &mut [TouchScreenState]) -> usize {
        let total = self.read(&self.shmem.touch_screen.lifo, out, "touch screen");
        for state in &mut out[..total] {
            state.count = state.clamped_count() as i32;
        }
        total
    }

    pub fn mouse_states(&self, out: &mut [MouseState]) -> usize {
        self.read(&self.shmem.mouse.lifo, out, "mouse")
    }

    pub fn keyboard_states(&self, out: &mut [KeyboardState]) -> usize {
        self.read(&self.shmem.keyboard.lifo, out, "keyboard")
    }

    pub fn gesture_states(&self, out: &mut [GestureState]) -> usize {
        self.read(&self.shmem.gesture.lifo, out, "gesture")
    }

    pub fn full_key_states(&self, id: NpadIdType, out: &mut [NpadFullKeyState]) -> usize {
        self.read(&self.npad(id).full_key_lifo, out, "full key")
    }

    pub fn handheld_states(&self, id: NpadIdType, out: &mut [NpadHandheldState]) -> usize {
        self.read(&self.npad(id).handheld_lifo, out, "handheld")
    }

    pub fn joy_dual_states(&self, id: NpadIdType, out: &mut [NpadJoyDualState]) -> usize {
        self.read(&self.npad(id).joy_dual_lifo, out, "joy dual")
    }

    pub fn joy_left_states(&self, id: NpadIdType, out: &mut [NpadJoyLeftState]) -> usize {
        self.read(&self.npad(id).joy_left_lifo, out, "joy left")
    }

    pub fn joy_right_states(&self, id: NpadIdType, out: &mut [NpadJoyRightState]) -> usize {
        self.read(&self.npad(id).joy_right_lifo, out, "joy right")
    }

    pub fn palma_states(&self, id: NpadIdType, out: &mut [NpadPalmaState]) -> usize {
        self.read(&self.npad(id).palma_lifo, out, "palma")
    }

    pub fn system_ext_states(&self, id: NpadIdType, out: &mut [NpadSystemExtState]) -> usize {
        self.read(&self.npad(id).system_ext_lifo, out, "system ext")
    }

    /// Generic-controller snapshots, derived from the system-ext ring.
    ///
    /// Buttons are reduced to the generic layout and both sticks read as zero.
    pub fn system_states(&self, id: NpadIdType, out: &mut [NpadSystemState]) -> usize {
        let total = self.read(&self.npad(id).system_ext_lifo, out, "system ext");
        for state in &mut out[..total] {
            state.buttons = remap_system_buttons(state.buttons);
            state.analog_stick_l = AnalogStickState::default();
            state.analog_stick_r = AnalogStickState::default();
        }
        total
    }

    /// GameCube controller snapshots.
    ///
    /// Buttons and sticks come from the full-key ring and trigger depth from the
    /// gc-trigger ring. When the two rings yield different counts the smaller
    /// one wins and the windows are aligned on their newest entries.
    pub fn gc_states(&self, id: NpadIdType, out: &mut [NpadGcState]) -> usize {
        let npad = self.npad(id);
        let (common, total) = self.read_common(&npad.full_key_lifo, out.len(), "full key");

        let mut triggers = [GcTriggerState::default(); LIFO_CAPACITY];
        let trigger_total = self.read(&npad.gc_trigger_lifo, &mut triggers[..total], "gc trigger");

        let fused = total.min(trigger_total);
        let common = &common[total - fused..total];
        let triggers = &triggers[trigger_total - fused..trigger_total];

        for (slot, (state, trigger)) in out.iter_mut().zip(common.iter().zip(triggers)) {
            *slot = NpadGcState {
                sampling_number: state.sampling_number,
                buttons: state.buttons,
                analog_stick_l: state.analog_stick_l,
                analog_stick_r: state.analog_stick_r,
                attributes: state.attributes,
                trigger_l: trigger.trigger_l,
                trigger_r: trigger.trigger_r,
            };
        }
        fused
    }

    /// NES/Famicom controller snapshots. Sticks read as zero.
    pub fn lark_states(&self, id: NpadIdType, out: &mut [NpadLarkState]) -> usize {
        let npad = self.npad(id);
        let (common, total) = self.read_common(&npad.full_key_lifo, out.len(), "full key");
        let lark_type = npad.lark_type_l_and_main();

        for (slot, state) in out.iter_mut().zip(&common[..total]) {
            *slot = NpadLarkState {
                sampling_number: state.sampling_number,
                buttons: state.buttons,
                attributes: state.attributes,
                lark_type,
                ..Default::default()
            };
        }
        total
    }

    /// NES/Famicom pair attached in handheld mode. Sticks are kept.
    pub fn handheld_lark_states(&self, id: NpadIdType, out: &mut [NpadHandheldLarkState]) -> usize {
        let npad = self.npad(id);
        let (common, total) = self.read_common(&npad.handheld_lifo, out.len(), "handheld");
        let lark_type_l_and_main = npad.lark_type_l_and_main();
        let lark_type_r = npad.lark_type_r();

        for (slot, state) in out.iter_mut().zip(&common[..total]) {
            *slot = NpadHandheldLarkState {
                sampling_number: state.sampling_number,
                buttons: state.buttons,
                analog_stick_l: state.analog_stick_l,
                analog_stick_r: state.analog_stick_r,
                attributes: state.attributes,
                lark_type_l_and_main,
                lark_type_r,
            };
        }
        total
    }

    /// SNES controller snapshots. Sticks read as zero.
    pub fn lucia_states(&self, id: NpadIdType, out: &mut [NpadLuciaState]) -> usize {
        let npad = self.npad(id);
        let (common, total) = self.read_common(&npad.full_key_lifo, out.len(), "full key");
        let lucia_type = npad.lucia_type();

        for (slot, state) in out.iter_mut().zip(&common[..total]) {
            *slot = NpadLuciaState {
                sampling_number: state.sampling_number,
                buttons: state.buttons,
                attributes: state.attributes,
                lucia_type,
                ..Default::default()
            };
        }
        total
    }

    /// Motion sensor snapshots for `handle`.
    ///
    /// Handles of the generic controller styles have no sensor and yield zero
    /// snapshots.
    ///
    /// # Panics
    ///
    /// Panics on a handle the service would never hand out: an unknown player
    /// number or style index, or a joy-dual device index other than 0 or 1.
    pub fn six_axis_sensor_states(
        &self,
        handle: SixAxisSensorHandle,
        out: &mut [SixAxisSensorState],
    ) -> usize {
        let Some(id) = handle.npad_id() else {
            panic!("six-axis handle {handle:?} names no npad");
        };
        let npad = self.npad(id);

        let lifo: &SixAxisSensorLifo = match handle.ring_selector() {
            0 | 5 => &npad.full_key_six_axis_lifo,
            1 => &npad.handheld_six_axis_lifo,
            2 => match handle.device_idx() {
                0 => &npad.joy_dual_left_six_axis_lifo,
                1 => &npad.joy_dual_right_six_axis_lifo,
                other => panic!("joy-dual six-axis handle with device index {other}"),
            },
            3 => &npad.joy_left_six_axis_lifo,
            4 => &npad.joy_right_six_axis_lifo,
            29 | 30 => return 0,
            other => panic!("six-axis handle with style selector {other}"),
        };

        self.read(lifo, out, "six-axis")
    }

    #[inline]
    pub fn style_set(&self, id: NpadIdType) -> NpadStyleSet {
        self.npad(id).style_set()
    }

    /// See [`NpadState::joy_assignment_mode`].
    #[inline]
    pub fn joy_assignment_mode(&self, id: NpadIdType) -> JoyAssignmentMode {
        self.npad(id).joy_assignment_mode()
    }

    #[inline]
    pub fn device_type(&self, id: NpadIdType) -> DeviceType {
        self.npad(id).device_type()
    }

    #[inline]
    pub fn system_properties(&self, id: NpadIdType) -> NpadSystemProperties {
        self.npad(id).system_properties()
    }

    /// Colors of a single controller.
    pub fn controller_color_single(
        &self,
        id: NpadIdType,
    ) -> Result<NpadControllerColor, ColorError> {
        let state = self.npad(id).full_key_color();
        check_color_attribute(state.attribute)?;
        Ok(state.color)
    }

    /// Colors of a Joy-Con pair, left then right.
    pub fn controller_color_split(
        &self,
        id: NpadIdType,
    ) -> Result<(NpadControllerColor, NpadControllerColor), ColorError> {
        let state = self.npad(id).joy_color();
        check_color_attribute(state.attribute)?;
        Ok((state.left, state.right))
    }

    /// Power state of a single controller.
    pub fn power_info_single(&self, id: NpadIdType) -> NpadPowerInfo {
        power_info(self.npad(id), 0)
    }

    /// Power state of a Joy-Con pair, left then right.
    pub fn power_info_split(&self, id: NpadIdType) -> (NpadPowerInfo, NpadPowerInfo) {
        let npad = self.npad(id);
        (power_info(npad, 1), power_info(npad, 2))
    }
}

/// Reduces buttons to the generic-controller layout.
fn remap_system_buttons(buttons: NpadButton) -> NpadButton {
    let mut remapped = buttons & (NpadButton::A | NpadButton::B | NpadButton::X | NpadButton::Y);

    let directions = [
        (NpadButton::ANY_LEFT, NpadButton::LEFT),
        (NpadButton::ANY_UP, NpadButton::UP),
        (NpadButton::ANY_RIGHT, NpadButton::RIGHT),
        (NpadButton::ANY_DOWN, NpadButton::DOWN),
        (NpadButton::L | NpadButton::ZL, NpadButton::L),
        (NpadButton::R | NpadButton::ZR, NpadButton::R),
    ];
    for (any, target) in directions {
        if buttons.intersects(any) {
            remapped |= target;
        }
    }
    remapped
}

fn check_color_attribute(attribute: u32) -> Result<(), ColorError> {
    match attribute {
        a if a == ColorAttribute::Ok as u32 => Ok(()),
        a if a == ColorAttribute::ReadError as u32 => Err(ColorError::ReadError),
        a if a == ColorAttribute::NoController as u32 => Err(ColorError::NoController),
        other => panic!("unexpected color attribute {other}"),
    }
}

/// Battery level above this is reported as full.
const MAX_BATTERY_LEVEL: u32 = 4;

fn power_info(npad: &NpadState, index: usize) -> NpadPowerInfo {
    let properties = npad.system_properties();
    let (charging, powered) = [
        (
            NpadSystemProperties::IS_CHARGING_JOY_DUAL,
            NpadSystemProperties::IS_POWERED_JOY_DUAL,
        ),
        (
            NpadSystemProperties::IS_CHARGING_JOY_LEFT,
            NpadSystemProperties::IS_POWERED_JOY_LEFT,
        ),
        (
            NpadSystemProperties::IS_CHARGING_JOY_RIGHT,
            NpadSystemProperties::IS_POWERED_JOY_RIGHT,
        ),
    ][index];

    NpadPowerInfo {
        is_powered: properties.contains(powered),
        is_charging: properties.contains(charging),
        battery_level: npad.battery_level(index).min(MAX_BATTERY_LEVEL),
    }
}

/// Error returned by the controller color accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    /// The service failed to read the controller's colors.
    #[error("controller color could not be read")]
    ReadError,
    /// No controller is attached to the npad.
    #[error("no controller attached")]
    NoController,
}

impl ColorError {
    /// Result code the service uses for this condition.
    pub fn result_code(&self) -> ResultCode {
        match self {
            Self::ReadError => ResultCode::from_parts(MODULE_HID, 603),
            Self::NoController => ResultCode::from_parts(MODULE_HID, 604),
        }
    }
}
