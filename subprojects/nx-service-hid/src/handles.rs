//! Six-axis sensor and vibration device handles.
//!
//! Both handles pack `{ npad_style_index, player_number, device_idx, pad }` into
//! one 32-bit value. They are derived locally from an npad id and a style, with
//! no remote call.

use modular_bitfield::prelude::*;

use crate::{cmif::CommandError, npad::NpadIdType, npad::NpadStyleSet};

/// Handle of one motion sensor.
#[bitfield(bits = 32)]
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SixAxisSensorHandle {
    pub npad_style_index: B8,
    pub player_number: B8,
    pub device_idx: B8,
    #[skip]
    __: B8,
}

impl SixAxisSensorHandle {
    pub fn from_parts(npad_style_index: u8, id: NpadIdType, device_idx: u8) -> Self {
        Self::new()
            .with_npad_style_index(npad_style_index)
            .with_player_number(id.to_raw() as u8)
            .with_device_idx(device_idx)
    }

    #[inline]
    pub fn type_value(self) -> u32 {
        u32::from(self)
    }

    /// Selects which shared-memory six-axis ring this handle reads.
    ///
    /// Style indices start at 3, so this is `npad_style_index - 3` with wrap-around.
    #[inline]
    pub fn ring_selector(self) -> u8 {
        self.npad_style_index().wrapping_sub(3)
    }

    /// Npad the handle belongs to, if the player number is valid.
    pub fn npad_id(self) -> Option<NpadIdType> {
        NpadIdType::from_raw(self.player_number().into())
    }
}

/// Handle of one vibration actuator.
#[bitfield(bits = 32)]
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VibrationDeviceHandle {
    pub npad_style_index: B8,
    pub player_number: B8,
    pub device_idx: B8,
    #[skip]
    __: B8,
}

impl VibrationDeviceHandle {
    pub fn from_parts(npad_style_index: u8, id: NpadIdType, device_idx: u8) -> Self {
        Self::new()
            .with_npad_style_index(npad_style_index)
            .with_player_number(id.to_raw() as u8)
            .with_device_idx(device_idx)
    }

    #[inline]
    pub fn type_value(self) -> u32 {
        u32::from(self)
    }
}

/// How a style maps onto handles: style index, first device index, handle cap.
struct HandleLayout {
    style_index: u8,
    device_idx: u8,
    max_handles: usize,
}

impl HandleLayout {
    const fn new(style_index: u8, device_idx: u8, max_handles: usize) -> Self {
        Self {
            style_index,
            device_idx,
            max_handles,
        }
    }
}

fn check_handle_count(count: usize) -> Result<(), CommandError> {
    if count == 0 || count > 2 {
        return Err(CommandError::InvalidArgument("handle count must be 1 or 2"));
    }
    Ok(())
}

fn six_axis_layout(style: NpadStyleSet) -> Result<HandleLayout, CommandError> {
    let unsupported = CommandError::InvalidArgument("style has no six-axis sensor");

    if style.intersects(NpadStyleSet::FULL_KEY) {
        Ok(HandleLayout::new(3, 2, 1))
    } else if style.intersects(NpadStyleSet::HANDHELD) {
        Ok(HandleLayout::new(4, 2, 1))
    } else if style.intersects(NpadStyleSet::JOY_DUAL) {
        Ok(HandleLayout::new(5, 0, 2))
    } else if style.intersects(NpadStyleSet::JOY_LEFT) {
        Ok(HandleLayout::new(6, 0, 1))
    } else if style.intersects(NpadStyleSet::JOY_RIGHT) {
        Ok(HandleLayout::new(7, 1, 1))
    } else if style.intersects(NpadStyleSet::GC) {
        Ok(HandleLayout::new(3, 2, 1))
    } else if style.intersects(NpadStyleSet::LAGON | NpadStyleSet::LARK | NpadStyleSet::LUCIA) {
        Err(unsupported)
    } else if style.intersects(NpadStyleSet::HANDHELD_LARK) {
        Ok(HandleLayout::new(4, 2, 1))
    } else if style.intersects(NpadStyleSet::SYSTEM | NpadStyleSet::SYSTEM_EXT) {
        Err(unsupported)
    } else if style.intersects(NpadStyleSet::PALMA) {
        Ok(HandleLayout::new(3, 2, 1))
    } else {
        Err(unsupported)
    }
}

fn vibration_layout(style: NpadStyleSet) -> Result<HandleLayout, CommandError> {
    let unsupported = CommandError::InvalidArgument("style has no vibration device");

    if style.intersects(NpadStyleSet::FULL_KEY) {
        Ok(HandleLayout::new(3, 0, 2))
    } else if style.intersects(NpadStyleSet::HANDHELD) {
        Ok(HandleLayout::new(4, 0, 2))
    } else if style.intersects(NpadStyleSet::JOY_DUAL) {
        Ok(HandleLayout::new(5, 0, 2))
    } else if style.intersects(NpadStyleSet::JOY_LEFT) {
        Ok(HandleLayout::new(6, 0, 1))
    } else if style.intersects(NpadStyleSet::JOY_RIGHT) {
        Ok(HandleLayout::new(7, 1, 1))
    } else if style.intersects(NpadStyleSet::GC) {
        Ok(HandleLayout::new(8, 0, 1))
    } else if style.intersects(NpadStyleSet::LAGON) {
        Ok(HandleLayout::new(0xD, 0, 1))
    } else if style.intersects(NpadStyleSet::LARK | NpadStyleSet::LUCIA) {
        Err(unsupported)
    } else if style.intersects(NpadStyleSet::HANDHELD_LARK) {
        Ok(HandleLayout::new(4, 0, 2))
    } else if style.intersects(NpadStyleSet::SYSTEM) {
        Ok(HandleLayout::new(0x21, 0, 2))
    } else if style.intersects(NpadStyleSet::SYSTEM_EXT) {
        Ok(HandleLayout::new(0x20, 0, 2))
    } else {
        Err(unsupported)
    }
}

/// Fills `out` (one or two entries) with the six-axis handles of `id` for `style`.
///
/// When several style bits are set, the first match in the service's table wins.
pub fn six_axis_sensor_handles(
    style: NpadStyleSet,
    id: NpadIdType,
    out: &mut [SixAxisSensorHandle],
) -> Result<(), CommandError> {
    check_handle_count(out.len())?;
    let layout = six_axis_layout(style)?;
    if out.len() > layout.max_handles {
        return Err(CommandError::InvalidArgument("style supports a single handle"));
    }

    out[0] = SixAxisSensorHandle::from_parts(layout.style_index, id, layout.device_idx);
    if let Some(second) = out.get_mut(1) {
        *second = SixAxisSensorHandle::from_parts(layout.style_index, id, 1);
    }
    Ok(())
}

/// Fills `out` (one or two entries) with the vibration handles of `id` for `style`.
pub fn vibration_device_handles(
    style: NpadStyleSet,
    id: NpadIdType,
    out: &mut [VibrationDeviceHandle],
) -> Result<(), CommandError> {
    check_handle_count(out.len())?;
    let layout = vibration_layout(style)?;
    if out.len() > layout.max_handles {
        return Err(CommandError::InvalidArgument("style supports a single handle"));
    }

    out[0] = VibrationDeviceHandle::from_parts(layout.style_index, id, layout.device_idx);
    if let Some(second) = out.get_mut(1) {
        *second = VibrationDeviceHandle::from_parts(layout.style_index, id, 1);
    }
    Ok(())
}
