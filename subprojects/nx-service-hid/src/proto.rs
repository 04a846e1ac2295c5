//! HID protocol constants and request payloads.

use nx_rt_env::ServiceName;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::vibration::VibrationValue;

/// Service name for HID.
pub const SERVICE_NAME: ServiceName = ServiceName::new_truncate("hid");

/// IHidServer command ids
pub mod cmds {
    pub const CREATE_APPLET_RESOURCE: u32 = 0;

    pub const ACTIVATE_TOUCH_SCREEN: u32 = 11;
    pub const ACTIVATE_MOUSE: u32 = 21;
    pub const ACTIVATE_KEYBOARD: u32 = 31;
    pub const SEND_KEYBOARD_LOCK_KEY_EVENT: u32 = 32;

    // Six-axis sensor
    pub const START_SIX_AXIS_SENSOR: u32 = 66;
    pub const STOP_SIX_AXIS_SENSOR: u32 = 67;
    pub const IS_SIX_AXIS_SENSOR_FUSION_ENABLED: u32 = 68;
    pub const ENABLE_SIX_AXIS_SENSOR_FUSION: u32 = 69;
    pub const SET_SIX_AXIS_SENSOR_FUSION_PARAMETERS: u32 = 70;
    pub const GET_SIX_AXIS_SENSOR_FUSION_PARAMETERS: u32 = 71;
    pub const RESET_SIX_AXIS_SENSOR_FUSION_PARAMETERS: u32 = 72;

    pub const ACTIVATE_GESTURE: u32 = 91;

    // Npad
    pub const SET_SUPPORTED_NPAD_STYLE_SET: u32 = 100;
    pub const GET_SUPPORTED_NPAD_STYLE_SET: u32 = 101;
    pub const SET_SUPPORTED_NPAD_ID_TYPE: u32 = 102;
    pub const ACTIVATE_NPAD: u32 = 103;
    pub const ACQUIRE_NPAD_STYLE_SET_UPDATE_EVENT_HANDLE: u32 = 106;
    pub const DISCONNECT_NPAD: u32 = 107;
    pub const GET_PLAYER_LED_PATTERN: u32 = 108;
    pub const ACTIVATE_NPAD_WITH_REVISION: u32 = 109;
    pub const SET_NPAD_JOY_HOLD_TYPE: u32 = 120;
    pub const GET_NPAD_JOY_HOLD_TYPE: u32 = 121;
    pub const SET_NPAD_JOY_ASSIGNMENT_MODE_SINGLE_BY_DEFAULT: u32 = 122;
    pub const SET_NPAD_JOY_ASSIGNMENT_MODE_SINGLE: u32 = 123;
    pub const SET_NPAD_JOY_ASSIGNMENT_MODE_DUAL: u32 = 124;
    pub const MERGE_SINGLE_JOY_AS_DUAL_JOY: u32 = 125;

    // Vibration
    pub const GET_VIBRATION_DEVICE_INFO: u32 = 200;
    pub const SEND_VIBRATION_VALUE: u32 = 201;
    pub const GET_ACTUAL_VIBRATION_VALUE: u32 = 202;
    pub const CREATE_ACTIVE_VIBRATION_DEVICE_LIST: u32 = 203;
    pub const PERMIT_VIBRATION: u32 = 204;
    pub const IS_VIBRATION_PERMITTED: u32 = 205;
    pub const SEND_VIBRATION_VALUES: u32 = 206;
    pub const BEGIN_PERMIT_VIBRATION_SESSION: u32 = 209;
    pub const END_PERMIT_VIBRATION_SESSION: u32 = 210;
    pub const IS_VIBRATION_DEVICE_MOUNTED: u32 = 211;
}

/// IAppletResource command ids
pub mod applet_resource_cmds {
    pub const GET_SHARED_MEMORY_HANDLE: u32 = 0;
}

/// IActiveVibrationDeviceList command ids
pub mod vibration_list_cmds {
    pub const ACTIVATE_VIBRATION_DEVICE: u32 = 0;
}

/// `{ u32, pad, aruid }`
#[derive(Debug, Clone, Copy, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct U32Aruid {
    pub value: u32,
    pub pad: u32,
    pub aruid: u64,
}

impl U32Aruid {
    pub const fn new(value: u32, aruid: u64) -> Self {
        Self {
            value,
            pad: 0,
            aruid,
        }
    }
}

/// `{ u32, u32, aruid }`
#[derive(Debug, Clone, Copy, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct U32U32Aruid {
    pub value0: u32,
    pub value1: u32,
    pub aruid: u64,
}

/// `{ aruid, u64 }`, used where the id comes first.
#[derive(Debug, Clone, Copy, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct AruidU64 {
    pub aruid: u64,
    pub value: u64,
}

/// `{ u32, pad, aruid, u64 }`
#[derive(Debug, Clone, Copy, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct U32AruidU64 {
    pub value: u32,
    pub pad: u32,
    pub aruid: u64,
    pub value64: u64,
}

/// `{ bool, pad, u32, aruid }`
#[derive(Debug, Clone, Copy, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct BoolU32Aruid {
    pub flag: u8,
    pub pad: [u8; 3],
    pub value: u32,
    pub aruid: u64,
}

/// Input of SetSixAxisSensorFusionParameters.
#[derive(Debug, Clone, Copy, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct FusionParametersIn {
    pub handle: u32,
    pub parameter0: f32,
    pub parameter1: f32,
    pub pad: u32,
    pub aruid: u64,
}

/// Output of GetSixAxisSensorFusionParameters.
#[derive(Debug, Clone, Copy, PartialEq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct FusionParametersOut {
    pub parameter0: f32,
    pub parameter1: f32,
}

/// Input of SendVibrationValue.
#[derive(Debug, Clone, Copy, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct SendVibrationValueIn {
    pub handle: u32,
    pub value: VibrationValue,
    pub pad: u32,
    pub aruid: u64,
}

/// Input of AcquireNpadStyleSetUpdateEventHandle.
#[derive(Debug, Clone, Copy, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct StyleSetUpdateEventIn {
    pub id: u32,
    pub pad: u32,
    pub aruid: u64,
    pub event_ptr: u64,
}

