//! IHidServer request encoding.
//!
//! Each function builds one request, hands it to a [`Dispatch`] implementation
//! and decodes the reply. Version gating and argument checks that need no
//! remote call live in [`HidService`](crate::HidService).

use nx_rt_env::HosVersion;
use zerocopy::{FromBytes, IntoBytes};

use crate::{
    dispatch::{Dispatch, DispatchError, RemoteHandle, Request, Response, Session},
    npad::NpadIdType,
    proto::{
        AruidU64, BoolU32Aruid, FusionParametersIn, FusionParametersOut, SendVibrationValueIn,
        StyleSetUpdateEventIn, U32Aruid, U32AruidU64, U32U32Aruid, applet_resource_cmds, cmds,
        vibration_list_cmds,
    },
    vibration::{VibrationDeviceInfo, VibrationValue},
};

/// Error returned by HID commands.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum CommandError {
    /// The running system is older than the command.
    #[error("command requires system version {required} or newer")]
    IncompatibleVersion { required: HosVersion },
    /// An argument was rejected before sending.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// The remote call failed.
    #[error("remote call failed")]
    Dispatch(#[from] DispatchError),
    /// The reply carries no copy handle.
    #[error("reply carries no handle")]
    MissingHandle,
    /// The reply carries no sub-interface session.
    #[error("reply carries no object")]
    MissingObject,
    /// The reply payload is shorter than expected.
    #[error("malformed reply")]
    MalformedResponse,
}

#[inline]
fn call<D: Dispatch>(
    dispatch: &D,
    session: Session,
    request: Request<'_>,
) -> Result<Response, CommandError> {
    Ok(dispatch.dispatch(session, &request)?)
}

#[inline]
fn read_reply<T: FromBytes>(resp: &Response) -> Result<T, CommandError> {
    resp.read().ok_or(CommandError::MalformedResponse)
}

/// `{ u32, pad, aruid }` with the process id attached.
fn send_u32_aruid<D: Dispatch>(
    dispatch: &D,
    session: Session,
    cmd_id: u32,
    value: u32,
    aruid: u64,
) -> Result<Response, CommandError> {
    let input = U32Aruid::new(value, aruid);
    call(
        dispatch,
        session,
        Request::new(cmd_id).with_data(&input).with_pid(),
    )
}

/// Bare aruid with the process id attached.
fn send_aruid<D: Dispatch>(
    dispatch: &D,
    session: Session,
    cmd_id: u32,
    aruid: u64,
) -> Result<Response, CommandError> {
    call(
        dispatch,
        session,
        Request::new(cmd_id).with_data(&aruid).with_pid(),
    )
}

/// Creates an IAppletResource sub-interface.
///
/// This is IHidServer command 0.
pub fn create_applet_resource<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
) -> Result<Session, CommandError> {
    let resp = send_aruid(dispatch, session, cmds::CREATE_APPLET_RESOURCE, aruid)?;
    resp.object.ok_or(CommandError::MissingObject)
}

/// Gets the shared memory handle from IAppletResource.
///
/// This is IAppletResource command 0.
pub fn get_shared_memory_handle<D: Dispatch>(
    dispatch: &D,
    applet_resource: Session,
) -> Result<RemoteHandle, CommandError> {
    let resp = call(
        dispatch,
        applet_resource,
        Request::new(applet_resource_cmds::GET_SHARED_MEMORY_HANDLE),
    )?;
    resp.copy_handle.ok_or(CommandError::MissingHandle)
}

/// This is IHidServer command 11.
pub fn activate_touch_screen<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
) -> Result<(), CommandError> {
    send_aruid(dispatch, session, cmds::ACTIVATE_TOUCH_SCREEN, aruid).map(drop)
}

/// This is IHidServer command 21.
pub fn activate_mouse<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
) -> Result<(), CommandError> {
    send_aruid(dispatch, session, cmds::ACTIVATE_MOUSE, aruid).map(drop)
}

/// This is IHidServer command 31.
pub fn activate_keyboard<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
) -> Result<(), CommandError> {
    send_aruid(dispatch, session, cmds::ACTIVATE_KEYBOARD, aruid).map(drop)
}

/// This is IHidServer command 32.
pub fn send_keyboard_lock_key_event<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
    events: u32,
) -> Result<(), CommandError> {
    send_u32_aruid(dispatch, session, cmds::SEND_KEYBOARD_LOCK_KEY_EVENT, events, aruid).map(drop)
}

/// This is IHidServer command 66.
pub fn start_six_axis_sensor<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
    handle: u32,
) -> Result<(), CommandError> {
    send_u32_aruid(dispatch, session, cmds::START_SIX_AXIS_SENSOR, handle, aruid).map(drop)
}

/// This is IHidServer command 67.
pub fn stop_six_axis_sensor<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
    handle: u32,
) -> Result<(), CommandError> {
    send_u32_aruid(dispatch, session, cmds::STOP_SIX_AXIS_SENSOR, handle, aruid).map(drop)
}

/// This is IHidServer command 68.
pub fn is_six_axis_sensor_fusion_enabled<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
    handle: u32,
) -> Result<bool, CommandError> {
    let resp = send_u32_aruid(
        dispatch,
        session,
        cmds::IS_SIX_AXIS_SENSOR_FUSION_ENABLED,
        handle,
        aruid,
    )?;
    Ok(read_reply::<u8>(&resp)? & 1 != 0)
}

/// This is IHidServer command 69.
pub fn enable_six_axis_sensor_fusion<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
    handle: u32,
    enable: bool,
) -> Result<(), CommandError> {
    let input = BoolU32Aruid {
        flag: enable.into(),
        pad: [0; 3],
        value: handle,
        aruid,
    };
    call(
        dispatch,
        session,
        Request::new(cmds::ENABLE_SIX_AXIS_SENSOR_FUSION)
            .with_data(&input)
            .with_pid(),
    )
    .map(drop)
}

/// This is IHidServer command 70.
pub fn set_six_axis_sensor_fusion_parameters<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
    handle: u32,
    parameter0: f32,
    parameter1: f32,
) -> Result<(), CommandError> {
    let input = FusionParametersIn {
        handle,
        parameter0,
        parameter1,
        pad: 0,
        aruid,
    };
    call(
        dispatch,
        session,
        Request::new(cmds::SET_SIX_AXIS_SENSOR_FUSION_PARAMETERS)
            .with_data(&input)
            .with_pid(),
    )
    .map(drop)
}

/// This is IHidServer command 71.
pub fn get_six_axis_sensor_fusion_parameters<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
    handle: u32,
) -> Result<FusionParametersOut, CommandError> {
    let resp = send_u32_aruid(
        dispatch,
        session,
        cmds::GET_SIX_AXIS_SENSOR_FUSION_PARAMETERS,
        handle,
        aruid,
    )?;
    read_reply(&resp)
}

/// This is IHidServer command 72.
pub fn reset_six_axis_sensor_fusion_parameters<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
    handle: u32,
) -> Result<(), CommandError> {
    send_u32_aruid(
        dispatch,
        session,
        cmds::RESET_SIX_AXIS_SENSOR_FUSION_PARAMETERS,
        handle,
        aruid,
    )
    .map(drop)
}

/// Activates gesture recognition.
///
/// This is IHidServer command 91.
pub fn activate_gesture<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
) -> Result<(), CommandError> {
    send_u32_aruid(dispatch, session, cmds::ACTIVATE_GESTURE, 1, aruid).map(drop)
}

/// This is IHidServer command 100.
pub fn set_supported_npad_style_set<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
    style_set: u32,
) -> Result<(), CommandError> {
    send_u32_aruid(dispatch, session, cmds::SET_SUPPORTED_NPAD_STYLE_SET, style_set, aruid)
        .map(drop)
}

/// This is IHidServer command 101.
pub fn get_supported_npad_style_set<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
) -> Result<u32, CommandError> {
    let resp = send_aruid(dispatch, session, cmds::GET_SUPPORTED_NPAD_STYLE_SET, aruid)?;
    read_reply(&resp)
}

/// Sets the npad ids the application handles, passed as an in-pointer buffer.
///
/// This is IHidServer command 102.
pub fn set_supported_npad_id_type<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
    ids: &[NpadIdType],
) -> Result<(), CommandError> {
    let buffers = [ids.as_bytes()];
    call(
        dispatch,
        session,
        Request::new(cmds::SET_SUPPORTED_NPAD_ID_TYPE)
            .with_data(&aruid)
            .with_pointers(&buffers)
            .with_pid(),
    )
    .map(drop)
}

/// Activates npad input without a revision.
///
/// This is IHidServer command 103.
pub fn activate_npad<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
) -> Result<(), CommandError> {
    send_aruid(dispatch, session, cmds::ACTIVATE_NPAD, aruid).map(drop)
}

/// This is IHidServer command 109 (ActivateNpadWithRevision).
pub fn activate_npad_with_revision<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
    revision: u32,
) -> Result<(), CommandError> {
    send_u32_aruid(dispatch, session, cmds::ACTIVATE_NPAD_WITH_REVISION, revision, aruid)
        .map(drop)
}

/// Returns a handle to the event signaled when the npad's style set changes.
///
/// This is IHidServer command 106.
pub fn acquire_npad_style_set_update_event_handle<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
    id: u32,
) -> Result<RemoteHandle, CommandError> {
    let input = StyleSetUpdateEventIn {
        id,
        pad: 0,
        aruid,
        event_ptr: 0,
    };
    let resp = call(
        dispatch,
        session,
        Request::new(cmds::ACQUIRE_NPAD_STYLE_SET_UPDATE_EVENT_HANDLE)
            .with_data(&input)
            .with_pid(),
    )?;
    resp.copy_handle.ok_or(CommandError::MissingHandle)
}

/// This is IHidServer command 107.
pub fn disconnect_npad<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
    id: u32,
) -> Result<(), CommandError> {
    send_u32_aruid(dispatch, session, cmds::DISCONNECT_NPAD, id, aruid).map(drop)
}

/// This is IHidServer command 108.
pub fn get_player_led_pattern<D: Dispatch>(
    dispatch: &D,
    session: Session,
    id: u32,
) -> Result<u64, CommandError> {
    let resp = call(
        dispatch,
        session,
        Request::new(cmds::GET_PLAYER_LED_PATTERN).with_data(&id),
    )?;
    read_reply(&resp)
}

/// This is IHidServer command 120.
pub fn set_npad_joy_hold_type<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
    hold_type: u64,
) -> Result<(), CommandError> {
    let input = AruidU64 {
        aruid,
        value: hold_type,
    };
    call(
        dispatch,
        session,
        Request::new(cmds::SET_NPAD_JOY_HOLD_TYPE)
            .with_data(&input)
            .with_pid(),
    )
    .map(drop)
}

/// This is IHidServer command 121.
pub fn get_npad_joy_hold_type<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
) -> Result<u64, CommandError> {
    let resp = send_aruid(dispatch, session, cmds::GET_NPAD_JOY_HOLD_TYPE, aruid)?;
    read_reply(&resp)
}

/// This is IHidServer command 122.
pub fn set_npad_joy_assignment_mode_single_by_default<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
    id: u32,
) -> Result<(), CommandError> {
    send_u32_aruid(
        dispatch,
        session,
        cmds::SET_NPAD_JOY_ASSIGNMENT_MODE_SINGLE_BY_DEFAULT,
        id,
        aruid,
    )
    .map(drop)
}

/// This is IHidServer command 123.
pub fn set_npad_joy_assignment_mode_single<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
    id: u32,
    device_type: u64,
) -> Result<(), CommandError> {
    let input = U32AruidU64 {
        value: id,
        pad: 0,
        aruid,
        value64: device_type,
    };
    call(
        dispatch,
        session,
        Request::new(cmds::SET_NPAD_JOY_ASSIGNMENT_MODE_SINGLE)
            .with_data(&input)
            .with_pid(),
    )
    .map(drop)
}

/// This is IHidServer command 124.
pub fn set_npad_joy_assignment_mode_dual<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
    id: u32,
) -> Result<(), CommandError> {
    send_u32_aruid(dispatch, session, cmds::SET_NPAD_JOY_ASSIGNMENT_MODE_DUAL, id, aruid)
        .map(drop)
}

/// This is IHidServer command 125.
pub fn merge_single_joy_as_dual_joy<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
    id0: u32,
    id1: u32,
) -> Result<(), CommandError> {
    let input = U32U32Aruid {
        value0: id0,
        value1: id1,
        aruid,
    };
    call(
        dispatch,
        session,
        Request::new(cmds::MERGE_SINGLE_JOY_AS_DUAL_JOY)
            .with_data(&input)
            .with_pid(),
    )
    .map(drop)
}

/// This is IHidServer command 200.
pub fn get_vibration_device_info<D: Dispatch>(
    dispatch: &D,
    session: Session,
    handle: u32,
) -> Result<VibrationDeviceInfo, CommandError> {
    let resp = call(
        dispatch,
        session,
        Request::new(cmds::GET_VIBRATION_DEVICE_INFO).with_data(&handle),
    )?;
    read_reply(&resp)
}

/// This is IHidServer command 201.
pub fn send_vibration_value<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
    handle: u32,
    value: &VibrationValue,
) -> Result<(), CommandError> {
    let input = SendVibrationValueIn {
        handle,
        value: *value,
        pad: 0,
        aruid,
    };
    call(
        dispatch,
        session,
        Request::new(cmds::SEND_VIBRATION_VALUE)
            .with_data(&input)
            .with_pid(),
    )
    .map(drop)
}

/// This is IHidServer command 202.
pub fn get_actual_vibration_value<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
    handle: u32,
) -> Result<VibrationValue, CommandError> {
    let resp = send_u32_aruid(dispatch, session, cmds::GET_ACTUAL_VIBRATION_VALUE, handle, aruid)?;
    read_reply(&resp)
}

/// Creates an IActiveVibrationDeviceList sub-interface.
///
/// This is IHidServer command 203.
pub fn create_active_vibration_device_list<D: Dispatch>(
    dispatch: &D,
    session: Session,
) -> Result<Session, CommandError> {
    let resp = call(
        dispatch,
        session,
        Request::new(cmds::CREATE_ACTIVE_VIBRATION_DEVICE_LIST),
    )?;
    resp.object.ok_or(CommandError::MissingObject)
}

/// This is IActiveVibrationDeviceList command 0.
pub fn activate_vibration_device<D: Dispatch>(
    dispatch: &D,
    list: Session,
    handle: u32,
) -> Result<(), CommandError> {
    call(
        dispatch,
        list,
        Request::new(vibration_list_cmds::ACTIVATE_VIBRATION_DEVICE).with_data(&handle),
    )
    .map(drop)
}

/// This is IHidServer command 204.
pub fn permit_vibration<D: Dispatch>(
    dispatch: &D,
    session: Session,
    permit: bool,
) -> Result<(), CommandError> {
    let flag = u8::from(permit);
    call(
        dispatch,
        session,
        Request::new(cmds::PERMIT_VIBRATION).with_data(&flag),
    )
    .map(drop)
}

/// This is IHidServer command 205.
pub fn is_vibration_permitted<D: Dispatch>(
    dispatch: &D,
    session: Session,
) -> Result<bool, CommandError> {
    let resp = call(dispatch, session, Request::new(cmds::IS_VIBRATION_PERMITTED))?;
    Ok(read_reply::<u8>(&resp)? & 1 != 0)
}

/// Sends one value per handle, as two parallel in-pointer buffers.
///
/// This is IHidServer command 206.
pub fn send_vibration_values<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
    handles: &[u32],
    values: &[VibrationValue],
) -> Result<(), CommandError> {
    let buffers = [handles.as_bytes(), values.as_bytes()];
    call(
        dispatch,
        session,
        Request::new(cmds::SEND_VIBRATION_VALUES)
            .with_data(&aruid)
            .with_pointers(&buffers),
    )
    .map(drop)
}

/// This is IHidServer command 209.
pub fn begin_permit_vibration_session<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
) -> Result<(), CommandError> {
    call(
        dispatch,
        session,
        Request::new(cmds::BEGIN_PERMIT_VIBRATION_SESSION).with_data(&aruid),
    )
    .map(drop)
}

/// This is IHidServer command 210.
pub fn end_permit_vibration_session<D: Dispatch>(
    dispatch: &D,
    session: Session,
) -> Result<(), CommandError> {
    call(
        dispatch,
        session,
        Request::new(cmds::END_PERMIT_VIBRATION_SESSION),
    )
    .map(drop)
}

/// This is IHidServer command 211.
pub fn is_vibration_device_mounted<D: Dispatch>(
    dispatch: &D,
    session: Session,
    aruid: u64,
    handle: u32,
) -> Result<bool, CommandError> {
    let resp = send_u32_aruid(
        dispatch,
        session,
        cmds::IS_VIBRATION_DEVICE_MOUNTED,
        handle,
        aruid,
    )?;
    Ok(read_reply::<u8>(&resp)? & 1 != 0)
}
