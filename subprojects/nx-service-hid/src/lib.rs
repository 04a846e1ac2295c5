//! Human Input Device (HID) Service Implementation.
//!
//! This crate provides access to the Nintendo Switch's HID service, which handles:
//! - Controller input (Npad)
//! - Touch screen
//! - Keyboard
//! - Mouse
//! - Six-axis sensors (gyroscope/accelerometer)
//! - Vibration/rumble
//! - Gesture recognition
//!
//! The HID service uses shared memory (0x40000 bytes) with lock-free LIFO ring
//! buffers for reading input state. Remote calls go through a [`Dispatch`]
//! implementation and the block is mapped through [`MapSharedMemory`].

#![cfg_attr(not(test), no_std)]

#[cfg(any(test, feature = "emulator"))]
extern crate alloc;

use nx_rt_env::{HosVersion, ResultCode};

pub mod aruid;
mod cmif;
pub mod dispatch;
#[cfg(any(test, feature = "emulator"))]
pub mod emulator;
pub mod handles;
pub mod npad;
mod proto;
pub mod shmem;
pub mod vibration;

use self::{
    aruid::{Aruid, wire},
    dispatch::{Dispatch, MapSharedMemory, RemoteHandle, Session, SharedMemoryMapping},
    handles::{SixAxisSensorHandle, VibrationDeviceHandle},
    npad::{JoyDeviceType, JoyHoldType, NpadIdType, NpadStyleSet},
    shmem::{HidSharedMemory, KeyboardLockKeyEvent, RetryLimit, StateReader},
    vibration::{VibrationDeviceInfo, VibrationValue},
};
pub use self::{cmif::CommandError, proto::SERVICE_NAME};

/// HID service (IHidServer) session wrapper.
///
/// Owns the IHidServer session, its IAppletResource sub-interface and the
/// mapped shared-memory block.
pub struct HidService<D: Dispatch, M: SharedMemoryMapping> {
    dispatch: D,
    session: Session,
    applet_resource: Session,
    mapping: M,
    aruid: Option<Aruid>,
    hos_version: HosVersion,
    retry_limit: RetryLimit,
    vibration_list: spin::Mutex<Option<Session>>,
}

impl<D: Dispatch, M: SharedMemoryMapping> HidService<D, M> {
    /// Connects to the HID service over an already opened IHidServer `session`.
    ///
    /// Creates the IAppletResource sub-interface, fetches the shared-memory
    /// handle from it and maps the block read-only.
    pub fn connect<P>(
        dispatch: D,
        session: Session,
        mapper: &P,
        aruid: Option<Aruid>,
        hos_version: HosVersion,
    ) -> Result<Self, ConnectError>
    where
        P: MapSharedMemory<Mapping = M>,
    {
        let applet_resource = cmif::create_applet_resource(&dispatch, session, wire(aruid))
            .map_err(ConnectError::CreateAppletResource)?;

        let mapping = cmif::get_shared_memory_handle(&dispatch, applet_resource)
            .map_err(ConnectError::GetSharedMemoryHandle)
            .and_then(|handle| {
                mapper
                    .map_read_only(handle, HidSharedMemory::SIZE)
                    .map_err(ConnectError::MapSharedMemory)
            });
        let mapping = match mapping {
            Ok(mapping) => mapping,
            Err(err) => {
                dispatch.close(applet_resource);
                return Err(err);
            }
        };

        log::debug!("hid: shared memory mapped (hos {hos_version})");

        Ok(Self {
            dispatch,
            session,
            applet_resource,
            mapping,
            aruid,
            hos_version,
            retry_limit: RetryLimit::DEFAULT,
            vibration_list: spin::Mutex::new(None),
        })
    }

    /// Sets the retry cap used by [`reader`](Self::reader).
    pub fn with_retry_limit(mut self, limit: RetryLimit) -> Self {
        self.retry_limit = limit;
        self
    }

    /// Returns the underlying session handle.
    #[inline]
    pub fn session(&self) -> Session {
        self.session
    }

    /// Returns the IAppletResource session handle.
    #[inline]
    pub fn applet_resource_session(&self) -> Session {
        self.applet_resource
    }

    #[inline]
    pub fn aruid(&self) -> Option<Aruid> {
        self.aruid
    }

    #[inline]
    pub fn hos_version(&self) -> HosVersion {
        self.hos_version
    }

    /// Get a reference to the shared memory structure.
    #[inline]
    pub fn shared_memory(&self) -> &HidSharedMemory {
        // SAFETY: The mapping guarantees a valid, aligned block that lives as
        // long as `self.mapping`.
        unsafe { self.mapping.as_ptr().as_ref() }
    }

    /// State accessors over the shared memory.
    #[inline]
    pub fn reader(&self) -> StateReader<'_> {
        StateReader::new(self.shared_memory(), self.retry_limit)
    }

    /// Consumes and closes the HID service session and its sub-interfaces.
    pub fn close(self) {
        if let Some(list) = self.vibration_list.lock().take() {
            self.dispatch.close(list);
        }
        self.dispatch.close(self.applet_resource);
        self.dispatch.close(self.session);
    }

    #[inline]
    fn wire_aruid(&self) -> u64 {
        wire(self.aruid)
    }

    fn require(&self, required: HosVersion) -> Result<(), CommandError> {
        if self.hos_version < required {
            return Err(CommandError::IncompatibleVersion { required });
        }
        Ok(())
    }

    /// Activate touch screen input.
    #[inline]
    pub fn activate_touch_screen(&self) -> Result<(), CommandError> {
        cmif::activate_touch_screen(&self.dispatch, self.session, self.wire_aruid())
    }

    /// Activate mouse input.
    #[inline]
    pub fn activate_mouse(&self) -> Result<(), CommandError> {
        cmif::activate_mouse(&self.dispatch, self.session, self.wire_aruid())
    }

    /// Activate keyboard input.
    #[inline]
    pub fn activate_keyboard(&self) -> Result<(), CommandError> {
        cmif::activate_keyboard(&self.dispatch, self.session, self.wire_aruid())
    }

    /// Activate gesture recognition.
    #[inline]
    pub fn activate_gesture(&self) -> Result<(), CommandError> {
        cmif::activate_gesture(&self.dispatch, self.session, self.wire_aruid())
    }

    /// Activate Npad (controller) input.
    ///
    /// Systems before 5.0.0 use the plain command. Newer ones send the highest
    /// revision they understand.
    pub fn activate_npad(&self) -> Result<(), CommandError> {
        match npad_revision(self.hos_version) {
            None => cmif::activate_npad(&self.dispatch, self.session, self.wire_aruid()),
            Some(revision) => cmif::activate_npad_with_revision(
                &self.dispatch,
                self.session,
                self.wire_aruid(),
                revision,
            ),
        }
    }

    /// [6.0.0+]
    pub fn send_keyboard_lock_key_event(
        &self,
        events: KeyboardLockKeyEvent,
    ) -> Result<(), CommandError> {
        self.require(HosVersion::new(6, 0, 0))?;
        cmif::send_keyboard_lock_key_event(
            &self.dispatch,
            self.session,
            self.wire_aruid(),
            events.bits(),
        )
    }

    /// Six-axis sensor handles of `id` for `style`. No remote call is made.
    pub fn six_axis_sensor_handles(
        &self,
        style: NpadStyleSet,
        id: NpadIdType,
        out: &mut [SixAxisSensorHandle],
    ) -> Result<(), CommandError> {
        handles::six_axis_sensor_handles(style, id, out)
    }

    pub fn start_six_axis_sensor(&self, handle: SixAxisSensorHandle) -> Result<(), CommandError> {
        cmif::start_six_axis_sensor(
            &self.dispatch,
            self.session,
            self.wire_aruid(),
            handle.type_value(),
        )
    }

    pub fn stop_six_axis_sensor(&self, handle: SixAxisSensorHandle) -> Result<(), CommandError> {
        cmif::stop_six_axis_sensor(
            &self.dispatch,
            self.session,
            self.wire_aruid(),
            handle.type_value(),
        )
    }

    pub fn is_six_axis_sensor_fusion_enabled(
        &self,
        handle: SixAxisSensorHandle,
    ) -> Result<bool, CommandError> {
        cmif::is_six_axis_sensor_fusion_enabled(
            &self.dispatch,
            self.session,
            self.wire_aruid(),
            handle.type_value(),
        )
    }

    pub fn enable_six_axis_sensor_fusion(
        &self,
        handle: SixAxisSensorHandle,
        enable: bool,
    ) -> Result<(), CommandError> {
        cmif::enable_six_axis_sensor_fusion(
            &self.dispatch,
            self.session,
            self.wire_aruid(),
            handle.type_value(),
            enable,
        )
    }

    /// Sets the sensor-fusion parameters. `parameter0` must lie in `0.0..=1.0`.
    pub fn set_six_axis_sensor_fusion_parameters(
        &self,
        handle: SixAxisSensorHandle,
        parameter0: f32,
        parameter1: f32,
    ) -> Result<(), CommandError> {
        if !(0.0..=1.0).contains(&parameter0) {
            return Err(CommandError::InvalidArgument(
                "fusion parameter must lie in 0.0..=1.0",
            ));
        }
        cmif::set_six_axis_sensor_fusion_parameters(
            &self.dispatch,
            self.session,
            self.wire_aruid(),
            handle.type_value(),
            parameter0,
            parameter1,
        )
    }

    /// Returns both sensor-fusion parameters.
    pub fn six_axis_sensor_fusion_parameters(
        &self,
        handle: SixAxisSensorHandle,
    ) -> Result<(f32, f32), CommandError> {
        let out = cmif::get_six_axis_sensor_fusion_parameters(
            &self.dispatch,
            self.session,
            self.wire_aruid(),
            handle.type_value(),
        )?;
        Ok((out.parameter0, out.parameter1))
    }

    pub fn reset_six_axis_sensor_fusion_parameters(
        &self,
        handle: SixAxisSensorHandle,
    ) -> Result<(), CommandError> {
        cmif::reset_six_axis_sensor_fusion_parameters(
            &self.dispatch,
            self.session,
            self.wire_aruid(),
            handle.type_value(),
        )
    }

    /// Set supported Npad style set.
    #[inline]
    pub fn set_supported_npad_style_set(
        &self,
        style_set: NpadStyleSet,
    ) -> Result<(), CommandError> {
        cmif::set_supported_npad_style_set(
            &self.dispatch,
            self.session,
            self.wire_aruid(),
            style_set.bits(),
        )
    }

    pub fn supported_npad_style_set(&self) -> Result<NpadStyleSet, CommandError> {
        let bits =
            cmif::get_supported_npad_style_set(&self.dispatch, self.session, self.wire_aruid())?;
        Ok(NpadStyleSet::from_bits_retain(bits))
    }

    /// Set supported Npad ID types.
    #[inline]
    pub fn set_supported_npad_id_type(&self, ids: &[NpadIdType]) -> Result<(), CommandError> {
        cmif::set_supported_npad_id_type(&self.dispatch, self.session, self.wire_aruid(), ids)
    }

    /// Handle of the event signaled when the style set of `id` changes.
    pub fn acquire_npad_style_set_update_event_handle(
        &self,
        id: NpadIdType,
    ) -> Result<RemoteHandle, CommandError> {
        cmif::acquire_npad_style_set_update_event_handle(
            &self.dispatch,
            self.session,
            self.wire_aruid(),
            id.to_raw(),
        )
    }

    pub fn disconnect_npad(&self, id: NpadIdType) -> Result<(), CommandError> {
        cmif::disconnect_npad(&self.dispatch, self.session, self.wire_aruid(), id.to_raw())
    }

    /// Bit pattern of the player LEDs for `id`.
    pub fn player_led_pattern(&self, id: NpadIdType) -> Result<u8, CommandError> {
        let pattern = cmif::get_player_led_pattern(&self.dispatch, self.session, id.to_raw())?;
        Ok(pattern as u8)
    }

    pub fn set_npad_joy_hold_type(&self, hold_type: JoyHoldType) -> Result<(), CommandError> {
        cmif::set_npad_joy_hold_type(
            &self.dispatch,
            self.session,
            self.wire_aruid(),
            hold_type as u64,
        )
    }

    pub fn npad_joy_hold_type(&self) -> Result<JoyHoldType, CommandError> {
        let raw = cmif::get_npad_joy_hold_type(&self.dispatch, self.session, self.wire_aruid())?;
        JoyHoldType::from_raw(raw).ok_or(CommandError::MalformedResponse)
    }

    pub fn set_npad_joy_assignment_mode_single_by_default(
        &self,
        id: NpadIdType,
    ) -> Result<(), CommandError> {
        cmif::set_npad_joy_assignment_mode_single_by_default(
            &self.dispatch,
            self.session,
            self.wire_aruid(),
            id.to_raw(),
        )
    }

    pub fn set_npad_joy_assignment_mode_single(
        &self,
        id: NpadIdType,
        device_type: JoyDeviceType,
    ) -> Result<(), CommandError> {
        cmif::set_npad_joy_assignment_mode_single(
            &self.dispatch,
            self.session,
            self.wire_aruid(),
            id.to_raw(),
            device_type as u64,
        )
    }

    pub fn set_npad_joy_assignment_mode_dual(&self, id: NpadIdType) -> Result<(), CommandError> {
        cmif::set_npad_joy_assignment_mode_dual(
            &self.dispatch,
            self.session,
            self.wire_aruid(),
            id.to_raw(),
        )
    }

    pub fn merge_single_joy_as_dual_joy(
        &self,
        id0: NpadIdType,
        id1: NpadIdType,
    ) -> Result<(), CommandError> {
        cmif::merge_single_joy_as_dual_joy(
            &self.dispatch,
            self.session,
            self.wire_aruid(),
            id0.to_raw(),
            id1.to_raw(),
        )
    }

    /// Vibration handles of `id` for `style`. No remote call is made.
    pub fn vibration_device_handles(
        &self,
        style: NpadStyleSet,
        id: NpadIdType,
        out: &mut [VibrationDeviceHandle],
    ) -> Result<(), CommandError> {
        handles::vibration_device_handles(style, id, out)
    }

    /// Derives the vibration handles of `id` for `style` into `out` and
    /// activates each of them.
    ///
    /// The active-device list is created on first use and kept until
    /// [`close`](Self::close).
    pub fn initialize_vibration_devices(
        &self,
        out: &mut [VibrationDeviceHandle],
        id: NpadIdType,
        style: NpadStyleSet,
    ) -> Result<(), CommandError> {
        handles::vibration_device_handles(style, id, out)?;

        let list = {
            let mut guard = self.vibration_list.lock();
            match *guard {
                Some(list) => list,
                None => {
                    let list =
                        cmif::create_active_vibration_device_list(&self.dispatch, self.session)?;
                    log::debug!("hid: active vibration device list created");
                    *guard = Some(list);
                    list
                }
            }
        };

        for handle in out.iter() {
            cmif::activate_vibration_device(&self.dispatch, list, handle.type_value())?;
        }
        Ok(())
    }

    pub fn vibration_device_info(
        &self,
        handle: VibrationDeviceHandle,
    ) -> Result<VibrationDeviceInfo, CommandError> {
        cmif::get_vibration_device_info(&self.dispatch, self.session, handle.type_value())
    }

    pub fn send_vibration_value(
        &self,
        handle: VibrationDeviceHandle,
        value: &VibrationValue,
    ) -> Result<(), CommandError> {
        cmif::send_vibration_value(
            &self.dispatch,
            self.session,
            self.wire_aruid(),
            handle.type_value(),
            value,
        )
    }

    pub fn actual_vibration_value(
        &self,
        handle: VibrationDeviceHandle,
    ) -> Result<VibrationValue, CommandError> {
        cmif::get_actual_vibration_value(
            &self.dispatch,
            self.session,
            self.wire_aruid(),
            handle.type_value(),
        )
    }

    pub fn permit_vibration(&self, permit: bool) -> Result<(), CommandError> {
        cmif::permit_vibration(&self.dispatch, self.session, permit)
    }

    pub fn is_vibration_permitted(&self) -> Result<bool, CommandError> {
        cmif::is_vibration_permitted(&self.dispatch, self.session)
    }

    /// Sends `values[i]` to `handles[i]`. Both slices must have the same length.
    pub fn send_vibration_values(
        &self,
        handles: &[VibrationDeviceHandle],
        values: &[VibrationValue],
    ) -> Result<(), CommandError> {
        if handles.len() != values.len() {
            return Err(CommandError::InvalidArgument(
                "one vibration value is needed per handle",
            ));
        }

        let mut raw = [0u32; MAX_VIBRATION_VALUES];
        let Some(raw) = raw.get_mut(..handles.len()) else {
            return Err(CommandError::InvalidArgument("too many vibration handles"));
        };
        for (slot, handle) in raw.iter_mut().zip(handles) {
            *slot = handle.type_value();
        }

        cmif::send_vibration_values(&self.dispatch, self.session, self.wire_aruid(), raw, values)
    }

    /// [4.0.0+]
    pub fn begin_permit_vibration_session(&self) -> Result<(), CommandError> {
        self.require(HosVersion::new(4, 0, 0))?;
        cmif::begin_permit_vibration_session(&self.dispatch, self.session, self.wire_aruid())
    }

    /// [4.0.0+]
    pub fn end_permit_vibration_session(&self) -> Result<(), CommandError> {
        self.require(HosVersion::new(4, 0, 0))?;
        cmif::end_permit_vibration_session(&self.dispatch, self.session)
    }

    /// [7.0.0+]
    pub fn is_vibration_device_mounted(
        &self,
        handle: VibrationDeviceHandle,
    ) -> Result<bool, CommandError> {
        self.require(HosVersion::new(7, 0, 0))?;
        cmif::is_vibration_device_mounted(
            &self.dispatch,
            self.session,
            self.wire_aruid(),
            handle.type_value(),
        )
    }
}

/// Most handles sent in one SendVibrationValues request.
const MAX_VIBRATION_VALUES: usize = 32;

/// ActivateNpadWithRevision revision for `hos`, or `None` for the plain command.
fn npad_revision(hos: HosVersion) -> Option<u32> {
    let revision = if hos < HosVersion::new(5, 0, 0) {
        return None;
    } else if hos < HosVersion::new(6, 0, 0) {
        1
    } else if hos < HosVersion::new(8, 0, 0) {
        2
    } else if hos < HosVersion::new(18, 0, 0) {
        3
    } else {
        5
    };
    Some(revision)
}

/// Error returned by [`HidService::connect`].
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// Failed to create applet resource.
    #[error("failed to create applet resource")]
    CreateAppletResource(#[source] CommandError),
    /// Failed to get shared memory handle.
    #[error("failed to get shared memory handle")]
    GetSharedMemoryHandle(#[source] CommandError),
    /// Failed to map shared memory.
    #[error("failed to map shared memory")]
    MapSharedMemory(#[source] ResultCode),
}
