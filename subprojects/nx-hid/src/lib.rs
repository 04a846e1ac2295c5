//! Frame-synchronized input on top of the HID service.
//!
//! [`Hid`] reads one consistent input frame per [`scan_input`](Hid::scan_input)
//! call and answers held/pressed/released queries for controllers, mouse,
//! keyboard and touch screen from that frame. Analog sticks, touch points and
//! the mouse position come from the same frame. Six-axis values and mouse
//! history are read from shared memory at query time.
//!
//! ```ignore
//! let hid = Hid::connect(dispatch, session, &mapper, &env, aruid, ScanConfig::default())?;
//! loop {
//!     hid.scan_input();
//!     if hid.keys_down(ControllerId::P1Auto).contains(NpadButton::PLUS) {
//!         break;
//!     }
//! }
//! ```

#![cfg_attr(not(test), no_std)]

#[cfg(test)]
extern crate alloc;

use nx_rt_env::Env;
use nx_service_hid::{
    ConnectError, HidService,
    aruid::Aruid,
    dispatch::{Dispatch, MapSharedMemory, Session, SharedMemoryMapping},
    handles::SixAxisSensorHandle,
    npad::{DeviceType, NpadAttribute, NpadButton, NpadStyleSet},
    shmem::{
        AnalogStickState, KeyboardKey, KeyboardModifier, LIFO_CAPACITY, MouseButton, MouseState,
        NpadCommonState, SixAxisSensorState,
    },
};

mod config;
mod controller;
mod frame;
mod scan;

use self::{
    controller::{HANDHELD_SLOT, SLOT_NPAD_IDS},
    frame::Frame,
};
pub use self::{
    config::ScanConfig,
    controller::ControllerId,
    frame::{JoystickSide, MousePosition, SixAxisSensorValues, TouchPosition},
    scan::ActivateError,
};

/// Input context: the HID service plus the state of the last scanned frame.
///
/// Scans take the frame lock exclusively. Queries take it shared for one read.
pub struct Hid<D: Dispatch, M: SharedMemoryMapping> {
    service: HidService<D, M>,
    config: ScanConfig,
    frame: spin::RwLock<Frame>,
}

impl<D: Dispatch, M: SharedMemoryMapping> Hid<D, M> {
    /// Wraps a connected service. Nothing is activated until the first scan.
    pub fn new(service: HidService<D, M>, config: ScanConfig) -> Self {
        Self {
            service: service.with_retry_limit(config.retry_limit()),
            config,
            frame: spin::RwLock::new(Frame::new()),
        }
    }

    /// Connects to the HID service using the system version recorded in `env`.
    ///
    /// An environment without a version entry is treated as 0.0.0.
    pub fn connect<P>(
        dispatch: D,
        session: Session,
        mapper: &P,
        env: &Env,
        aruid: Option<Aruid>,
        config: ScanConfig,
    ) -> Result<Self, ConnectError>
    where
        P: MapSharedMemory<Mapping = M>,
    {
        let hos_version = env.hos_version().unwrap_or_default();
        let service = HidService::connect(dispatch, session, mapper, aruid, hos_version)?;
        Ok(Self::new(service, config))
    }

    #[inline]
    pub fn service(&self) -> &HidService<D, M> {
        &self.service
    }

    #[inline]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Closes the service session.
    pub fn close(self) {
        self.service.close();
    }

    fn read_frame<R>(&self, f: impl FnOnce(&Frame) -> R) -> R {
        f(&*self.frame.read())
    }

    /// Buttons held on `id` in the last frame.
    pub fn keys_held(&self, id: ControllerId) -> NpadButton {
        self.read_frame(|frame| frame.buttons[frame.slot(id)].held)
    }

    /// Buttons pressed on `id` since the previous frame.
    pub fn keys_down(&self, id: ControllerId) -> NpadButton {
        self.read_frame(|frame| frame.buttons[frame.slot(id)].down)
    }

    /// Buttons released on `id` since the previous frame.
    pub fn keys_up(&self, id: ControllerId) -> NpadButton {
        self.read_frame(|frame| frame.buttons[frame.slot(id)].up)
    }

    pub fn is_controller_connected(&self, id: ControllerId) -> bool {
        self.read_frame(|frame| {
            frame.entries[frame.slot(id)]
                .attributes
                .contains(NpadAttribute::IS_CONNECTED)
        })
    }

    /// Styles the service currently reports for `id`.
    pub fn controller_style(&self, id: ControllerId) -> NpadStyleSet {
        let slot = self.read_frame(|frame| frame.slot(id));
        self.service.reader().style_set(SLOT_NPAD_IDS[slot])
    }

    pub fn joystick_read(&self, id: ControllerId, side: JoystickSide) -> AnalogStickState {
        self.read_frame(|frame| {
            let entry = &frame.entries[frame.slot(id)];
            match side {
                JoystickSide::Left => entry.analog_stick_l,
                JoystickSide::Right => entry.analog_stick_r,
            }
        })
    }

    /// The state of `id` stored by the last frame.
    pub fn npad_state(&self, id: ControllerId) -> NpadCommonState {
        self.read_frame(|frame| frame.entries[frame.slot(id)])
    }

    /// Whether [`ControllerId::P1Auto`] currently resolves to the handheld slot.
    pub fn handheld_mode(&self) -> bool {
        self.read_frame(|frame| frame.p1_auto_slot == HANDHELD_SLOT)
    }

    pub fn mouse_buttons_held(&self) -> MouseButton {
        self.read_frame(|frame| frame.mouse_buttons.held)
    }

    pub fn mouse_buttons_down(&self) -> MouseButton {
        self.read_frame(|frame| frame.mouse_buttons.down)
    }

    pub fn mouse_buttons_up(&self) -> MouseButton {
        self.read_frame(|frame| frame.mouse_buttons.up)
    }

    /// Mouse position and motion of the last frame.
    pub fn mouse_read(&self) -> MousePosition {
        self.read_frame(|frame| MousePosition::from(&frame.mouse))
    }

    /// Reads up to 17 recent mouse snapshots straight from shared memory.
    ///
    /// `out[0]` receives the oldest. Returns the number of entries written;
    /// the rest of `out` is zeroed.
    pub fn mouse_multi_read(&self, out: &mut [MousePosition]) -> usize {
        out.fill(MousePosition::default());

        let mut states = [MouseState::default(); LIFO_CAPACITY];
        let requested = out.len().min(LIFO_CAPACITY);
        let total = self.service.reader().mouse_states(&mut states[..requested]);

        for (position, state) in out.iter_mut().zip(&states[..total]) {
            *position = MousePosition::from(state);
        }
        total
    }

    /// Whether any of `modifier` is held.
    pub fn keyboard_modifier_held(&self, modifier: KeyboardModifier) -> bool {
        self.read_frame(|frame| frame.modifiers.held.intersects(modifier))
    }

    pub fn keyboard_modifier_down(&self, modifier: KeyboardModifier) -> bool {
        self.read_frame(|frame| frame.modifiers.down.intersects(modifier))
    }

    pub fn keyboard_modifier_up(&self, modifier: KeyboardModifier) -> bool {
        self.read_frame(|frame| frame.modifiers.up.intersects(modifier))
    }

    pub fn keyboard_held(&self, key: KeyboardKey) -> bool {
        self.read_frame(|frame| frame.keys.held.contains(key))
    }

    pub fn keyboard_down(&self, key: KeyboardKey) -> bool {
        self.read_frame(|frame| frame.keys.down.contains(key))
    }

    pub fn keyboard_up(&self, key: KeyboardKey) -> bool {
        self.read_frame(|frame| frame.keys.up.contains(key))
    }

    /// Number of fingers on the touch screen in the last frame.
    pub fn touch_count(&self) -> usize {
        self.read_frame(|frame| frame.touch.touches().len())
    }

    /// Touch point `index` of the last frame, zeroed when out of range.
    pub fn touch_read(&self, index: usize) -> TouchPosition {
        self.read_frame(|frame| {
            frame
                .touch
                .touches()
                .get(index)
                .map(TouchPosition::from)
                .unwrap_or_default()
        })
    }

    /// Reads recent motion sensor values of `id` straight from shared memory.
    ///
    /// The sensor is picked from the lowest style bit of the npad. A detached
    /// Joy-Con pair reports the left or right sensor depending on which device
    /// is attached; with neither, nothing is read. Styles without a sensor
    /// yield 0. `out[0]` receives the oldest value and the rest of `out` is zeroed.
    pub fn six_axis_sensor_values(
        &self,
        id: ControllerId,
        out: &mut [SixAxisSensorValues],
    ) -> usize {
        out.fill(SixAxisSensorValues::default());
        if out.is_empty() {
            return 0;
        }

        let npad_id = SLOT_NPAD_IDS[self.read_frame(|frame| frame.slot(id))];
        let reader = self.service.reader();
        let style = reader.style_set(npad_id).lowest();

        let (handle_count, handle_idx) = if style == NpadStyleSet::JOY_DUAL {
            let device_type = reader.device_type(npad_id);
            if device_type.contains(DeviceType::JOY_LEFT) {
                (2, 0)
            } else if device_type.contains(DeviceType::JOY_RIGHT) {
                (2, 1)
            } else {
                return 0;
            }
        } else {
            (1, 0)
        };

        let mut handles = [SixAxisSensorHandle::new(); 2];
        if self
            .service
            .six_axis_sensor_handles(style, npad_id, &mut handles[..handle_count])
            .is_err()
        {
            return 0;
        }

        let mut states = [SixAxisSensorState::default(); LIFO_CAPACITY];
        let requested = out.len().min(LIFO_CAPACITY);
        let total = reader.six_axis_sensor_states(handles[handle_idx], &mut states[..requested]);

        for (values, state) in out.iter_mut().zip(&states[..total]) {
            *values = SixAxisSensorValues::from(state);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use alloc::{sync::Arc, vec, vec::Vec};

    use nx_rt_env::{ConfigEntry, EntryType, HosVersion, ResultCode};
    use nx_service_hid::{
        CommandError,
        dispatch::DispatchError,
        emulator::{BufferMapper, RecordingServer, SharedMemoryBuffer},
        npad::{JoyHoldType, NpadIdType},
        shmem::{KeyboardKeys, KeyboardState, TouchScreenState, TouchState, Vector},
    };
    use proptest::prelude::*;

    use super::*;

    type TestHid<'a> = Hid<&'a RecordingServer, Arc<SharedMemoryBuffer>>;

    const ACTIVATE_TOUCH_SCREEN: u32 = 11;
    const ACTIVATE_MOUSE: u32 = 21;
    const ACTIVATE_KEYBOARD: u32 = 31;
    const SET_SUPPORTED_NPAD_STYLE_SET: u32 = 100;
    const SET_SUPPORTED_NPAD_ID_TYPE: u32 = 102;
    const ACTIVATE_NPAD: u32 = 103;
    const ACTIVATE_NPAD_WITH_REVISION: u32 = 109;
    const SET_NPAD_JOY_HOLD_TYPE: u32 = 120;
    const SET_NPAD_JOY_ASSIGNMENT_MODE_DUAL: u32 = 124;

    fn env(hos: HosVersion) -> Env {
        Env::parse(&[
            ConfigEntry::new(EntryType::HosVersion, 0, [u64::from(hos.as_u32()), 0]),
            ConfigEntry::new(EntryType::EndOfList, 0, [0, 0]),
        ])
        .unwrap()
    }

    fn connect_with<'a>(
        server: &'a RecordingServer,
        buffer: &Arc<SharedMemoryBuffer>,
        env: &Env,
        config: ScanConfig,
    ) -> TestHid<'a> {
        let mapper = BufferMapper::new(Arc::clone(buffer));
        Hid::connect(
            server,
            RecordingServer::HID_SESSION,
            &mapper,
            env,
            Aruid::new(0x1234),
            config,
        )
        .unwrap()
    }

    fn connect<'a>(server: &'a RecordingServer, buffer: &Arc<SharedMemoryBuffer>) -> TestHid<'a> {
        connect_with(
            server,
            buffer,
            &env(HosVersion::new(12, 0, 0)),
            ScanConfig::default(),
        )
    }

    fn connected(sampling_number: u64, buttons: NpadButton) -> NpadCommonState {
        NpadCommonState {
            sampling_number,
            buttons,
            attributes: NpadAttribute::IS_CONNECTED,
            ..Default::default()
        }
    }

    fn touches(sampling_number: u64, points: &[(u32, u32)]) -> TouchScreenState {
        let mut state = TouchScreenState {
            sampling_number,
            count: points.len() as i32,
            ..Default::default()
        };
        for (i, &(x, y)) in points.iter().enumerate() {
            state.touches[i] = TouchState {
                finger_id: i as u32,
                x,
                y,
                diameter_x: 10,
                diameter_y: 12,
                rotation_angle: 90,
                ..Default::default()
            };
        }
        state
    }

    #[test]
    fn test_queries_are_zero_before_first_scan() {
        let server = RecordingServer::new();
        let buffer = Arc::new(SharedMemoryBuffer::new());
        let hid = connect(&server, &buffer);

        for id in ControllerId::SLOTS.into_iter().chain([ControllerId::P1Auto]) {
            assert_eq!(hid.keys_held(id), NpadButton::empty());
            assert_eq!(hid.keys_down(id), NpadButton::empty());
            assert_eq!(hid.keys_up(id), NpadButton::empty());
            assert!(!hid.is_controller_connected(id));
        }
        assert!(hid.handheld_mode());
        assert_eq!(hid.mouse_read(), MousePosition::default());
        assert_eq!(hid.touch_count(), 0);
        assert!(!hid.keyboard_modifier_held(KeyboardModifier::all()));

        // Only the connection requests so far.
        assert_eq!(server.requests().len(), 2);
    }

    #[test]
    fn test_first_scan_with_no_data_is_zero() {
        let server = RecordingServer::new();
        let buffer = Arc::new(SharedMemoryBuffer::new());
        let hid = connect(&server, &buffer);

        hid.scan_input();

        for id in ControllerId::SLOTS {
            assert_eq!(hid.keys_held(id), NpadButton::empty());
            assert_eq!(hid.keys_down(id), NpadButton::empty());
            assert_eq!(hid.keys_up(id), NpadButton::empty());
        }
        assert_eq!(hid.mouse_buttons_held(), MouseButton::empty());
        assert!(!hid.keyboard_held(KeyboardKey::A));
    }

    #[test]
    fn test_first_scan_activates_once() {
        let server = RecordingServer::new();
        let buffer = Arc::new(SharedMemoryBuffer::new());
        let hid = connect(&server, &buffer);

        hid.scan_input();
        hid.scan_input();

        let mut expected = vec![
            0,
            ACTIVATE_NPAD_WITH_REVISION,
            ACTIVATE_TOUCH_SCREEN,
            ACTIVATE_KEYBOARD,
            ACTIVATE_MOUSE,
            SET_SUPPORTED_NPAD_STYLE_SET,
            SET_SUPPORTED_NPAD_ID_TYPE,
        ];
        expected.extend([SET_NPAD_JOY_ASSIGNMENT_MODE_DUAL; 8]);
        expected.push(SET_NPAD_JOY_HOLD_TYPE);
        assert_eq!(server.commands_on(RecordingServer::HID_SESSION), expected);

        let ids = server
            .last_request(RecordingServer::HID_SESSION, SET_SUPPORTED_NPAD_ID_TYPE)
            .unwrap();
        let raw: Vec<u8> = [0u32, 1, 2, 3, 4, 5, 6, 7, 0x20]
            .iter()
            .flat_map(|id| id.to_le_bytes())
            .collect();
        assert_eq!(ids.in_pointers, [raw]);
    }

    #[test]
    fn test_activation_without_version_uses_plain_npad_command() {
        let server = RecordingServer::new();
        let buffer = Arc::new(SharedMemoryBuffer::new());
        let hid = connect_with(&server, &buffer, &Env::nso(0xF001), ScanConfig::default());

        hid.scan_input();

        let commands = server.commands_on(RecordingServer::HID_SESSION);
        assert_eq!(commands[1], ACTIVATE_NPAD);
        assert!(!commands.contains(&ACTIVATE_NPAD_WITH_REVISION));
    }

    #[test]
    fn test_activation_follows_config() {
        let server = RecordingServer::new();
        let buffer = Arc::new(SharedMemoryBuffer::new());
        let config = ScanConfig::new()
            .with_npad_ids(&[NpadIdType::No1, NpadIdType::No2])
            .with_dual_mode_ids(&[NpadIdType::No2])
            .with_hold_type(JoyHoldType::Horizontal);
        let hid = connect_with(&server, &buffer, &env(HosVersion::new(12, 0, 0)), config);

        hid.try_scan_input().unwrap();

        let commands = server.commands_on(RecordingServer::HID_SESSION);
        let dual = commands
            .iter()
            .filter(|&&cmd| cmd == SET_NPAD_JOY_ASSIGNMENT_MODE_DUAL)
            .count();
        assert_eq!(dual, 1);
        assert_eq!(commands.last(), Some(&SET_NPAD_JOY_HOLD_TYPE));

        let ids = server
            .last_request(RecordingServer::HID_SESSION, SET_SUPPORTED_NPAD_ID_TYPE)
            .unwrap();
        assert_eq!(ids.in_pointers, [vec![0, 0, 0, 0, 1, 0, 0, 0]]);
    }

    #[test]
    fn test_activation_failure_is_returned_and_retried() {
        let server = RecordingServer::new();
        let buffer = Arc::new(SharedMemoryBuffer::new());
        let hid = connect(&server, &buffer);
        let rc = ResultCode::from_parts(202, 1);
        server.reject(ACTIVATE_KEYBOARD, rc);

        let err = hid.try_scan_input().unwrap_err();
        assert!(matches!(err, ActivateError::Keyboard(_)));
        assert_eq!(
            err.command_error(),
            CommandError::Dispatch(DispatchError::Rejected(rc))
        );
        assert!(
            !server
                .commands_on(RecordingServer::HID_SESSION)
                .contains(&ACTIVATE_MOUSE)
        );

        assert!(hid.try_scan_input().is_err());
        let npad_activations = server
            .commands_on(RecordingServer::HID_SESSION)
            .into_iter()
            .filter(|&cmd| cmd == ACTIVATE_NPAD_WITH_REVISION)
            .count();
        assert_eq!(npad_activations, 2);
    }

    #[test]
    #[should_panic(expected = "hid: input activation failed")]
    fn test_scan_input_panics_on_activation_failure() {
        let server = RecordingServer::new();
        let buffer = Arc::new(SharedMemoryBuffer::new());
        let hid = connect(&server, &buffer);
        server.reject(SET_NPAD_JOY_HOLD_TYPE, ResultCode::from_parts(202, 1));

        hid.scan_input();
    }

    #[test]
    fn test_button_edges_across_frames() {
        let server = RecordingServer::new();
        let buffer = Arc::new(SharedMemoryBuffer::new());
        let hid = connect(&server, &buffer);
        let npad = &buffer.memory().npad[0];
        npad.set_style_set(NpadStyleSet::FULL_KEY);

        npad.full_key_lifo.push(connected(1, NpadButton::A));
        hid.scan_input();
        assert_eq!(hid.keys_held(ControllerId::Player1), NpadButton::A);
        assert_eq!(hid.keys_down(ControllerId::Player1), NpadButton::A);

        let pressed = NpadButton::A | NpadButton::B;
        npad.full_key_lifo.push(connected(2, pressed));
        hid.scan_input();
        assert_eq!(hid.keys_held(ControllerId::Player1), pressed);
        assert_eq!(hid.keys_down(ControllerId::Player1), NpadButton::B);
        assert_eq!(hid.keys_up(ControllerId::Player1), NpadButton::empty());

        // No new snapshot: the newest one is read again.
        hid.scan_input();
        assert_eq!(hid.keys_held(ControllerId::Player1), pressed);
        assert_eq!(hid.keys_down(ControllerId::Player1), NpadButton::empty());

        npad.full_key_lifo.push(connected(3, NpadButton::B));
        hid.scan_input();
        assert_eq!(hid.keys_up(ControllerId::Player1), NpadButton::A);
        assert_eq!(hid.keys_held(ControllerId::P1Auto), NpadButton::B);
        assert!(hid.is_controller_connected(ControllerId::Player1));
        assert!(!hid.handheld_mode());
    }

    #[test]
    fn test_p1_auto_falls_back_to_handheld() {
        let server = RecordingServer::new();
        let buffer = Arc::new(SharedMemoryBuffer::new());
        let hid = connect(&server, &buffer);
        let memory = buffer.memory();

        memory.npad[1].set_style_set(NpadStyleSet::FULL_KEY);
        memory.npad[1].full_key_lifo.push(connected(1, NpadButton::Y));
        memory.npad[8].set_style_set(NpadStyleSet::HANDHELD);
        memory.npad[8].handheld_lifo.push(connected(1, NpadButton::X));

        hid.scan_input();

        assert!(hid.handheld_mode());
        assert_eq!(hid.keys_held(ControllerId::P1Auto), NpadButton::X);
        assert_eq!(hid.keys_held(ControllerId::Player2), NpadButton::Y);
        assert!(hid.is_controller_connected(ControllerId::Player2));
        assert!(!hid.is_controller_connected(ControllerId::Player1));
    }

    #[test]
    fn test_style_priority_and_system_remap() {
        let server = RecordingServer::new();
        let buffer = Arc::new(SharedMemoryBuffer::new());
        let hid = connect(&server, &buffer);
        let memory = buffer.memory();

        let npad = &memory.npad[2];
        npad.set_style_set(NpadStyleSet::FULL_KEY | NpadStyleSet::SYSTEM_EXT);
        npad.full_key_lifo.push(connected(1, NpadButton::A));
        npad.system_ext_lifo.push(connected(1, NpadButton::MINUS));

        memory.npad[3].set_style_set(NpadStyleSet::SYSTEM);
        let mut raw = connected(1, NpadButton::LEFT | NpadButton::ZL | NpadButton::PLUS);
        raw.analog_stick_l = AnalogStickState { x: 100, y: -100 };
        memory.npad[3].system_ext_lifo.push(raw);

        hid.scan_input();

        assert_eq!(hid.keys_held(ControllerId::Player3), NpadButton::MINUS);
        assert_eq!(
            hid.keys_held(ControllerId::Player4),
            NpadButton::LEFT | NpadButton::L
        );
        assert_eq!(
            hid.joystick_read(ControllerId::Player4, JoystickSide::Left),
            AnalogStickState::default()
        );
        assert_eq!(
            hid.controller_style(ControllerId::Player4),
            NpadStyleSet::SYSTEM
        );
    }

    #[test]
    fn test_joystick_and_entry_come_from_frame() {
        let server = RecordingServer::new();
        let buffer = Arc::new(SharedMemoryBuffer::new());
        let hid = connect(&server, &buffer);
        let npad = &buffer.memory().npad[4];
        npad.set_style_set(NpadStyleSet::JOY_DUAL);

        let mut state = connected(7, NpadButton::ZR);
        state.analog_stick_l = AnalogStickState { x: -0x7FFF, y: 12 };
        state.analog_stick_r = AnalogStickState { x: 5, y: 0x7FFF };
        npad.joy_dual_lifo.push(state);

        hid.scan_input();
        npad.joy_dual_lifo.push(connected(8, NpadButton::empty()));

        assert_eq!(
            hid.joystick_read(ControllerId::Player5, JoystickSide::Left),
            AnalogStickState { x: -0x7FFF, y: 12 }
        );
        assert_eq!(
            hid.joystick_read(ControllerId::Player5, JoystickSide::Right),
            AnalogStickState { x: 5, y: 0x7FFF }
        );
        assert_eq!(hid.npad_state(ControllerId::Player5), state);
    }

    #[test]
    fn test_touch_sets_handheld_touch_button() {
        let server = RecordingServer::new();
        let buffer = Arc::new(SharedMemoryBuffer::new());
        let hid = connect(&server, &buffer);
        let touch = &buffer.memory().touch_screen.lifo;

        touch.push(touches(1, &[(100, 200), (300, 400)]));
        hid.scan_input();

        let held = hid.keys_held(ControllerId::Handheld);
        assert!(held.contains(NpadButton::TOUCH));
        let down = hid.keys_down(ControllerId::P1Auto);
        assert!(down.contains(NpadButton::TOUCH));
        assert_eq!(hid.touch_count(), 2);
        assert_eq!(
            hid.touch_read(1),
            TouchPosition {
                id: 1,
                x: 300,
                y: 400,
                diameter_x: 10,
                diameter_y: 12,
                angle: 90,
            }
        );
        assert_eq!(hid.touch_read(2), TouchPosition::default());

        touch.push(touches(2, &[]));
        hid.scan_input();
        assert_eq!(hid.touch_count(), 0);
        assert_eq!(hid.keys_up(ControllerId::Handheld), NpadButton::TOUCH);
    }

    #[test]
    fn test_negative_touch_count_reads_as_no_touch() {
        let server = RecordingServer::new();
        let buffer = Arc::new(SharedMemoryBuffer::new());
        let hid = connect(&server, &buffer);

        let mut state = touches(1, &[(1, 1)]);
        state.count = -3;
        buffer.memory().touch_screen.lifo.push(state);
        hid.scan_input();

        assert_eq!(hid.touch_count(), 0);
        assert_eq!(hid.keys_held(ControllerId::Handheld), NpadButton::empty());
    }

    #[test]
    fn test_mouse_and_keyboard_edges() {
        let server = RecordingServer::new();
        let buffer = Arc::new(SharedMemoryBuffer::new());
        let hid = connect(&server, &buffer);
        let memory = buffer.memory();

        memory.mouse.lifo.push(MouseState {
            sampling_number: 1,
            x: 640,
            y: 360,
            delta_x: -4,
            delta_y: 2,
            wheel_delta_x: 0,
            wheel_delta_y: 120,
            buttons: MouseButton::LEFT,
            ..Default::default()
        });
        let mut keys = KeyboardKeys::default();
        keys.insert(KeyboardKey::A);
        memory.keyboard.lifo.push(KeyboardState {
            sampling_number: 1,
            modifiers: KeyboardModifier::SHIFT,
            keys,
        });
        hid.scan_input();

        assert_eq!(
            hid.mouse_read(),
            MousePosition {
                x: 640,
                y: 360,
                velocity_x: -4,
                velocity_y: 2,
                scroll_velocity_x: 0,
                scroll_velocity_y: 120,
            }
        );
        assert_eq!(hid.mouse_buttons_down(), MouseButton::LEFT);
        assert!(hid.keyboard_held(KeyboardKey::A));
        assert!(hid.keyboard_down(KeyboardKey::A));
        assert!(!hid.keyboard_held(KeyboardKey::Z));
        let modifiers = KeyboardModifier::SHIFT | KeyboardModifier::CONTROL;
        assert!(hid.keyboard_modifier_down(modifiers));

        memory.mouse.lifo.push(MouseState {
            sampling_number: 2,
            ..Default::default()
        });
        memory.keyboard.lifo.push(KeyboardState {
            sampling_number: 2,
            ..Default::default()
        });
        hid.scan_input();

        assert_eq!(hid.mouse_buttons_held(), MouseButton::empty());
        assert_eq!(hid.mouse_buttons_up(), MouseButton::LEFT);
        assert!(hid.keyboard_up(KeyboardKey::A));
        assert!(!hid.keyboard_down(KeyboardKey::A));
        assert!(hid.keyboard_modifier_up(KeyboardModifier::SHIFT));
        assert!(!hid.keyboard_modifier_held(KeyboardModifier::SHIFT));
    }

    #[test]
    fn test_mouse_multi_read_is_oldest_first() {
        let server = RecordingServer::new();
        let buffer = Arc::new(SharedMemoryBuffer::new());
        let hid = connect(&server, &buffer);

        for n in 1..=3 {
            buffer.memory().mouse.lifo.push(MouseState {
                sampling_number: n,
                x: n as i32,
                ..Default::default()
            });
        }

        let mut out = [MousePosition {
            x: -1,
            ..Default::default()
        }; 5];
        assert_eq!(hid.mouse_multi_read(&mut out), 3);
        assert_eq!(out.map(|position| position.x), [1, 2, 3, 0, 0]);
    }

    #[test]
    fn test_reset_clears_frame_without_reactivating() {
        let server = RecordingServer::new();
        let buffer = Arc::new(SharedMemoryBuffer::new());
        let hid = connect(&server, &buffer);
        let npad = &buffer.memory().npad[0];
        npad.set_style_set(NpadStyleSet::FULL_KEY);
        npad.full_key_lifo.push(connected(1, NpadButton::A));

        hid.scan_input();
        let requests = server.requests().len();
        hid.reset();

        assert_eq!(hid.keys_held(ControllerId::Player1), NpadButton::empty());
        assert!(hid.handheld_mode());

        hid.scan_input();
        assert_eq!(hid.keys_down(ControllerId::Player1), NpadButton::A);
        assert_eq!(server.requests().len(), requests);
    }

    fn motion(sampling_number: u64, x: f32) -> SixAxisSensorState {
        SixAxisSensorState {
            sampling_number,
            acceleration: Vector { x, y: 0.0, z: 1.0 },
            angular_velocity: Vector { x: 0.0, y: x, z: 0.0 },
            ..Default::default()
        }
    }

    #[test]
    fn test_six_axis_reads_full_key_sensor() {
        let server = RecordingServer::new();
        let buffer = Arc::new(SharedMemoryBuffer::new());
        let hid = connect(&server, &buffer);
        let npad = &buffer.memory().npad[0];
        npad.set_style_set(NpadStyleSet::FULL_KEY);
        npad.full_key_six_axis_lifo.push(motion(1, 0.5));
        npad.full_key_six_axis_lifo.push(motion(2, 0.75));

        let mut out = [SixAxisSensorValues::default(); 3];
        let player = ControllerId::Player1;
        assert_eq!(hid.six_axis_sensor_values(player, &mut out), 2);
        assert_eq!(out[0].accelerometer.x, 0.5);
        assert_eq!(out[1].gyroscope.y, 0.75);
        assert_eq!(out[2], SixAxisSensorValues::default());
    }

    #[test]
    fn test_six_axis_joy_dual_reads_attached_side() {
        let server = RecordingServer::new();
        let buffer = Arc::new(SharedMemoryBuffer::new());
        let hid = connect(&server, &buffer);
        let npad = &buffer.memory().npad[1];
        npad.set_style_set(NpadStyleSet::JOY_DUAL);
        npad.joy_dual_left_six_axis_lifo.push(motion(1, -1.0));
        npad.joy_dual_right_six_axis_lifo.push(motion(1, 1.0));

        let mut out = [SixAxisSensorValues::default(); 1];
        let player = ControllerId::Player2;

        npad.set_device_type(DeviceType::JOY_RIGHT);
        assert_eq!(hid.six_axis_sensor_values(player, &mut out), 1);
        assert_eq!(out[0].accelerometer.x, 1.0);

        npad.set_device_type(DeviceType::JOY_LEFT | DeviceType::JOY_RIGHT);
        assert_eq!(hid.six_axis_sensor_values(player, &mut out), 1);
        assert_eq!(out[0].accelerometer.x, -1.0);

        npad.set_device_type(DeviceType::empty());
        assert_eq!(hid.six_axis_sensor_values(player, &mut out), 0);
        assert_eq!(out[0], SixAxisSensorValues::default());
    }

    #[test]
    fn test_six_axis_without_sensor_reads_nothing() {
        let server = RecordingServer::new();
        let buffer = Arc::new(SharedMemoryBuffer::new());
        let hid = connect(&server, &buffer);
        let mut out = [SixAxisSensorValues::default(); 2];

        let auto = ControllerId::P1Auto;
        assert_eq!(hid.six_axis_sensor_values(auto, &mut out), 0);

        buffer.memory().npad[0].set_style_set(NpadStyleSet::SYSTEM_EXT);
        let player = ControllerId::Player1;
        assert_eq!(hid.six_axis_sensor_values(player, &mut out), 0);
        assert_eq!(hid.six_axis_sensor_values(player, &mut []), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn test_scanned_edges_follow_held_masks(
            masks in proptest::collection::vec(any::<u32>(), 1..12),
        ) {
            let server = RecordingServer::new();
            let buffer = Arc::new(SharedMemoryBuffer::new());
            let hid = connect(&server, &buffer);
            let npad = &buffer.memory().npad[0];
            npad.set_style_set(NpadStyleSet::FULL_KEY);

            let mut previous = NpadButton::empty();
            for (n, mask) in masks.into_iter().enumerate() {
                let held = NpadButton::from_bits_retain(u64::from(mask));
                npad.full_key_lifo.push(connected(n as u64 + 1, held));
                hid.scan_input();

                let down = hid.keys_down(ControllerId::Player1);
                let up = hid.keys_up(ControllerId::Player1);
                prop_assert_eq!(hid.keys_held(ControllerId::Player1), held);
                prop_assert_eq!(down.bits(), !previous.bits() & held.bits());
                prop_assert_eq!(up.bits(), previous.bits() & !held.bits());
                prop_assert!(!down.intersects(up));
                previous = held;
            }
        }
    }
}
