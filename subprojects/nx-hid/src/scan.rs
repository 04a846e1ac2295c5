//! Frame synchronization.

use nx_service_hid::{
    CommandError,
    dispatch::{Dispatch, SharedMemoryMapping},
    npad::{NpadButton, NpadIdType, NpadStyle},
    shmem::{KeyboardState, MouseState, NpadCommonState, StateReader, TouchScreenState},
};

use crate::{
    Hid,
    controller::{HANDHELD_SLOT, SLOT_NPAD_IDS},
    frame::Frame,
};

impl<D: Dispatch, M: SharedMemoryMapping> Hid<D, M> {
    /// Reads one input frame. Call once per update tick.
    ///
    /// The first call activates the input devices and declares the supported
    /// styles, npads, Joy-Con assignment and hold type from the [`ScanConfig`](crate::ScanConfig).
    ///
    /// # Panics
    ///
    /// Panics if that activation fails. Use [`try_scan_input`](Self::try_scan_input)
    /// to handle the error instead.
    pub fn scan_input(&self) {
        if let Err(err) = self.try_scan_input() {
            log::error!("hid: input activation failed: {err}");
            panic!("hid: input activation failed: {err}");
        }
    }

    /// Reads one input frame, returning the activation error of the first call.
    ///
    /// A failed activation is attempted again on the next call.
    pub fn try_scan_input(&self) -> Result<(), ActivateError> {
        let mut frame = self.frame.write();

        if !frame.activated {
            self.activate()?;
            frame.reset();
            frame.activated = true;
        }

        scan(&mut frame, &self.service.reader());
        Ok(())
    }

    /// Clears the current frame and all edge history.
    pub fn reset(&self) {
        self.frame.write().reset();
    }

    fn activate(&self) -> Result<(), ActivateError> {
        let service = &self.service;

        service.activate_npad().map_err(ActivateError::Npad)?;
        service
            .activate_touch_screen()
            .map_err(ActivateError::TouchScreen)?;
        service
            .activate_keyboard()
            .map_err(ActivateError::Keyboard)?;
        service.activate_mouse().map_err(ActivateError::Mouse)?;
        log::debug!("hid: input devices activated");

        service
            .set_supported_npad_style_set(self.config.style_set())
            .map_err(ActivateError::SupportedStyleSet)?;
        service
            .set_supported_npad_id_type(self.config.npad_ids())
            .map_err(ActivateError::SupportedNpadIds)?;
        for &id in self.config.dual_mode_ids() {
            service
                .set_npad_joy_assignment_mode_dual(id)
                .map_err(|source| ActivateError::DualAssignment { id, source })?;
        }
        service
            .set_npad_joy_hold_type(self.config.hold_type())
            .map_err(ActivateError::HoldType)?;
        log::debug!(
            "hid: npad configured (styles {:?}, hold {:?})",
            self.config.style_set(),
            self.config.hold_type()
        );

        Ok(())
    }
}

fn scan(frame: &mut Frame, reader: &StateReader<'_>) {
    frame.begin();

    let mut touch = [TouchScreenState::default()];
    if reader.touch_screen_states(&mut touch) == 1 {
        frame.touch = touch[0];
        if !frame.touch.touches().is_empty() {
            frame.buttons[HANDHELD_SLOT].hold(NpadButton::TOUCH);
        }
    }

    let mut mouse = [MouseState::default()];
    if reader.mouse_states(&mut mouse) == 1 {
        frame.mouse = mouse[0];
        frame.mouse_buttons.hold(mouse[0].buttons);
    }

    let mut keyboard = [KeyboardState::default()];
    if reader.keyboard_states(&mut keyboard) == 1 {
        frame.keyboard = keyboard[0];
        frame.modifiers.hold(keyboard[0].modifiers);
        frame.keys.hold(keyboard[0].keys);
    }

    for (slot, id) in SLOT_NPAD_IDS.into_iter().enumerate() {
        if let Some(state) = latest_npad_state(reader, id) {
            frame.entries[slot] = state;
            frame.buttons[slot].hold(state.buttons);
        }
    }

    frame.settle();
}

/// Newest state of `id` in its highest-priority style.
fn latest_npad_state(reader: &StateReader<'_>, id: NpadIdType) -> Option<NpadCommonState> {
    let mut state = [NpadCommonState::default()];
    let count = match reader.style_set(id).primary()? {
        NpadStyle::SystemExt => reader.system_ext_states(id, &mut state),
        NpadStyle::System => reader.system_states(id, &mut state),
        NpadStyle::FullKey => reader.full_key_states(id, &mut state),
        NpadStyle::Handheld => reader.handheld_states(id, &mut state),
        NpadStyle::JoyDual => reader.joy_dual_states(id, &mut state),
        NpadStyle::JoyLeft => reader.joy_left_states(id, &mut state),
        NpadStyle::JoyRight => reader.joy_right_states(id, &mut state),
    };
    (count == 1).then_some(state[0])
}

/// Error returned by [`Hid::try_scan_input`] when the first-frame activation fails.
#[derive(Debug, thiserror::Error)]
pub enum ActivateError {
    #[error("failed to activate npad input")]
    Npad(#[source] CommandError),
    #[error("failed to activate touch screen input")]
    TouchScreen(#[source] CommandError),
    #[error("failed to activate keyboard input")]
    Keyboard(#[source] CommandError),
    #[error("failed to activate mouse input")]
    Mouse(#[source] CommandError),
    #[error("failed to set supported npad style set")]
    SupportedStyleSet(#[source] CommandError),
    #[error("failed to set supported npad ids")]
    SupportedNpadIds(#[source] CommandError),
    #[error("failed to set dual joy assignment for {id:?}")]
    DualAssignment {
        id: NpadIdType,
        #[source]
        source: CommandError,
    },
    #[error("failed to set joy hold type")]
    HoldType(#[source] CommandError),
}

impl ActivateError {
    /// The command error behind this failure.
    pub fn command_error(&self) -> CommandError {
        match *self {
            Self::Npad(err)
            | Self::TouchScreen(err)
            | Self::Keyboard(err)
            | Self::Mouse(err)
            | Self::SupportedStyleSet(err)
            | Self::SupportedNpadIds(err)
            | Self::DualAssignment { source: err, .. }
            | Self::HoldType(err) => err,
        }
    }
}
