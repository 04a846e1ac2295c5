//! Per-frame input state and edge tracking.

use nx_service_hid::{
    npad::{NPAD_COUNT, NpadAttribute, NpadButton},
    shmem::{
        DirectionState, KeyboardKeys, KeyboardModifier, KeyboardState, MouseButton, MouseState,
        NpadCommonState, SixAxisSensorState, TouchScreenState, TouchState, Vector,
    },
};

use crate::controller::{ControllerId, HANDHELD_SLOT};

/// Bit set whose transitions are tracked between frames.
pub(crate) trait EdgeSet: Copy + Default {
    fn union(self, other: Self) -> Self;

    /// Bits of `self` not set in `other`, unknown bits included.
    fn difference(self, other: Self) -> Self;
}

macro_rules! impl_edge_set {
    ($($ty:ty),*) => {
        $(
            impl EdgeSet for $ty {
                #[inline]
                fn union(self, other: Self) -> Self {
                    Self::from_bits_retain(self.bits() | other.bits())
                }

                #[inline]
                fn difference(self, other: Self) -> Self {
                    Self::from_bits_retain(self.bits() & !other.bits())
                }
            }
        )*
    };
}

impl_edge_set!(NpadButton, MouseButton, KeyboardModifier);

impl EdgeSet for KeyboardKeys {
    #[inline]
    fn union(self, other: Self) -> Self {
        self | other
    }

    #[inline]
    fn difference(self, other: Self) -> Self {
        self & !other
    }
}

/// Held bits of the current frame plus the transitions since the previous one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Debounced<T> {
    old: T,
    pub held: T,
    pub down: T,
    pub up: T,
}

impl<T: EdgeSet> Debounced<T> {
    /// Starts a frame: the held bits become the previous frame's.
    #[inline]
    pub fn rotate(&mut self) {
        self.old = self.held;
        self.held = T::default();
    }

    #[inline]
    pub fn hold(&mut self, bits: T) {
        self.held = self.held.union(bits);
    }

    /// Ends a frame by deriving the pressed and released bits.
    #[inline]
    pub fn settle(&mut self) {
        self.down = self.held.difference(self.old);
        self.up = self.old.difference(self.held);
    }
}

/// Everything the queries read, rebuilt by each scan.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame {
    pub activated: bool,
    pub touch: TouchScreenState,
    pub mouse: MouseState,
    pub keyboard: KeyboardState,
    pub entries: [NpadCommonState; NPAD_COUNT],
    pub buttons: [Debounced<NpadButton>; NPAD_COUNT],
    pub mouse_buttons: Debounced<MouseButton>,
    pub modifiers: Debounced<KeyboardModifier>,
    pub keys: Debounced<KeyboardKeys>,
    pub p1_auto_slot: usize,
}

impl Frame {
    pub fn new() -> Self {
        Self {
            activated: false,
            touch: TouchScreenState::default(),
            mouse: MouseState::default(),
            keyboard: KeyboardState::default(),
            entries: [NpadCommonState::default(); NPAD_COUNT],
            buttons: [Debounced::default(); NPAD_COUNT],
            mouse_buttons: Debounced::default(),
            modifiers: Debounced::default(),
            keys: Debounced::default(),
            p1_auto_slot: HANDHELD_SLOT,
        }
    }

    /// Slot read for `id`, with [`ControllerId::P1Auto`] resolved.
    #[inline]
    pub fn slot(&self, id: ControllerId) -> usize {
        id.slot().unwrap_or(self.p1_auto_slot)
    }

    /// Clears every channel. Activation state is kept.
    pub fn reset(&mut self) {
        *self = Self {
            activated: self.activated,
            ..Self::new()
        };
    }

    /// Rotates held bits into the previous frame and clears the raw snapshots.
    pub fn begin(&mut self) {
        self.touch = TouchScreenState::default();
        self.mouse = MouseState::default();
        self.keyboard = KeyboardState::default();
        self.entries = [NpadCommonState::default(); NPAD_COUNT];

        self.mouse_buttons.rotate();
        self.modifiers.rotate();
        self.keys.rotate();
        for buttons in &mut self.buttons {
            buttons.rotate();
        }
    }

    /// Derives every edge and re-resolves the auto player-1 slot.
    pub fn settle(&mut self) {
        self.mouse_buttons.settle();
        self.modifiers.settle();
        self.keys.settle();
        for buttons in &mut self.buttons {
            buttons.settle();
        }

        self.p1_auto_slot = if self.entries[0]
            .attributes
            .contains(NpadAttribute::IS_CONNECTED)
        {
            0
        } else {
            HANDHELD_SLOT
        };
    }
}

/// Which analog stick of a controller to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoystickSide {
    Left,
    Right,
}

/// Mouse position and motion of one snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MousePosition {
    pub x: i32,
    pub y: i32,
    pub velocity_x: i32,
    pub velocity_y: i32,
    pub scroll_velocity_x: i32,
    pub scroll_velocity_y: i32,
}

impl From<&MouseState> for MousePosition {
    fn from(state: &MouseState) -> Self {
        Self {
            x: state.x,
            y: state.y,
            velocity_x: state.delta_x,
            velocity_y: state.delta_y,
            scroll_velocity_x: state.wheel_delta_x,
            scroll_velocity_y: state.wheel_delta_y,
        }
    }
}

/// One finger on the touch screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TouchPosition {
    pub id: u32,
    pub x: u32,
    pub y: u32,
    pub diameter_x: u32,
    pub diameter_y: u32,
    pub angle: u32,
}

impl From<&TouchState> for TouchPosition {
    fn from(touch: &TouchState) -> Self {
        Self {
            id: touch.finger_id,
            x: touch.x,
            y: touch.y,
            diameter_x: touch.diameter_x,
            diameter_y: touch.diameter_y,
            angle: touch.rotation_angle,
        }
    }
}

/// Motion sensor reading.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SixAxisSensorValues {
    pub accelerometer: Vector,
    pub gyroscope: Vector,
    pub angle: Vector,
    /// Rotation matrix.
    pub orientation: DirectionState,
}

impl From<&SixAxisSensorState> for SixAxisSensorValues {
    fn from(state: &SixAxisSensorState) -> Self {
        Self {
            accelerometer: state.acceleration,
            gyroscope: state.angular_velocity,
            angle: state.angle,
            orientation: state.direction,
        }
    }
}
