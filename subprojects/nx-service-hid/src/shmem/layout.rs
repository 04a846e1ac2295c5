//! HID shared memory layout (0x40000 bytes).
//!
//! Sections the client reads are typed; the rest are opaque byte blocks of the
//! size the service uses. Every size is checked at compile time.

use static_assertions::const_assert_eq;

use super::{
    lifo::Lifo,
    npad::{NpadInternalState, NpadState},
    types::{GestureState, KeyboardState, MouseState, TouchScreenState},
};
use crate::npad::{NPAD_COUNT, NpadIdType};

/// Size of the HID shared memory region.
pub const HID_SHARED_MEMORY_SIZE: usize = 0x40000;

pub type TouchScreenLifo = Lifo<TouchScreenState>;
pub type MouseLifo = Lifo<MouseState>;
pub type KeyboardLifo = Lifo<KeyboardState>;
pub type GestureLifo = Lifo<GestureState>;

/// Section the client never reads.
#[repr(C)]
pub struct Opaque<const SIZE: usize>([u8; SIZE]);

macro_rules! lifo_section {
    ($(#[$meta:meta])* $name:ident, $lifo:ty, $size:expr) => {
        $(#[$meta])*
        #[repr(C)]
        pub struct $name {
            pub lifo: $lifo,
            _padding: [u8; $size - size_of::<$lifo>()],
        }

        const_assert_eq!(size_of::<$name>(), $size);
    };
}

lifo_section!(
    /// Touch screen section.
    TouchScreenSection,
    TouchScreenLifo,
    0x3000
);
lifo_section!(
    /// Mouse section.
    MouseSection,
    MouseLifo,
    0x400
);
lifo_section!(
    /// Keyboard section.
    KeyboardSection,
    KeyboardLifo,
    0x400
);
lifo_section!(
    /// Gesture section.
    GestureSection,
    GestureLifo,
    0x800
);

/// HID shared memory structure.
#[repr(C)]
pub struct HidSharedMemory {
    pub debug_pad: Opaque<0x400>,
    pub touch_screen: TouchScreenSection,
    pub mouse: MouseSection,
    pub keyboard: KeyboardSection,
    pub digitizer: Opaque<0x1000>,
    pub home_button: Opaque<0x200>,
    pub sleep_button: Opaque<0x200>,
    pub capture_button: Opaque<0x200>,
    pub input_detector: Opaque<0x800>,
    pub unique_pad: Opaque<0x4000>,
    pub npad: [NpadInternalState; NPAD_COUNT],
    pub gesture: GestureSection,
    pub console_six_axis_sensor: Opaque<0x20>,
    _padding: [u8; 0x3DE0],
}

const_assert_eq!(size_of::<HidSharedMemory>(), HID_SHARED_MEMORY_SIZE);
const_assert_eq!(core::mem::offset_of!(HidSharedMemory, touch_screen), 0x400);
const_assert_eq!(core::mem::offset_of!(HidSharedMemory, npad), 0x9A00);
const_assert_eq!(core::mem::offset_of!(HidSharedMemory, gesture), 0x3BA00);

impl HidSharedMemory {
    /// Size of the shared memory region.
    pub const SIZE: usize = HID_SHARED_MEMORY_SIZE;

    /// Entry of one npad.
    #[inline]
    pub fn npad(&self, id: NpadIdType) -> &NpadState {
        &self.npad[id.entry_index()]
    }
}
