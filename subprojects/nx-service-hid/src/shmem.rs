//! Shared memory layout and access for HID service.

mod cell;
pub mod layout;
pub mod lifo;
pub mod npad;
pub mod reader;
pub mod types;

pub use self::{
    layout::{HID_SHARED_MEMORY_SIZE, HidSharedMemory},
    lifo::{LIFO_CAPACITY, Lifo, LifoHeader, LifoReadError, RetryLimit, SampledState, read_states},
    npad::*,
    reader::{ColorError, StateReader},
    types::*,
};
