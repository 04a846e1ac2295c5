//! Interior cell for plain data written by the remote producer.

use core::{cell::UnsafeCell, ptr};

/// Plain data inside shared memory, accessed only through volatile copies.
#[repr(transparent)]
pub struct SharedCell<T>(UnsafeCell<T>);

// SAFETY: Every access is a whole-value volatile copy of `Copy` data. Torn
// copies are detected by the callers through the sampling-number stamps.
unsafe impl<T: Copy + Send> Sync for SharedCell<T> {}

impl<T: Copy> SharedCell<T> {
    /// Copies the current value out.
    #[inline]
    pub fn load(&self) -> T {
        // SAFETY: The pointer comes from a live reference and T is Copy.
        unsafe { ptr::read_volatile(self.0.get()) }
    }

    /// Overwrites the value. Only a producer does this.
    #[cfg(any(test, feature = "emulator"))]
    #[inline]
    pub(crate) fn store(&self, value: T) {
        // SAFETY: The pointer comes from a live reference and T is Copy.
        unsafe { ptr::write_volatile(self.0.get(), value) }
    }
}
