//! Horizon OS result codes.
//!
//! The 32-bit result code is structured as follows:
//!
//! - **Bits 0-8:** Module ID
//! - **Bits 9-21:** Description
//! - **Bits 22-31:** Reserved
//!
//! A raw value of zero means success and is never wrapped in a [`ResultCode`].

use core::{fmt, num::NonZeroU32};

/// Module of the homebrew loader ABI.
pub const MODULE_HOMEBREW_ABI: u32 = 346;

/// Module of the homebrew runtime library.
pub const MODULE_LIBNX: u32 = 345;

/// Module of the HID service.
pub const MODULE_HID: u32 = 202;

/// A non-success Horizon OS result code.
///
/// Formatted as `2XXX-YYYY` where `XXX` is the module and `YYYY` the description.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct ResultCode(NonZeroU32);

impl ResultCode {
    /// Wraps a raw result code, returning `None` for success (zero).
    #[inline]
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(code) => Some(Self(code)),
            None => None,
        }
    }

    /// Builds a result code from its module and description.
    ///
    /// # Panics
    ///
    /// Panics if both parts are zero, which would encode success.
    #[inline]
    pub const fn from_parts(module: u32, description: u32) -> Self {
        let raw = (module & 0x1FF) | ((description & 0x1FFF) << 9);
        match NonZeroU32::new(raw) {
            Some(code) => Self(code),
            None => panic!("a result code cannot encode success"),
        }
    }

    /// Returns the module that produced the error.
    #[inline]
    pub const fn module(self) -> u32 {
        self.0.get() & 0x1FF
    }

    /// Returns the description value.
    #[inline]
    pub const fn description(self) -> u32 {
        (self.0.get() >> 9) & 0x1FFF
    }

    /// Returns the raw `u32` value.
    #[inline]
    pub const fn to_raw(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:04}", 2000 + self.module(), self.description())
    }
}

impl fmt::Debug for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultCode")
            .field("code", &format_args!("{}", self))
            .field("raw", &format_args!("{:#x}", self.to_raw()))
            .finish()
    }
}

impl core::error::Error for ResultCode {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_code_parts_round_trip() {
        let rc = ResultCode::from_parts(MODULE_HID, 604);

        assert_eq!(rc.module(), 202);
        assert_eq!(rc.description(), 604);
        assert_eq!(rc.to_raw(), 202 | (604 << 9));
    }

    #[test]
    fn test_result_code_display() {
        let rc = ResultCode::from_parts(MODULE_HOMEBREW_ABI, 113);

        assert_eq!(format!("{rc}"), "2346-0113");
    }

    #[test]
    fn test_result_code_from_raw_rejects_success() {
        assert!(ResultCode::from_raw(0).is_none());
        let rc = ResultCode::from_raw(0x2A2);
        assert_eq!(rc.map(ResultCode::module), Some(0xA2));
    }
}
