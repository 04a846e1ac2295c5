//! Horizon OS version values.

use core::fmt;

/// Bit set in the packed loader value when running under Atmosphère.
pub(crate) const ATMOSPHERE_BIT: u32 = 1 << 31;

/// Magic value (`ATMOSPHR`) the loader stores next to the version on Atmosphère.
pub(crate) const ATMOSPHERE_MAGIC: u64 = 0x41544d4f53504852;

/// A Horizon OS version (major.minor.patch).
///
/// Ordering compares versions, so `hos < HosVersion::new(4, 0, 0)` reads as
/// "older than 4.0.0".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HosVersion(u32);

impl HosVersion {
    /// Creates a version from its components.
    #[inline]
    pub const fn new(major: u8, minor: u8, patch: u8) -> Self {
        Self(((major as u32) << 16) | ((minor as u32) << 8) | (patch as u32))
    }

    /// Creates a version from the loader's packed value, discarding the Atmosphère bit.
    #[inline]
    pub const fn from_u32(raw: u32) -> Self {
        Self(raw & !ATMOSPHERE_BIT & 0x00FF_FFFF)
    }

    /// Returns the packed value.
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn major(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[inline]
    pub const fn minor(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn patch(self) -> u8 {
        self.0 as u8
    }
}

impl fmt::Display for HosVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major(), self.minor(), self.patch())
    }
}
