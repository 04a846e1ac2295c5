//! Applet resource user id.

/// Value sent when the caller has no applet resource user id.
///
/// The service then scopes state by the kernel-reported process id.
pub const NO_ARUID: u64 = 0;

/// Applet resource user id, scoping HID state ownership to one applet.
///
/// Obtained from the applet service. Use `Option<Aruid>` where it may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Aruid(u64);

impl Aruid {
    /// Returns `None` for [`NO_ARUID`].
    #[inline]
    pub const fn new(raw: u64) -> Option<Self> {
        if raw == NO_ARUID { None } else { Some(Self(raw)) }
    }

    #[inline]
    pub const fn to_raw(self) -> u64 {
        self.0
    }
}

/// Wire value for an optional id.
#[inline]
pub(crate) fn wire(aruid: Option<Aruid>) -> u64 {
    aruid.map_or(NO_ARUID, Aruid::to_raw)
}
