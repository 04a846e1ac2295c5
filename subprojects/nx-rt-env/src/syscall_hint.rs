//! Syscall availability hints.

/// Availability bits for SVCs 0x00-0xBF, one bit per syscall.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyscallHints([u64; 3]);

impl SyscallHints {
    /// No syscall hinted.
    pub const fn new() -> Self {
        Self([0; 3])
    }

    /// Every syscall hinted, used when there is no loader.
    pub const fn all_available() -> Self {
        Self([u64::MAX; 3])
    }

    /// Sets hints for SVCs 0x00-0x7F.
    pub fn set_hint_0_7f(&mut self, low: u64, high: u64) {
        self.0[0] = low;
        self.0[1] = high;
    }

    /// Sets hints for SVCs 0x80-0xBF.
    pub fn set_hint_80_bf(&mut self, value: u64) {
        self.0[2] = value;
    }

    /// Returns true if the syscall is hinted as available. Always false from 0xC0 on.
    pub const fn is_available(&self, svc: u32) -> bool {
        if svc >= 0xC0 {
            return false;
        }

        (self.0[(svc / 64) as usize] & (1u64 << (svc % 64))) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hints_cover_three_words() {
        let mut hints = SyscallHints::new();
        hints.set_hint_0_7f(1 << 0x2C, 1 << (0x7F - 64));
        hints.set_hint_80_bf(1 << (0x90 - 128));

        assert!(hints.is_available(0x2C));
        assert!(hints.is_available(0x7F));
        assert!(hints.is_available(0x90));
        assert!(!hints.is_available(0x2D));
    }

    #[test]
    fn test_hints_out_of_range_is_unavailable() {
        assert!(!SyscallHints::all_available().is_available(0xC0));
        assert!(SyscallHints::all_available().is_available(0xBF));
    }
}
