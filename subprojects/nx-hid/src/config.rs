//! One-time activation settings applied by the first frame.

use nx_service_hid::{
    npad::{JoyHoldType, NpadIdType, NpadStyleSet},
    shmem::RetryLimit,
};

/// Npads polled by default: the eight players and handheld.
const DEFAULT_NPAD_IDS: &[NpadIdType] = &[
    NpadIdType::No1,
    NpadIdType::No2,
    NpadIdType::No3,
    NpadIdType::No4,
    NpadIdType::No5,
    NpadIdType::No6,
    NpadIdType::No7,
    NpadIdType::No8,
    NpadIdType::Handheld,
];

const DEFAULT_DUAL_MODE_IDS: &[NpadIdType] = &NpadIdType::PLAYERS;

/// Settings sent to the service before the first frame is read.
///
/// ```ignore
/// let config = ScanConfig::new()
///     .with_hold_type(JoyHoldType::Horizontal)
///     .with_dual_mode_ids(&[]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    style_set: NpadStyleSet,
    npad_ids: &'static [NpadIdType],
    dual_mode_ids: &'static [NpadIdType],
    hold_type: JoyHoldType,
    retry_limit: RetryLimit,
}

impl ScanConfig {
    pub const fn new() -> Self {
        Self {
            style_set: NpadStyleSet::STANDARD
                .union(NpadStyleSet::SYSTEM_EXT)
                .union(NpadStyleSet::SYSTEM),
            npad_ids: DEFAULT_NPAD_IDS,
            dual_mode_ids: DEFAULT_DUAL_MODE_IDS,
            hold_type: JoyHoldType::Vertical,
            retry_limit: RetryLimit::DEFAULT,
        }
    }

    /// Styles declared as supported.
    pub const fn with_style_set(mut self, style_set: NpadStyleSet) -> Self {
        self.style_set = style_set;
        self
    }

    /// Npads declared as supported.
    pub const fn with_npad_ids(mut self, ids: &'static [NpadIdType]) -> Self {
        self.npad_ids = ids;
        self
    }

    /// Npads switched to dual Joy-Con assignment.
    pub const fn with_dual_mode_ids(mut self, ids: &'static [NpadIdType]) -> Self {
        self.dual_mode_ids = ids;
        self
    }

    pub const fn with_hold_type(mut self, hold_type: JoyHoldType) -> Self {
        self.hold_type = hold_type;
        self
    }

    /// Retry cap of every snapshot read.
    pub const fn with_retry_limit(mut self, limit: RetryLimit) -> Self {
        self.retry_limit = limit;
        self
    }

    #[inline]
    pub const fn style_set(&self) -> NpadStyleSet {
        self.style_set
    }

    #[inline]
    pub const fn npad_ids(&self) -> &'static [NpadIdType] {
        self.npad_ids
    }

    #[inline]
    pub const fn dual_mode_ids(&self) -> &'static [NpadIdType] {
        self.dual_mode_ids
    }

    #[inline]
    pub const fn hold_type(&self) -> JoyHoldType {
        self.hold_type
    }

    #[inline]
    pub const fn retry_limit(&self) -> RetryLimit {
        self.retry_limit
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_first_frame_activation() {
        let config = ScanConfig::default();

        assert_eq!(
            config.style_set(),
            NpadStyleSet::STANDARD | NpadStyleSet::SYSTEM_EXT | NpadStyleSet::SYSTEM
        );
        assert_eq!(config.npad_ids().len(), 9);
        assert_eq!(config.npad_ids()[8], NpadIdType::Handheld);
        assert_eq!(config.dual_mode_ids(), NpadIdType::PLAYERS);
        assert_eq!(config.hold_type(), JoyHoldType::Vertical);
        assert_eq!(config.retry_limit(), RetryLimit::DEFAULT);
    }

    #[test]
    fn test_builder_overrides() {
        let config = ScanConfig::new()
            .with_style_set(NpadStyleSet::FULL_KEY)
            .with_npad_ids(&[NpadIdType::No1])
            .with_dual_mode_ids(&[])
            .with_hold_type(JoyHoldType::Horizontal)
            .with_retry_limit(RetryLimit::Unbounded);

        assert_eq!(config.style_set(), NpadStyleSet::FULL_KEY);
        assert_eq!(config.npad_ids(), [NpadIdType::No1]);
        assert!(config.dual_mode_ids().is_empty());
        assert_eq!(config.hold_type(), JoyHoldType::Horizontal);
        assert_eq!(config.retry_limit(), RetryLimit::Unbounded);
    }
}
