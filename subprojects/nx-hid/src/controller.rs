//! Logical controller selectors.

use nx_service_hid::npad::{NPAD_COUNT, NpadIdType};

/// Slot of the console's attached Joy-Con pair.
pub(crate) const HANDHELD_SLOT: usize = 8;

/// Npad id of each slot.
pub(crate) const SLOT_NPAD_IDS: [NpadIdType; NPAD_COUNT] = [
    NpadIdType::No1,
    NpadIdType::No2,
    NpadIdType::No3,
    NpadIdType::No4,
    NpadIdType::No5,
    NpadIdType::No6,
    NpadIdType::No7,
    NpadIdType::No8,
    NpadIdType::Handheld,
    NpadIdType::Other,
];

/// Controller selector used by the [`Hid`](crate::Hid) queries.
///
/// Slots 0..=7 are the numbered players, slot 8 is handheld and slot 9 is the
/// npad the service reports as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerId {
    Player1,
    Player2,
    Player3,
    Player4,
    Player5,
    Player6,
    Player7,
    Player8,
    Handheld,
    Unknown,
    /// Player 1 when it is connected, handheld otherwise. Resolved each frame.
    P1Auto,
}

impl ControllerId {
    /// Selectors of the ten tracked slots, by slot index.
    pub const SLOTS: [Self; NPAD_COUNT] = [
        Self::Player1,
        Self::Player2,
        Self::Player3,
        Self::Player4,
        Self::Player5,
        Self::Player6,
        Self::Player7,
        Self::Player8,
        Self::Handheld,
        Self::Unknown,
    ];

    /// Slot index, or `None` for [`P1Auto`](Self::P1Auto).
    pub const fn slot(self) -> Option<usize> {
        Some(match self {
            Self::Player1 => 0,
            Self::Player2 => 1,
            Self::Player3 => 2,
            Self::Player4 => 3,
            Self::Player5 => 4,
            Self::Player6 => 5,
            Self::Player7 => 6,
            Self::Player8 => 7,
            Self::Handheld => HANDHELD_SLOT,
            Self::Unknown => 9,
            Self::P1Auto => return None,
        })
    }

    pub const fn from_slot(slot: usize) -> Option<Self> {
        if slot < NPAD_COUNT {
            Some(Self::SLOTS[slot])
        } else {
            None
        }
    }

    /// Npad id the service uses for this controller.
    pub const fn npad_id(self) -> Option<NpadIdType> {
        match self.slot() {
            Some(slot) => Some(SLOT_NPAD_IDS[slot]),
            None => None,
        }
    }
}

impl From<NpadIdType> for ControllerId {
    fn from(id: NpadIdType) -> Self {
        Self::SLOTS[id.entry_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_match_npad_entries() {
        for (slot, controller) in ControllerId::SLOTS.into_iter().enumerate() {
            assert_eq!(controller.slot(), Some(slot));
            assert_eq!(ControllerId::from_slot(slot), Some(controller));

            let id = controller.npad_id().unwrap();
            assert_eq!(id.entry_index(), slot);
            assert_eq!(ControllerId::from(id), controller);
            assert_eq!(NpadIdType::from_entry_index(slot), Some(id));
        }
        assert_eq!(ControllerId::Handheld.npad_id(), Some(NpadIdType::Handheld));
        assert_eq!(ControllerId::Unknown.npad_id(), Some(NpadIdType::Other));
    }

    #[test]
    fn test_auto_has_no_fixed_slot() {
        assert_eq!(ControllerId::P1Auto.slot(), None);
        assert_eq!(ControllerId::P1Auto.npad_id(), None);
        assert_eq!(ControllerId::from_slot(NPAD_COUNT), None);
    }
}
