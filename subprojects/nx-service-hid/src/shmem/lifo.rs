//! Lock-free LIFO ring buffers shared with the HID service.
//!
//! The service appends timestamped snapshots to fixed-capacity rings and
//! publishes `tail`/`count` with release stores. Each slot carries a sampling
//! number that is stamped before and after the payload, and the payload mirrors
//! that number. Readers never block: they copy a window and start over when the
//! stamps or the sequence of mirrored numbers show that the producer raced them.

use core::{
    num::NonZeroU32,
    sync::atomic::{self, AtomicU64, Ordering},
};

use super::cell::SharedCell;

/// Number of slots in every HID ring.
pub const LIFO_CAPACITY: usize = 17;

/// A snapshot that carries its own sampling number.
pub trait SampledState: Copy {
    fn sampling_number(&self) -> u64;
}

/// One ring slot as seen by the reader.
pub trait LifoEntry {
    type State: SampledState;

    /// Loads the slot's stamp with acquire ordering.
    fn sampling_number(&self) -> u64;

    /// Copies the payload out.
    fn load(&self) -> Self::State;
}

/// Header at the start of every ring.
#[repr(C)]
pub struct LifoHeader {
    unused: u64,
    buffer_count: AtomicU64,
    tail: AtomicU64,
    count: AtomicU64,
}

impl LifoHeader {
    /// Index of the most recently written slot.
    #[inline]
    pub fn tail(&self) -> u64 {
        self.tail.load(Ordering::Acquire)
    }

    /// Number of valid entries. Read as signed, may be transiently negative.
    #[inline]
    pub fn count(&self) -> i64 {
        self.count.load(Ordering::Acquire) as i64
    }

    /// Slot count advertised by the producer.
    #[inline]
    pub fn buffer_count(&self) -> u64 {
        self.buffer_count.load(Ordering::Relaxed)
    }
}

/// Slot layout in shared memory: a stamp followed by the payload.
#[repr(C)]
pub struct AtomicStorage<T> {
    sampling_number: AtomicU64,
    state: SharedCell<T>,
}

impl<T: SampledState> LifoEntry for AtomicStorage<T> {
    type State = T;

    #[inline]
    fn sampling_number(&self) -> u64 {
        self.sampling_number.load(Ordering::Acquire)
    }

    #[inline]
    fn load(&self) -> T {
        self.state.load()
    }
}

/// A ring of `N` snapshots.
#[repr(C)]
pub struct Lifo<T, const N: usize = LIFO_CAPACITY> {
    header: LifoHeader,
    storage: [AtomicStorage<T>; N],
}

impl<T: SampledState, const N: usize> Lifo<T, N> {
    #[inline]
    pub fn header(&self) -> &LifoHeader {
        &self.header
    }

    /// Copies the newest `out.len()` snapshots, oldest first.
    pub fn read(&self, out: &mut [T], limit: RetryLimit) -> Result<usize, LifoReadError> {
        read_states(&self.header, &self.storage, out, limit)
    }

    /// Copies the newest snapshot, if any.
    pub fn latest(&self, limit: RetryLimit) -> Result<Option<T>, LifoReadError>
    where
        T: Default,
    {
        let mut out = [T::default()];
        let count = self.read(&mut out, limit)?;
        Ok((count == 1).then_some(out[0]))
    }
}

/// Bound on how many times a read may start over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryLimit {
    /// Retry until a consistent window is copied.
    Unbounded,
    /// Give up after this many extraction attempts.
    Attempts(NonZeroU32),
}

impl RetryLimit {
    /// Cap used by the state accessors unless configured otherwise.
    pub const DEFAULT: Self = match NonZeroU32::new(64) {
        Some(attempts) => Self::Attempts(attempts),
        None => Self::Unbounded,
    };

    #[inline]
    fn allows(self, attempt: u32) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Attempts(max) => attempt <= max.get(),
        }
    }
}

impl Default for RetryLimit {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Error returned by [`read_states`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LifoReadError {
    /// The producer kept racing the reader.
    #[error("no consistent snapshot after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

#[inline]
fn clamp_count(count: i64, requested: u64) -> u64 {
    (count.max(0) as u64).min(requested)
}

/// Copies the newest `min(count, out.len(), storage.len())` snapshots into `out`.
///
/// `out[0]` receives the oldest snapshot of the window and the last written
/// index the newest. Consecutive outputs have sampling numbers that differ by
/// exactly one. Returns the number of snapshots written.
pub fn read_states<E: LifoEntry>(
    header: &LifoHeader,
    storage: &[E],
    out: &mut [E::State],
    limit: RetryLimit,
) -> Result<usize, LifoReadError> {
    let slots = storage.len() as u64;
    let requested = (out.len() as u64).min(slots);
    if requested == 0 {
        return Ok(0);
    }

    let mut total = clamp_count(header.count(), requested);
    let mut tail = header.tail();
    let mut attempt = 1;

    'attempt: loop {
        for i in 0..total {
            let pos = ((tail % slots) + slots + 1 - total + i) % slots;
            let entry = &storage[pos as usize];

            let stamp = entry.sampling_number();
            let state = entry.load();
            atomic::fence(Ordering::Acquire);
            let restamp = entry.sampling_number();

            let idx = i as usize;
            let out_of_sequence = idx > 0 && {
                let previous = out[idx - 1].sampling_number();
                state.sampling_number().wrapping_sub(previous) != 1
            };

            if stamp != restamp || out_of_sequence {
                log::trace!("torn ring read at slot {pos} on attempt {attempt}");

                attempt += 1;
                if !limit.allows(attempt) {
                    return Err(LifoReadError::RetriesExhausted {
                        attempts: attempt - 1,
                    });
                }

                total = total.max(clamp_count(header.count(), requested));
                tail = header.tail();
                continue 'attempt;
            }

            out[idx] = state;
        }

        return Ok(total as usize);
    }
}

#[cfg(any(test, feature = "emulator"))]
impl<T: SampledState, const N: usize> Lifo<T, N> {
    /// Appends a snapshot the way the service does.
    pub fn push(&self, state: T) {
        let slots = N as u64;
        let count = self.header.count.load(Ordering::Relaxed);
        let tail = self.header.tail.load(Ordering::Relaxed);
        let next = if count == 0 { tail % slots } else { (tail + 1) % slots };

        let stamp = state.sampling_number();
        let slot = &self.storage[next as usize];
        slot.sampling_number.store(stamp, Ordering::Release);
        slot.state.store(state);
        slot.sampling_number.store(stamp, Ordering::Release);

        self.header.buffer_count.store(slots, Ordering::Relaxed);
        self.header.tail.store(next, Ordering::Release);
        let count = (count + 1).min(slots);
        self.header.count.store(count, Ordering::Release);
    }

    /// Overwrites the header as a misbehaving producer would.
    pub fn force_header(&self, tail: u64, count: i64) {
        self.header.tail.store(tail, Ordering::Release);
        self.header.count.store(count as u64, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, sync::Arc, thread};

    use proptest::prelude::*;

    use super::*;

    #[derive(Debug, Clone, Copy, Default, PartialEq)]
    struct TestState {
        sampling_number: u64,
        value: i32,
    }

    impl SampledState for TestState {
        fn sampling_number(&self) -> u64 {
            self.sampling_number
        }
    }

    fn sample(sampling_number: u64) -> TestState {
        TestState {
            sampling_number,
            value: -(sampling_number as i32),
        }
    }

    fn zeroed_lifo() -> Box<Lifo<TestState>> {
        // SAFETY: Atomics, cells of integers and integers are valid when zeroed.
        unsafe { Box::<Lifo<TestState>>::new_zeroed().assume_init() }
    }

    fn header(tail: u64, count: i64) -> LifoHeader {
        LifoHeader {
            unused: 0,
            buffer_count: AtomicU64::new(LIFO_CAPACITY as u64),
            tail: AtomicU64::new(tail),
            count: AtomicU64::new(count as u64),
        }
    }

    /// A slot whose payload gets overwritten while it is being copied.
    struct RacedSlot<'a> {
        index: u64,
        stamp: Cell<u64>,
        state: Cell<TestState>,
        overwrite: Cell<Option<(&'a LifoHeader, TestState)>>,
        loads: Cell<u32>,
    }

    impl<'a> RacedSlot<'a> {
        fn new(index: u64, state: TestState) -> Self {
            Self {
                index,
                stamp: Cell::new(state.sampling_number),
                state: Cell::new(state),
                overwrite: Cell::new(None),
                loads: Cell::new(0),
            }
        }
    }

    impl LifoEntry for RacedSlot<'_> {
        type State = TestState;

        fn sampling_number(&self) -> u64 {
            self.stamp.get()
        }

        fn load(&self) -> TestState {
            self.loads.set(self.loads.get() + 1);
            let seen = self.state.get();
            if let Some((header, next)) = self.overwrite.take() {
                self.stamp.set(next.sampling_number);
                self.state.set(next);
                header.tail.store(self.index, Ordering::Release);
            }
            seen
        }
    }

    #[test]
    fn test_read_empty_ring() {
        let lifo = zeroed_lifo();
        let mut out = [TestState::default(); 5];

        assert_eq!(lifo.read(&mut out, RetryLimit::Unbounded), Ok(0));
        assert_eq!(lifo.latest(RetryLimit::Unbounded), Ok(None));
    }

    #[test]
    fn test_read_single_entry() {
        let lifo = zeroed_lifo();
        lifo.push(TestState {
            sampling_number: 100,
            value: 42,
        });
        let mut out = [TestState::default(); 5];

        assert_eq!(lifo.read(&mut out, RetryLimit::Unbounded), Ok(1));
        assert_eq!(out[0].sampling_number, 100);
        assert_eq!(out[0].value, 42);
    }

    #[test]
    fn test_read_wrapped_ring_returns_newest_window_oldest_first() {
        let lifo = zeroed_lifo();
        for n in 1..=20 {
            lifo.push(sample(n));
        }
        let mut out = [TestState::default(); LIFO_CAPACITY];

        let count = lifo.read(&mut out, RetryLimit::Unbounded).unwrap();

        assert_eq!(count, 17);
        let numbers: Vec<u64> = out.iter().map(|s| s.sampling_number).collect();
        assert_eq!(numbers, (4..=20).collect::<Vec<_>>());
    }

    #[test]
    fn test_read_smaller_request_gets_newest() {
        let lifo = zeroed_lifo();
        for n in 1..=10 {
            lifo.push(sample(n));
        }
        let mut out = [TestState::default(); 3];

        assert_eq!(lifo.read(&mut out, RetryLimit::DEFAULT), Ok(3));
        assert_eq!(out.map(|s| s.sampling_number), [8, 9, 10]);
        assert_eq!(lifo.latest(RetryLimit::DEFAULT), Ok(Some(sample(10))));
    }

    #[test]
    fn test_negative_count_reads_nothing() {
        let lifo = zeroed_lifo();
        lifo.push(sample(1));
        lifo.force_header(0, -3);
        let mut out = [TestState::default(); 4];

        assert_eq!(lifo.read(&mut out, RetryLimit::Unbounded), Ok(0));
    }

    #[test]
    fn test_count_above_capacity_is_clamped() {
        let lifo = zeroed_lifo();
        for n in 1..=17 {
            lifo.push(sample(n));
        }
        lifo.force_header(16, 1000);
        let mut out = [TestState::default(); 32];

        assert_eq!(lifo.read(&mut out, RetryLimit::Unbounded), Ok(17));
        assert_eq!(out[16].sampling_number, 17);
    }

    #[test]
    fn test_torn_slot_is_retried_with_fresh_tail() {
        let header = header(16, 17);
        let storage: Vec<RacedSlot<'_>> = (0..17)
            .map(|i| RacedSlot::new(i, sample(i + 1)))
            .collect();
        // The producer overwrites the oldest slot with snapshot 18 mid-copy.
        storage[0].overwrite.set(Some((&header, sample(18))));
        let mut out = [TestState::default(); LIFO_CAPACITY];

        let count = read_states(&header, &storage, &mut out, RetryLimit::Unbounded).unwrap();

        assert_eq!(count, 17);
        let numbers: Vec<u64> = out.iter().map(|s| s.sampling_number).collect();
        assert_eq!(numbers, (2..=18).collect::<Vec<_>>());
        assert_eq!(out[16].value, -18);
        assert_eq!(storage[0].loads.get(), 2);
    }

    #[test]
    fn test_out_of_sequence_entries_are_retried() {
        let header = header(2, 3);
        let storage: Vec<RacedSlot<'_>> = [sample(1), sample(2), sample(9)]
            .into_iter()
            .enumerate()
            .map(|(i, state)| RacedSlot::new(i as u64, state))
            .collect();
        let mut out = [TestState::default(); 3];
        let limit = RetryLimit::Attempts(NonZeroU32::new(4).unwrap());

        let result = read_states(&header, &storage, &mut out, limit);

        assert_eq!(result, Err(LifoReadError::RetriesExhausted { attempts: 4 }));
        assert_eq!(storage[2].loads.get(), 4);
    }

    #[test]
    fn test_concurrent_producer_never_yields_gaps() {
        const WRITES: u64 = 20_000;

        let lifo: Arc<Lifo<TestState>> = Arc::from(zeroed_lifo());
        let producer = {
            let lifo = Arc::clone(&lifo);
            thread::spawn(move || {
                for n in 1..=WRITES {
                    lifo.push(sample(n));
                    if n % 64 == 0 {
                        thread::yield_now();
                    }
                }
            })
        };

        let mut out = [TestState::default(); LIFO_CAPACITY];
        while !producer.is_finished() {
            let count = lifo.read(&mut out, RetryLimit::Unbounded).unwrap();
            for pair in out[..count].windows(2) {
                assert_eq!(pair[1].sampling_number, pair[0].sampling_number + 1);
            }
        }
        producer.join().unwrap();

        let count = lifo.read(&mut out, RetryLimit::Unbounded).unwrap();
        assert_eq!(count, LIFO_CAPACITY);
        assert_eq!(out[LIFO_CAPACITY - 1], sample(WRITES));
    }

    proptest! {
        #[test]
        fn test_read_returns_contiguous_newest_window(writes in 0u64..80, requested in 0usize..24) {
            let lifo = zeroed_lifo();
            for n in 1..=writes {
                lifo.push(sample(n));
            }
            let mut out = vec![TestState::default(); requested];

            let count = lifo.read(&mut out, RetryLimit::DEFAULT).unwrap();

            let expected = (writes as usize).min(requested).min(LIFO_CAPACITY);
            prop_assert_eq!(count, expected);
            for (i, state) in out[..count].iter().enumerate() {
                prop_assert_eq!(state.sampling_number, writes - (count - 1 - i) as u64);
                prop_assert_eq!(state.value, -(state.sampling_number as i32));
            }
        }
    }
}
