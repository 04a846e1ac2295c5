//! # Runtime Environment Parser
//!
//! Parses the homebrew ABI configuration block that the loader hands to the
//! program entry point and exposes the recovered launch context: thread and
//! process handles, heap override, syscall availability hints, applet type,
//! random seed and the running Horizon OS version.
//!
//! The parsed context is a plain [`Env`] value owned by the caller. Nothing here
//! keeps global state.

#![cfg_attr(not(test), no_std)]

use core::{
    ffi::{c_char, c_void},
    ptr::NonNull,
};

pub mod config;
pub mod hos_version;
pub mod rc;
pub mod syscall_hint;

pub use self::{
    config::{AccountUid, AppletType, ConfigEntry, EntryType, ServiceName, ServiceOverride},
    hos_version::HosVersion,
    rc::ResultCode,
    syscall_hint::SyscallHints,
};
use self::hos_version::{ATMOSPHERE_BIT, ATMOSPHERE_MAGIC};

/// Maximum number of service overrides kept from the configuration block.
pub const MAX_SERVICE_OVERRIDES: usize = 32;

/// Chain-loading buffers provided by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextLoad {
    pub path: NonNull<c_char>,
    pub argv: Option<NonNull<c_char>>,
}

/// Launch context recovered from the loader.
#[derive(Debug, Clone)]
pub struct Env {
    is_nso: bool,
    main_thread_handle: Option<u32>,
    process_handle: Option<u32>,
    heap_override: Option<(NonNull<c_void>, usize)>,
    argv: Option<NonNull<c_char>>,
    syscall_hints: SyscallHints,
    applet_type: AppletType,
    next_load: Option<NextLoad>,
    last_load_result: Option<ResultCode>,
    random_seed: Option<[u64; 2]>,
    user_id_storage: Option<NonNull<AccountUid>>,
    hos_version: Option<HosVersion>,
    is_atmosphere: bool,
    loader_info: Option<(NonNull<c_char>, u64)>,
    service_overrides: [Option<ServiceOverride>; MAX_SERVICE_OVERRIDES],
}

impl Env {
    fn empty() -> Self {
        Self {
            is_nso: false,
            main_thread_handle: None,
            process_handle: None,
            heap_override: None,
            argv: None,
            syscall_hints: SyscallHints::new(),
            applet_type: AppletType::Default,
            next_load: None,
            last_load_result: None,
            random_seed: None,
            user_id_storage: None,
            hos_version: None,
            is_atmosphere: false,
            loader_info: None,
            service_overrides: [None; MAX_SERVICE_OVERRIDES],
        }
    }

    /// Context of a program started without a homebrew loader.
    ///
    /// Every syscall is hinted as available.
    pub fn nso(main_thread: u32) -> Self {
        Self {
            is_nso: true,
            main_thread_handle: Some(main_thread),
            syscall_hints: SyscallHints::all_available(),
            ..Self::empty()
        }
    }

    /// Parses a configuration block terminated by [`EntryType::EndOfList`].
    ///
    /// Optional entries this runtime does not act on are skipped. Such an entry
    /// flagged as mandatory aborts parsing with [`EnvError::UnknownMandatoryKey`].
    pub fn parse(entries: &[ConfigEntry]) -> Result<Self, EnvError> {
        let mut env = Self::empty();

        for entry in entries {
            if env.apply(entry)? {
                return Ok(env);
            }
        }

        Err(EnvError::MissingEndOfList)
    }

    /// Parses the raw block passed to the entry point.
    ///
    /// A null `ctx` selects NSO mode with `main_thread` as the main thread handle.
    ///
    /// # Safety
    ///
    /// A non-null `ctx` must point to a readable array of [`ConfigEntry`]
    /// terminated by an [`EntryType::EndOfList`] entry.
    pub unsafe fn from_raw(ctx: *const ConfigEntry, main_thread: u32) -> Result<Self, EnvError> {
        let Some(mut entry) = NonNull::new(ctx.cast_mut()) else {
            return Ok(Self::nso(main_thread));
        };

        let mut env = Self::empty();
        loop {
            // SAFETY: The caller guarantees the block is readable up to its terminator,
            // and `apply` reports the terminator before we step past it.
            let current = unsafe { entry.as_ref() };
            if env.apply(current)? {
                return Ok(env);
            }
            // SAFETY: The terminator has not been reached yet.
            entry = unsafe { entry.add(1) };
        }
    }

    /// Applies one entry. Returns `true` on the terminator.
    fn apply(&mut self, entry: &ConfigEntry) -> Result<bool, EnvError> {
        let [v0, v1] = entry.value;

        match EntryType::from_u32(entry.key) {
            Some(EntryType::EndOfList) => {
                if v1 != 0 {
                    self.loader_info = NonNull::new(v0 as *mut c_char).map(|ptr| (ptr, v1));
                }
                return Ok(true);
            }
            Some(EntryType::MainThreadHandle) => self.main_thread_handle = Some(v0 as u32),
            Some(EntryType::NextLoadPath) => {
                self.next_load = NonNull::new(v0 as *mut c_char).map(|path| NextLoad {
                    path,
                    argv: NonNull::new(v1 as *mut c_char),
                });
            }
            Some(EntryType::OverrideHeap) => {
                let addr = NonNull::new(v0 as *mut c_void);
                self.heap_override = addr.map(|addr| (addr, v1 as usize));
            }
            Some(EntryType::OverrideService) => self.add_service_override(ServiceOverride {
                name: ServiceName::from_u64(v0),
                handle: v1 as u32,
            }),
            Some(EntryType::Argv) => self.argv = NonNull::new(v1 as *mut c_char),
            Some(EntryType::SyscallAvailableHint) => self.syscall_hints.set_hint_0_7f(v0, v1),
            Some(EntryType::SyscallAvailableHint2) => self.syscall_hints.set_hint_80_bf(v0),
            Some(EntryType::AppletType) => self.applet_type = AppletType::from_entry(v0, v1),
            Some(EntryType::ProcessHandle) => self.process_handle = Some(v0 as u32),
            Some(EntryType::LastLoadResult) => {
                self.last_load_result = ResultCode::from_raw(v0 as u32);
            }
            Some(EntryType::RandomSeed) => self.random_seed = Some([v0, v1]),
            Some(EntryType::UserIdStorage) => {
                self.user_id_storage = NonNull::new(v0 as *mut AccountUid);
            }
            Some(EntryType::HosVersion) => {
                let mut raw = v0 as u32;
                if v1 == ATMOSPHERE_MAGIC {
                    raw |= ATMOSPHERE_BIT;
                }
                self.is_atmosphere = raw & ATMOSPHERE_BIT != 0;
                self.hos_version = Some(HosVersion::from_u32(raw));
            }
            Some(
                EntryType::AppletWorkaround
                | EntryType::Reserved9
                | EntryType::AllocPages
                | EntryType::LockRegion,
            )
            | None
                if entry.is_mandatory() =>
            {
                return Err(EnvError::UnknownMandatoryKey { key: entry.key });
            }
            Some(_) | None => log::debug!("ignoring loader entry {}", entry.key),
        }

        Ok(false)
    }

    fn add_service_override(&mut self, service: ServiceOverride) {
        match self.service_overrides.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => *slot = Some(service),
            None => log::warn!("dropping service override {:#x}", service.name.to_u64()),
        }
    }

    /// Returns true when running without a homebrew loader.
    pub fn is_nso(&self) -> bool {
        self.is_nso
    }

    pub fn main_thread_handle(&self) -> Option<u32> {
        self.main_thread_handle
    }

    pub fn own_process_handle(&self) -> Option<u32> {
        self.process_handle
    }

    /// Heap region supplied by the loader, as `(address, size)`.
    pub fn heap_override(&self) -> Option<(NonNull<c_void>, usize)> {
        self.heap_override
    }

    pub fn argv(&self) -> Option<NonNull<c_char>> {
        self.argv
    }

    pub fn syscall_hints(&self) -> SyscallHints {
        self.syscall_hints
    }

    pub fn is_syscall_hinted(&self, svc: u32) -> bool {
        self.syscall_hints.is_available(svc)
    }

    pub fn applet_type(&self) -> AppletType {
        self.applet_type
    }

    pub fn next_load(&self) -> Option<NextLoad> {
        self.next_load
    }

    /// Result of the previously chain-loaded program, if it failed.
    pub fn last_load_result(&self) -> Option<ResultCode> {
        self.last_load_result
    }

    pub fn random_seed(&self) -> Option<[u64; 2]> {
        self.random_seed
    }

    pub fn user_id_storage(&self) -> Option<NonNull<AccountUid>> {
        self.user_id_storage
    }

    /// Running system version, when the loader reported one.
    pub fn hos_version(&self) -> Option<HosVersion> {
        self.hos_version
    }

    pub fn is_atmosphere(&self) -> bool {
        self.is_atmosphere
    }

    /// Loader info string as `(pointer, length)`.
    pub fn loader_info(&self) -> Option<(NonNull<c_char>, u64)> {
        self.loader_info
    }

    pub fn service_overrides(&self) -> impl Iterator<Item = &ServiceOverride> {
        self.service_overrides.iter().flatten()
    }

    /// Looks up a loader-provided session for a service.
    pub fn service_override(&self, name: ServiceName) -> Option<u32> {
        self.service_overrides()
            .find(|service| service.name == name)
            .map(|service| service.handle)
    }
}

/// Error returned by [`Env::parse`] and [`Env::from_raw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EnvError {
    /// The loader requires support for an entry this runtime does not handle.
    #[error("unknown mandatory loader entry {key}")]
    UnknownMandatoryKey { key: u32 },
    /// The block ended without a terminator entry.
    #[error("configuration block is missing its terminator")]
    MissingEndOfList,
}

impl EnvError {
    /// Result code reported back to the loader on exit.
    pub fn result_code(&self) -> ResultCode {
        match self {
            Self::UnknownMandatoryKey { key } => {
                ResultCode::from_parts(rc::MODULE_HOMEBREW_ABI, 100 + key)
            }
            Self::MissingEndOfList => ResultCode::from_parts(rc::MODULE_HOMEBREW_ABI, 100),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: EntryType, value: [u64; 2]) -> ConfigEntry {
        ConfigEntry::new(key, 0, value)
    }

    #[test]
    fn test_nso_hints_every_syscall() {
        let env = Env::nso(0xDEAD);

        assert!(env.is_nso());
        assert_eq!(env.main_thread_handle(), Some(0xDEAD));
        assert!(env.is_syscall_hinted(0x00));
        assert!(env.is_syscall_hinted(0xBF));
        assert!(env.hos_version().is_none());
    }

    #[test]
    fn test_parse_recovers_launch_context() {
        let entries = [
            entry(EntryType::MainThreadHandle, [0x1234, 0]),
            entry(EntryType::OverrideHeap, [0x8000_0000, 0x1000_0000]),
            entry(EntryType::SyscallAvailableHint, [1 << 1, 0]),
            entry(EntryType::SyscallAvailableHint2, [1 << 0, 0]),
            entry(EntryType::ProcessHandle, [0xFFFF_8001, 0]),
            entry(EntryType::RandomSeed, [7, 9]),
            entry(EntryType::LastLoadResult, [0, 0]),
            entry(EntryType::EndOfList, [0x4000, 12]),
        ];

        let env = Env::parse(&entries).unwrap();

        assert!(!env.is_nso());
        assert_eq!(env.main_thread_handle(), Some(0x1234));
        let (addr, size) = env.heap_override().unwrap();
        assert_eq!(addr.as_ptr() as usize, 0x8000_0000);
        assert_eq!(size, 0x1000_0000);
        assert!(env.is_syscall_hinted(0x01));
        assert!(!env.is_syscall_hinted(0x02));
        assert!(env.is_syscall_hinted(0x80));
        assert_eq!(env.own_process_handle(), Some(0xFFFF_8001));
        assert_eq!(env.random_seed(), Some([7, 9]));
        assert_eq!(env.last_load_result(), None);
        assert_eq!(env.loader_info().map(|(_, len)| len), Some(12));
    }

    #[test]
    fn test_parse_hos_version_with_atmosphere_magic() {
        let entries = [
            entry(EntryType::HosVersion, [0x000F_0000, 0x41544d4f53504852]),
            entry(EntryType::EndOfList, [0, 0]),
        ];

        let env = Env::parse(&entries).unwrap();

        assert_eq!(env.hos_version(), Some(HosVersion::new(15, 0, 0)));
        assert!(env.is_atmosphere());
        assert!(env.loader_info().is_none());
    }

    #[test]
    fn test_parse_applet_override_flag() {
        let entries = [
            entry(EntryType::AppletType, [AppletType::SystemApplication as u64, 1]),
            entry(EntryType::EndOfList, [0, 0]),
        ];

        let env = Env::parse(&entries).unwrap();

        assert_eq!(env.applet_type(), AppletType::Application);
    }

    #[test]
    fn test_parse_unknown_mandatory_key_fails() {
        let entries = [
            ConfigEntry { key: 42, flags: 1, value: [0, 0] },
            entry(EntryType::EndOfList, [0, 0]),
        ];

        let err = Env::parse(&entries).unwrap_err();

        assert_eq!(err, EnvError::UnknownMandatoryKey { key: 42 });
        assert_eq!(err.result_code().module(), 346);
        assert_eq!(err.result_code().description(), 142);
    }

    #[test]
    fn test_parse_mandatory_unhandled_key_fails() {
        for key in [
            EntryType::AppletWorkaround,
            EntryType::Reserved9,
            EntryType::AllocPages,
            EntryType::LockRegion,
        ] {
            let mandatory = [
                ConfigEntry::new(key, config::ENTRY_FLAG_IS_MANDATORY, [0, 0]),
                entry(EntryType::EndOfList, [0, 0]),
            ];
            let err = Env::parse(&mandatory).unwrap_err();
            assert_eq!(err, EnvError::UnknownMandatoryKey { key: key as u32 });
            assert_eq!(
                err.result_code(),
                ResultCode::from_parts(rc::MODULE_HOMEBREW_ABI, 100 + key as u32)
            );

            let optional = [entry(key, [0, 0]), entry(EntryType::EndOfList, [0, 0])];
            assert!(Env::parse(&optional).is_ok());
        }
    }

    #[test]
    fn test_parse_unknown_optional_key_is_skipped() {
        let entries = [
            ConfigEntry { key: 42, flags: 0, value: [0, 0] },
            entry(EntryType::MainThreadHandle, [5, 0]),
            entry(EntryType::EndOfList, [0, 0]),
        ];

        let env = Env::parse(&entries).unwrap();

        assert_eq!(env.main_thread_handle(), Some(5));
    }

    #[test]
    fn test_parse_requires_terminator() {
        let entries = [entry(EntryType::MainThreadHandle, [5, 0])];

        let err = Env::parse(&entries).unwrap_err();
        assert_eq!(err, EnvError::MissingEndOfList);
    }

    #[test]
    fn test_parse_service_overrides() {
        let name = ServiceName::new_truncate("hid");
        let entries = [
            entry(EntryType::OverrideService, [name.to_u64(), 0x55]),
            entry(EntryType::EndOfList, [0, 0]),
        ];

        let env = Env::parse(&entries).unwrap();

        assert_eq!(env.service_override(name), Some(0x55));
        assert_eq!(env.service_override(ServiceName::new_truncate("sm:")), None);
    }

    #[test]
    fn test_from_raw_walks_until_terminator() {
        let entries = [
            entry(EntryType::MainThreadHandle, [9, 0]),
            entry(EntryType::EndOfList, [0, 0]),
        ];

        let env = unsafe { Env::from_raw(entries.as_ptr(), 0) }.unwrap();
        let nso = unsafe { Env::from_raw(core::ptr::null(), 3) }.unwrap();

        assert_eq!(env.main_thread_handle(), Some(9));
        assert!(nso.is_nso());
        assert_eq!(nso.main_thread_handle(), Some(3));
    }
}
