//! Homebrew loader configuration entries.

/// Flag bit marking an entry the program must understand.
pub const ENTRY_FLAG_IS_MANDATORY: u32 = 1 << 0;

/// Applet flag: launch a system application as a regular application.
pub const APPLET_FLAG_APPLICATION_OVERRIDE: u64 = 1 << 0;

/// One entry of the loader configuration block.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigEntry {
    pub key: u32,
    pub flags: u32,
    pub value: [u64; 2],
}

impl ConfigEntry {
    /// Creates an entry.
    pub const fn new(key: EntryType, flags: u32, value: [u64; 2]) -> Self {
        Self {
            key: key as u32,
            flags,
            value,
        }
    }

    /// Returns true if the loader marked this entry mandatory.
    #[inline]
    pub const fn is_mandatory(&self) -> bool {
        self.flags & ENTRY_FLAG_IS_MANDATORY != 0
    }
}

/// Entry keys known to this runtime.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    /// List terminator, carries the loader info string.
    EndOfList = 0,
    MainThreadHandle = 1,
    /// Buffers for chain loading the next program.
    NextLoadPath = 2,
    OverrideHeap = 3,
    OverrideService = 4,
    Argv = 5,
    /// Hints for SVCs 0x00-0x7F.
    SyscallAvailableHint = 6,
    AppletType = 7,
    AppletWorkaround = 8,
    Reserved9 = 9,
    ProcessHandle = 10,
    LastLoadResult = 11,
    AllocPages = 12,
    LockRegion = 13,
    RandomSeed = 14,
    UserIdStorage = 15,
    HosVersion = 16,
    /// Hints for SVCs 0x80-0xBF.
    SyscallAvailableHint2 = 17,
}

impl EntryType {
    pub const fn from_u32(value: u32) -> Option<Self> {
        Some(match value {
            0 => Self::EndOfList,
            1 => Self::MainThreadHandle,
            2 => Self::NextLoadPath,
            3 => Self::OverrideHeap,
            4 => Self::OverrideService,
            5 => Self::Argv,
            6 => Self::SyscallAvailableHint,
            7 => Self::AppletType,
            8 => Self::AppletWorkaround,
            9 => Self::Reserved9,
            10 => Self::ProcessHandle,
            11 => Self::LastLoadResult,
            12 => Self::AllocPages,
            13 => Self::LockRegion,
            14 => Self::RandomSeed,
            15 => Self::UserIdStorage,
            16 => Self::HosVersion,
            17 => Self::SyscallAvailableHint2,
            _ => return None,
        })
    }
}

/// Applet type the program runs as.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppletType {
    None = -2,
    #[default]
    Default = -1,
    Application = 0,
    SystemApplet = 1,
    LibraryApplet = 2,
    OverlayApplet = 3,
    SystemApplication = 4,
}

impl AppletType {
    /// Decodes the loader value, applying the application override flag.
    ///
    /// Unknown values fall back to [`AppletType::Default`].
    pub fn from_entry(value: u64, flags: u64) -> Self {
        let applet_type = match value as u32 as i32 {
            -2 => Self::None,
            0 => Self::Application,
            1 => Self::SystemApplet,
            2 => Self::LibraryApplet,
            3 => Self::OverlayApplet,
            4 => Self::SystemApplication,
            _ => Self::Default,
        };

        if flags & APPLET_FLAG_APPLICATION_OVERRIDE != 0 && applet_type == Self::SystemApplication
        {
            Self::Application
        } else {
            applet_type
        }
    }
}

/// Service name packed into a `u64`, up to 8 ASCII bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct ServiceName(u64);

impl ServiceName {
    /// Packs a name, truncated to 8 bytes.
    pub const fn new_truncate(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut raw = 0u64;
        let mut i = 0;
        while i < bytes.len() && i < 8 {
            raw |= (bytes[i] as u64) << (8 * i);
            i += 1;
        }
        Self(raw)
    }

    pub const fn from_u64(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn to_u64(self) -> u64 {
        self.0
    }
}

/// A service session handle handed over by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceOverride {
    pub name: ServiceName,
    pub handle: u32,
}

/// Account user id.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountUid {
    pub uid: [u64; 2],
}
