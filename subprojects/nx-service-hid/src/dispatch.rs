//! Collaborator seams for the HID service.
//!
//! The HID client never talks to the kernel directly. Remote calls go through a
//! [`Dispatch`] implementation and the shared-memory block is obtained through
//! [`MapSharedMemory`], so the same client runs against the real IPC transport
//! or against the in-process emulator.

use core::ptr::NonNull;

use nx_rt_env::ResultCode;
use zerocopy::{FromBytes, Immutable, IntoBytes};

use crate::shmem::HidSharedMemory;

/// Maximum size of a reply payload.
pub const RESPONSE_DATA_MAX: usize = 0x40;

/// A remote session (service or sub-interface object).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Session(u32);

impl Session {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn to_raw(self) -> u32 {
        self.0
    }
}

/// A kernel object handle copied out of a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct RemoteHandle(u32);

impl RemoteHandle {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn to_raw(self) -> u32 {
        self.0
    }
}

/// An outgoing request to a numbered remote operation.
#[derive(Debug, Clone, Copy)]
pub struct Request<'a> {
    pub cmd_id: u32,
    /// Raw input payload.
    pub data: &'a [u8],
    /// Whether the caller's process id is attached.
    pub send_pid: bool,
    /// Input pointer buffers, in order.
    pub in_pointers: &'a [&'a [u8]],
}

impl<'a> Request<'a> {
    pub const fn new(cmd_id: u32) -> Self {
        Self {
            cmd_id,
            data: &[],
            send_pid: false,
            in_pointers: &[],
        }
    }

    /// Attaches a fixed-layout input payload.
    pub fn with_data<T: IntoBytes + Immutable>(mut self, data: &'a T) -> Self {
        self.data = data.as_bytes();
        self
    }

    pub const fn with_pid(mut self) -> Self {
        self.send_pid = true;
        self
    }

    pub const fn with_pointers(mut self, buffers: &'a [&'a [u8]]) -> Self {
        self.in_pointers = buffers;
        self
    }
}

/// Reply to a [`Request`].
#[derive(Debug, Clone)]
pub struct Response {
    data: [u8; RESPONSE_DATA_MAX],
    len: usize,
    /// Copied handle, if the operation returns one.
    pub copy_handle: Option<RemoteHandle>,
    /// Sub-interface session, if the operation returns an object.
    pub object: Option<Session>,
}

impl Response {
    /// Empty reply.
    pub fn empty() -> Self {
        Self {
            data: [0; RESPONSE_DATA_MAX],
            len: 0,
            copy_handle: None,
            object: None,
        }
    }

    /// Reply carrying `data` as its payload, truncated to [`RESPONSE_DATA_MAX`].
    pub fn with_data(data: &[u8]) -> Self {
        let mut resp = Self::empty();
        let len = data.len().min(RESPONSE_DATA_MAX);
        resp.data[..len].copy_from_slice(&data[..len]);
        resp.len = len;
        resp
    }

    /// Reply carrying a typed payload.
    pub fn with_value<T: IntoBytes + Immutable>(value: &T) -> Self {
        Self::with_data(value.as_bytes())
    }

    pub fn data(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Reads a typed value from the start of the payload.
    pub fn read<T: FromBytes>(&self) -> Option<T> {
        T::read_from_prefix(self.data()).ok().map(|(value, _)| value)
    }
}

/// Generic remote-call primitive.
pub trait Dispatch {
    /// Sends `request` to `session` and waits for the reply.
    fn dispatch(&self, session: Session, request: &Request<'_>) -> Result<Response, DispatchError>;

    /// Closes a session obtained from a reply.
    fn close(&self, session: Session);
}

impl<D: Dispatch + ?Sized> Dispatch for &D {
    fn dispatch(&self, session: Session, request: &Request<'_>) -> Result<Response, DispatchError> {
        (**self).dispatch(session, request)
    }

    fn close(&self, session: Session) {
        (**self).close(session)
    }
}

/// Error returned by a [`Dispatch`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// The request never reached the remote side.
    #[error("failed to send request")]
    Send(#[source] ResultCode),
    /// The remote side rejected the request.
    #[error("remote rejected request")]
    Rejected(#[source] ResultCode),
}

impl DispatchError {
    /// The result code, verbatim.
    pub fn result_code(&self) -> ResultCode {
        match self {
            Self::Send(rc) | Self::Rejected(rc) => *rc,
        }
    }
}

/// A read-only view of the HID shared-memory block.
///
/// Dropping the mapping unmaps the block.
///
/// # Safety
///
/// [`as_ptr`](Self::as_ptr) must return a pointer to [`HidSharedMemory::SIZE`]
/// readable bytes, aligned for [`HidSharedMemory`], that stays valid and at the
/// same address for as long as the mapping lives.
pub unsafe trait SharedMemoryMapping {
    fn as_ptr(&self) -> NonNull<HidSharedMemory>;
}

/// Maps a remote shared-memory handle into the local address space.
pub trait MapSharedMemory {
    type Mapping: SharedMemoryMapping;

    /// Maps `size` bytes of the block behind `handle`, read-only.
    fn map_read_only(&self, handle: RemoteHandle, size: usize) -> Result<Self::Mapping, ResultCode>;
}
