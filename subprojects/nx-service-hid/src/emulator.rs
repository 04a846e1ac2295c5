//! In-process stand-ins for the HID service.
//!
//! [`SharedMemoryBuffer`] is a heap-allocated shared-memory block that tests
//! write into with the producer-side `push` and setter methods of the rings and
//! npad entries. [`RecordingServer`] answers every request with a canned reply
//! and logs it, and [`BufferMapper`] hands out the buffer as the mapped block.

use alloc::{boxed::Box, sync::Arc, vec::Vec};
use core::ptr::NonNull;

use nx_rt_env::ResultCode;
use spin::Mutex;

use crate::{
    dispatch::{
        Dispatch, DispatchError, MapSharedMemory, RemoteHandle, Request, Response, Session,
        SharedMemoryMapping,
    },
    proto::{applet_resource_cmds, cmds},
    shmem::{HidSharedMemory, RetryLimit, StateReader},
};

/// Kernel result for a handle the mapper does not know.
const INVALID_HANDLE: ResultCode = ResultCode::from_parts(1, 114);

/// Zero-initialized shared-memory block owned by the process.
pub struct SharedMemoryBuffer {
    memory: Box<HidSharedMemory>,
}

impl SharedMemoryBuffer {
    pub fn new() -> Self {
        // SAFETY: The block holds only atomics, plain-data cells and byte
        // arrays, for which all-zero bytes are valid.
        let memory = unsafe { Box::<HidSharedMemory>::new_zeroed().assume_init() };
        Self { memory }
    }

    #[inline]
    pub fn memory(&self) -> &HidSharedMemory {
        &self.memory
    }

    pub fn reader(&self, limit: RetryLimit) -> StateReader<'_> {
        StateReader::new(&self.memory, limit)
    }
}

impl Default for SharedMemoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: The block is boxed, so its address is stable and it stays alive as
// long as any clone of the `Arc` does.
unsafe impl SharedMemoryMapping for Arc<SharedMemoryBuffer> {
    fn as_ptr(&self) -> NonNull<HidSharedMemory> {
        NonNull::from(self.memory())
    }
}

/// Maps [`RecordingServer::SHARED_MEMORY_HANDLE`] to a shared buffer.
pub struct BufferMapper {
    buffer: Arc<SharedMemoryBuffer>,
    failure: Option<ResultCode>,
}

impl BufferMapper {
    pub fn new(buffer: Arc<SharedMemoryBuffer>) -> Self {
        Self {
            buffer,
            failure: None,
        }
    }

    /// Makes every mapping attempt fail with `rc`.
    pub fn failing(mut self, rc: ResultCode) -> Self {
        self.failure = Some(rc);
        self
    }
}

impl MapSharedMemory for BufferMapper {
    type Mapping = Arc<SharedMemoryBuffer>;

    fn map_read_only(
        &self,
        handle: RemoteHandle,
        size: usize,
    ) -> Result<Arc<SharedMemoryBuffer>, ResultCode> {
        if let Some(rc) = self.failure {
            return Err(rc);
        }
        if handle != RecordingServer::SHARED_MEMORY_HANDLE || size != HidSharedMemory::SIZE {
            return Err(INVALID_HANDLE);
        }
        Ok(Arc::clone(&self.buffer))
    }
}

/// One request as seen by [`RecordingServer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub session: Session,
    pub cmd_id: u32,
    pub data: Vec<u8>,
    pub send_pid: bool,
    pub in_pointers: Vec<Vec<u8>>,
}

/// Fake IHidServer that logs requests and answers with canned replies.
///
/// Sub-interface and handle replies use the fixed ids below. Every other reply
/// carries 16 zero bytes unless overridden with [`reply_with`](Self::reply_with).
pub struct RecordingServer {
    requests: Mutex<Vec<RecordedRequest>>,
    rejections: Mutex<Vec<(Session, u32, ResultCode)>>,
    replies: Mutex<Vec<(Session, u32, Response)>>,
    closed: Mutex<Vec<Session>>,
}

impl RecordingServer {
    pub const HID_SESSION: Session = Session::from_raw(0x100);
    pub const APPLET_RESOURCE_SESSION: Session = Session::from_raw(0x101);
    pub const VIBRATION_LIST_SESSION: Session = Session::from_raw(0x102);
    pub const SHARED_MEMORY_HANDLE: RemoteHandle = RemoteHandle::from_raw(0x200);
    pub const STYLE_SET_EVENT_HANDLE: RemoteHandle = RemoteHandle::from_raw(0x201);

    pub fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            rejections: Mutex::new(Vec::new()),
            replies: Mutex::new(Vec::new()),
            closed: Mutex::new(Vec::new()),
        }
    }

    /// Rejects every later IHidServer request with `cmd_id`.
    pub fn reject(&self, cmd_id: u32, rc: ResultCode) {
        self.reject_on(Self::HID_SESSION, cmd_id, rc);
    }

    pub fn reject_on(&self, session: Session, cmd_id: u32, rc: ResultCode) {
        self.rejections.lock().push((session, cmd_id, rc));
    }

    /// Answers later IHidServer requests with `cmd_id` with `response`.
    pub fn reply_with(&self, cmd_id: u32, response: Response) {
        self.replies
            .lock()
            .push((Self::HID_SESSION, cmd_id, response));
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Command ids received on `session`, in order.
    pub fn commands_on(&self, session: Session) -> Vec<u32> {
        self.requests
            .lock()
            .iter()
            .filter(|req| req.session == session)
            .map(|req| req.cmd_id)
            .collect()
    }

    /// Last request received on `session` with `cmd_id`.
    pub fn last_request(&self, session: Session, cmd_id: u32) -> Option<RecordedRequest> {
        self.requests
            .lock()
            .iter()
            .rev()
            .find(|req| req.session == session && req.cmd_id == cmd_id)
            .cloned()
    }

    /// Sessions closed so far, in order.
    pub fn closed(&self) -> Vec<Session> {
        self.closed.lock().clone()
    }

    fn default_reply(session: Session, cmd_id: u32) -> Response {
        let mut resp = Response::with_data(&[0; 16]);
        match (session, cmd_id) {
            (Self::HID_SESSION, cmds::CREATE_APPLET_RESOURCE) => {
                resp.object = Some(Self::APPLET_RESOURCE_SESSION);
            }
            (Self::HID_SESSION, cmds::CREATE_ACTIVE_VIBRATION_DEVICE_LIST) => {
                resp.object = Some(Self::VIBRATION_LIST_SESSION);
            }
            (Self::HID_SESSION, cmds::ACQUIRE_NPAD_STYLE_SET_UPDATE_EVENT_HANDLE) => {
                resp.copy_handle = Some(Self::STYLE_SET_EVENT_HANDLE);
            }
            (Self::APPLET_RESOURCE_SESSION, applet_resource_cmds::GET_SHARED_MEMORY_HANDLE) => {
                resp.copy_handle = Some(Self::SHARED_MEMORY_HANDLE);
            }
            _ => {}
        }
        resp
    }
}

impl Default for RecordingServer {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatch for RecordingServer {
    fn dispatch(&self, session: Session, request: &Request<'_>) -> Result<Response, DispatchError> {
        self.requests.lock().push(RecordedRequest {
            session,
            cmd_id: request.cmd_id,
            data: request.data.to_vec(),
            send_pid: request.send_pid,
            in_pointers: request.in_pointers.iter().map(|buf| buf.to_vec()).collect(),
        });

        let rejection = self
            .rejections
            .lock()
            .iter()
            .find(|(s, cmd, _)| *s == session && *cmd == request.cmd_id)
            .map(|(_, _, rc)| *rc);
        if let Some(rc) = rejection {
            return Err(DispatchError::Rejected(rc));
        }

        let canned = self
            .replies
            .lock()
            .iter()
            .find(|(s, cmd, _)| *s == session && *cmd == request.cmd_id)
            .map(|(_, _, resp)| resp.clone());
        Ok(canned.unwrap_or_else(|| Self::default_reply(session, request.cmd_id)))
    }

    fn close(&self, session: Session) {
        self.closed.lock().push(session);
    }
}
