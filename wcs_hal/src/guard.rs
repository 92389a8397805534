//! Bounded-timeout backend wrapper.
//!
//! `GuardedBackend` moves a backend onto a dedicated worker thread and turns
//! every trait call into a request/reply round trip with a deadline. A call
//! that misses its deadline returns `BackendError::Timeout`; the worker keeps
//! running it and its late reply is discarded. Calls are served strictly in
//! order, so a stuck call delays (and usually times out) the calls queued
//! behind it until it returns.
//!
//! A timeout does not undo anything: a `set_target_position` that timed out
//! is still applied by the worker when the backend gets to it, so the axis
//! may move after the caller saw the error.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};
use wcs_common::config::ConsoleConfig;
use wcs_common::hal::backend::{AxisHandle, BackendError, MotionBackend};

enum Call {
    Init(Box<ConsoleConfig>),
    Resolve(String),
    GetPosition(AxisHandle),
    SetTarget(AxisHandle, f64),
    Start,
    Stop,
}

#[derive(Debug)]
enum Reply {
    Done,
    Handle(AxisHandle),
    Position(f64),
}

struct Request {
    call: Call,
    reply: Sender<Result<Reply, BackendError>>,
}

/// Backend proxy enforcing a deadline on every call.
pub struct GuardedBackend {
    /// Name of the wrapped backend
    name: &'static str,
    /// Request queue to the worker (None once shut down)
    requests: Option<Sender<Request>>,
    /// Worker thread
    worker: Option<JoinHandle<()>>,
    /// Per-call deadline
    timeout: Duration,
    /// Last call timed out and may still be running
    stalled: bool,
}

impl GuardedBackend {
    /// Move `backend` onto a worker thread and guard it with `timeout`.
    ///
    /// # Errors
    /// Returns `BackendError::InitFailed` if the worker thread cannot be spawned.
    pub fn spawn(backend: Box<dyn MotionBackend>, timeout: Duration) -> Result<Self, BackendError> {
        let name = backend.name();
        let (requests, queue) = mpsc::channel::<Request>();

        let worker = thread::Builder::new()
            .name(format!("{name}-backend"))
            .spawn(move || serve(backend, queue))
            .map_err(|e| BackendError::InitFailed(format!("backend worker: {e}")))?;

        debug!("Backend {} guarded with {:?} call timeout", name, timeout);
        Ok(Self {
            name,
            requests: Some(requests),
            worker: Some(worker),
            timeout,
            stalled: false,
        })
    }

    /// Per-call deadline.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send `call` to the worker and wait up to `timeout` for its reply.
    ///
    /// On `Timeout` the call keeps running on the worker and its effect
    /// (e.g. a set-point) may still be applied.
    fn call(&mut self, call: Call) -> Result<Reply, BackendError> {
        let requests = self.requests.as_ref().ok_or_else(|| {
            BackendError::CommunicationError(format!("{} backend is shut down", self.name))
        })?;

        let (reply, response) = mpsc::channel();
        requests.send(Request { call, reply }).map_err(|_| {
            BackendError::CommunicationError(format!("{} backend worker exited", self.name))
        })?;

        match response.recv_timeout(self.timeout) {
            Ok(result) => {
                self.stalled = false;
                result
            }
            Err(RecvTimeoutError::Timeout) => {
                self.stalled = true;
                warn!("{} backend call exceeded {:?}", self.name, self.timeout);
                Err(BackendError::Timeout(self.timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(BackendError::CommunicationError(
                format!("{} backend worker exited", self.name),
            )),
        }
    }

    fn unexpected(&self, reply: Reply) -> BackendError {
        BackendError::CommunicationError(format!(
            "{} backend sent unexpected reply {:?}",
            self.name, reply
        ))
    }
}

impl MotionBackend for GuardedBackend {
    fn name(&self) -> &'static str {
        self.name
    }

    fn init(&mut self, config: &ConsoleConfig) -> Result<(), BackendError> {
        match self.call(Call::Init(Box::new(config.clone())))? {
            Reply::Done => Ok(()),
            other => Err(self.unexpected(other)),
        }
    }

    fn resolve(&mut self, path: &str) -> Result<AxisHandle, BackendError> {
        match self.call(Call::Resolve(path.to_string()))? {
            Reply::Handle(handle) => Ok(handle),
            other => Err(self.unexpected(other)),
        }
    }

    fn get_position(&mut self, handle: AxisHandle) -> Result<f64, BackendError> {
        match self.call(Call::GetPosition(handle))? {
            Reply::Position(position) => Ok(position),
            other => Err(self.unexpected(other)),
        }
    }

    fn set_target_position(&mut self, handle: AxisHandle, value: f64) -> Result<(), BackendError> {
        match self.call(Call::SetTarget(handle, value))? {
            Reply::Done => Ok(()),
            other => Err(self.unexpected(other)),
        }
    }

    fn start_session(&mut self) -> Result<(), BackendError> {
        match self.call(Call::Start)? {
            Reply::Done => Ok(()),
            other => Err(self.unexpected(other)),
        }
    }

    fn stop_session(&mut self) -> Result<(), BackendError> {
        match self.call(Call::Stop)? {
            Reply::Done => Ok(()),
            other => Err(self.unexpected(other)),
        }
    }
}

impl Drop for GuardedBackend {
    fn drop(&mut self) {
        // Closing the queue ends the worker's receive loop.
        self.requests.take();
        let Some(worker) = self.worker.take() else {
            return;
        };
        if self.stalled {
            warn!(
                "{} backend still busy with a timed-out call, detaching worker",
                self.name
            );
            return;
        }
        if worker.join().is_err() {
            warn!("{} backend worker panicked", self.name);
        }
    }
}

/// Worker loop: execute requests in order until the queue closes.
fn serve(mut backend: Box<dyn MotionBackend>, queue: Receiver<Request>) {
    for Request { call, reply } in queue {
        let result = match call {
            Call::Init(config) => backend.init(&config).map(|()| Reply::Done),
            Call::Resolve(path) => backend.resolve(&path).map(Reply::Handle),
            Call::GetPosition(handle) => backend.get_position(handle).map(Reply::Position),
            Call::SetTarget(handle, value) => backend
                .set_target_position(handle, value)
                .map(|()| Reply::Done),
            Call::Start => backend.start_session().map(|()| Reply::Done),
            Call::Stop => backend.stop_session().map(|()| Reply::Done),
        };
        if reply.send(result).is_err() {
            debug!("Discarded late reply from {} backend", backend.name());
        }
    }
    debug!("{} backend worker exiting", backend.name());
}
