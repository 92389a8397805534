//! Operator input.
//!
//! The interpreter pulls lines from a [`LineSource`]. [`StdinSource`] reads
//! the terminal on a helper thread so that a pending read can still observe
//! the [`CancelFlag`]; [`ReaderSource`] wraps any `BufRead` for scripted
//! sessions and tests.
//!
//! Lines are read as raw bytes and decoded one at a time, so a badly encoded
//! line is reported as malformed input and the next line is still read.

use crate::error::ConsoleError;
use std::io::{self, BufRead};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::debug;

/// How often a blocked stdin read re-checks the cancel flag.
const CANCEL_POLL: Duration = Duration::from_millis(50);

/// Shared operator-cancel flag, set from the Ctrl+C handler.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// New flag, not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call from a signal handler thread.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Source of operator command lines.
pub trait LineSource {
    /// Next line without its terminator, or `None` at end of input.
    ///
    /// # Errors
    /// `ConsoleError::OperatorCancel` when the operator interrupted the wait,
    /// `ConsoleError::MalformedCommand` for a line that is not valid UTF-8
    /// (the source stays usable), `ConsoleError::Io` when reading failed.
    fn next_line(&mut self) -> Result<Option<String>, ConsoleError>;
}

/// Decode one raw line, dropping its `\n` or `\r\n` terminator.
fn decode_line(mut bytes: Vec<u8>) -> Result<String, ConsoleError> {
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    if bytes.last() == Some(&b'\r') {
        bytes.pop();
    }
    String::from_utf8(bytes)
        .map_err(|_| ConsoleError::MalformedCommand("input is not valid UTF-8".to_string()))
}

/// Line source over any buffered reader.
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: BufRead> ReaderSource<R> {
    /// Read lines from `reader`.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn next_line(&mut self) -> Result<Option<String>, ConsoleError> {
        let mut line = Vec::new();
        if self.reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }
        decode_line(line).map(Some)
    }
}

/// Line source over process stdin that honours the cancel flag.
pub struct StdinSource {
    lines: Receiver<io::Result<Vec<u8>>>,
    cancel: CancelFlag,
}

impl StdinSource {
    /// Start the stdin reader thread.
    ///
    /// The thread blocks in `read_line` and is left behind at exit.
    pub fn spawn(cancel: CancelFlag) -> Result<Self, ConsoleError> {
        let (tx, lines) = mpsc::channel();
        thread::Builder::new()
            .name("stdin-reader".to_string())
            .spawn(move || {
                let stdin = io::stdin();
                for line in stdin.lock().split(b'\n') {
                    let failed = line.is_err();
                    if tx.send(line).is_err() || failed {
                        break;
                    }
                }
                debug!("stdin reader finished");
            })?;
        Ok(Self { lines, cancel })
    }
}

impl LineSource for StdinSource {
    fn next_line(&mut self) -> Result<Option<String>, ConsoleError> {
        loop {
            if self.cancel.is_cancelled() {
                return Err(ConsoleError::OperatorCancel);
            }
            match self.lines.recv_timeout(CANCEL_POLL) {
                Ok(Ok(line)) => return decode_line(line).map(Some),
                Ok(Err(e)) => return Err(e.into()),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Ok(None),
            }
        }
    }
}
