//! # WCS Console
//!
//! Operator console for a 3-axis stage. Operators type positions in a work
//! coordinate system (millimeters from a zero they choose); the console
//! turns them into machine-absolute set-points for the motion backend and
//! reports positions back in the work frame.
//!
//! # Module Structure
//!
//! - [`offsets`] - `AxisOffsetStore`, the work ↔ machine transform
//! - [`command`] - Operator command grammar
//! - [`session`] - `Session`: backend, axis handles and offsets with an
//!   explicit open/close lifecycle
//! - [`interpreter`] - `CommandInterpreter`, the read-eval-print loop
//! - [`input`] - Line sources and the cancel flag
//! - [`error`] - `ConsoleError`
//!
//! # Data Flow
//!
//! ```text
//! operator line ──► command::parse ──► CommandInterpreter
//!                                          │
//!                    ┌─────────────────────┼──────────────────────┐
//!                    ▼                     ▼                      ▼
//!              zero: read abs,      move: to_machine,      status: read abs,
//!              store offset         set target             to_work, mm
//! ```

pub mod command;
pub mod error;
pub mod input;
pub mod interpreter;
pub mod offsets;
pub mod session;

pub use crate::command::Command;
pub use crate::error::ConsoleError;
pub use crate::interpreter::{CommandInterpreter, ExitReason};
pub use crate::offsets::AxisOffsetStore;
pub use crate::session::{Session, StatusLine};
