//! Read-eval-print loop over a [`Session`].
//!
//! Each cycle prints the work-frame status as the prompt, reads one line,
//! parses it and executes it against the session. Invalid input and backend
//! failures are reported and the loop carries on with the state it had;
//! `q`, end of input, Ctrl+C and output failures end it. The backend session
//! is stopped on every way out.

use crate::command::{self, Command};
use crate::error::ConsoleError;
use crate::input::{CancelFlag, LineSource};
use crate::session::{Session, format_mm};
use std::io::Write;
use std::thread;
use tracing::{debug, info, warn};
use wcs_common::axis::Axis;
use wcs_common::config::ConsoleSettings;
use wcs_common::consts::MM_PER_METER;
use wcs_common::hal::backend::{BackendError, MotionBackend};

const BANNER: &str = "\
--- WCS CONSOLE READY ---
  x 100 | y -5 | z 2.5   move axis to position (mm, work frame)
  zero x | zero all      current position becomes work zero
  home                   all axes to machine zero
  q                      quit";

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Operator typed `q`.
    Quit,
    /// Input stream closed.
    EndOfInput,
    /// Operator pressed Ctrl+C.
    Cancelled,
}

/// What the loop does after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// Leave the loop.
    Quit,
}

/// Operator command loop.
pub struct CommandInterpreter<B: MotionBackend, W: Write> {
    session: Session<B>,
    settings: ConsoleSettings,
    out: W,
    cancel: CancelFlag,
}

impl<B: MotionBackend, W: Write> CommandInterpreter<B, W> {
    /// Loop over `session`, writing prompts and feedback to `out`.
    pub fn new(session: Session<B>, settings: ConsoleSettings, out: W, cancel: CancelFlag) -> Self {
        Self {
            session,
            settings,
            out,
            cancel,
        }
    }

    /// The session being driven.
    pub fn session(&self) -> &Session<B> {
        &self.session
    }

    /// Run until quit, end of input or cancel, then stop the backend.
    ///
    /// # Errors
    /// Fatal errors only: operator I/O failures, or a failure to stop the
    /// backend cleanly.
    pub fn run(mut self, input: &mut impl LineSource) -> Result<ExitReason, ConsoleError> {
        let outcome = self.banner().and_then(|()| self.run_loop(input));

        let Self { session, .. } = self;
        let closed = session.close();

        match outcome {
            Ok(reason) => {
                closed?;
                info!("Console stopped: {:?}", reason);
                Ok(reason)
            }
            Err(e) => {
                if let Err(close_err) = closed {
                    warn!("Backend stop after failure also failed: {}", close_err);
                }
                Err(e)
            }
        }
    }

    fn run_loop(&mut self, input: &mut impl LineSource) -> Result<ExitReason, ConsoleError> {
        loop {
            if self.cancel.is_cancelled() {
                writeln!(self.out)?;
                return Ok(ExitReason::Cancelled);
            }
            self.prompt()?;

            let line = match input.next_line() {
                Ok(Some(line)) => line,
                Ok(None) => {
                    writeln!(self.out)?;
                    return Ok(ExitReason::EndOfInput);
                }
                Err(ConsoleError::OperatorCancel) => {
                    writeln!(self.out)?;
                    return Ok(ExitReason::Cancelled);
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    self.report(&e)?;
                    continue;
                }
            };

            match self.execute_line(&line) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => return Ok(ExitReason::Quit),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => self.report(&e)?,
            }
        }
    }

    /// Parse and execute one operator line. Blank lines do nothing.
    pub fn execute_line(&mut self, line: &str) -> Result<Flow, ConsoleError> {
        match command::parse(line)? {
            Some(command) => self.execute(command),
            None => Ok(Flow::Continue),
        }
    }

    /// Execute one command and print its feedback.
    pub fn execute(&mut self, command: Command) -> Result<Flow, ConsoleError> {
        debug!("Executing {}", command);
        match command {
            Command::MoveTo { axis, mm } => {
                let target = self.session.move_to(axis, mm)?;
                writeln!(
                    self.out,
                    "{} -> {} mm (machine {} mm)",
                    axis,
                    format_mm(target.work_mm),
                    format_mm(target.machine_m * MM_PER_METER)
                )?;
                // Advisory only: the move is not awaited.
                thread::sleep(self.settings.settle());
            }
            Command::Home => {
                self.session.home()?;
                writeln!(self.out, "Homing all axes to machine zero")?;
            }
            Command::ZeroAxis(axis) => {
                let position = self.session.zero_axis(axis)?;
                self.zeroed(axis, position)?;
            }
            Command::ZeroAll => {
                let positions = self.session.zero_all()?;
                for (axis, position) in positions.iter() {
                    self.zeroed(axis, *position)?;
                }
            }
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn zeroed(&mut self, axis: Axis, machine_m: f64) -> Result<(), ConsoleError> {
        writeln!(
            self.out,
            "{} zeroed at {} mm (machine)",
            axis,
            format_mm(machine_m * MM_PER_METER)
        )?;
        Ok(())
    }

    fn banner(&mut self) -> Result<(), ConsoleError> {
        writeln!(self.out, "{BANNER}")?;
        Ok(())
    }

    fn prompt(&mut self) -> Result<(), ConsoleError> {
        let status = match self.session.status() {
            Ok(status) => status.render(self.settings.show_absolute),
            Err(e) => {
                self.report(&e)?;
                "offline".to_string()
            }
        };
        write!(self.out, "\n[{status}] > ")?;
        self.out.flush()?;
        Ok(())
    }

    fn report(&mut self, err: &ConsoleError) -> Result<(), ConsoleError> {
        warn!("{}", err);
        writeln!(self.out, "error: {err}")?;
        if let ConsoleError::BackendUnavailable(BackendError::Timeout(_)) = err {
            writeln!(
                self.out,
                "note: the backend may still complete this call; a set-point may still be applied"
            )?;
        }
        Ok(())
    }
}
