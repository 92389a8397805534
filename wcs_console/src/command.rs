//! Operator command grammar.
//!
//! | Input                    | Command                      |
//! |--------------------------|------------------------------|
//! | `<axis> <mm>`            | [`Command::MoveTo`]          |
//! | `home`                   | [`Command::Home`]            |
//! | `zero <axis>`            | [`Command::ZeroAxis`]        |
//! | `zero all`, `zero tudo`  | [`Command::ZeroAll`]         |
//! | `q`                      | [`Command::Quit`]            |
//!
//! Matching is case-insensitive and tokens are split on whitespace runs.

use std::fmt;
use thiserror::Error;
use wcs_common::axis::{Axis, InvalidAxis};

/// A parsed operator command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Move one axis to a work-frame position in millimeters.
    MoveTo {
        /// Target axis
        axis: Axis,
        /// Work-frame position (mm)
        mm: f64,
    },
    /// Every axis to machine-absolute 0, ignoring offsets.
    Home,
    /// Current position of one axis becomes its work zero.
    ZeroAxis(Axis),
    /// Current position of every axis becomes its work zero.
    ZeroAll,
    /// End the session.
    Quit,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::MoveTo { axis, mm } => write!(f, "move {axis} to {mm} mm"),
            Command::Home => write!(f, "home"),
            Command::ZeroAxis(axis) => write!(f, "zero {axis}"),
            Command::ZeroAll => write!(f, "zero all"),
            Command::Quit => write!(f, "quit"),
        }
    }
}

/// Why a line is not a valid command.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Axis token outside x/y/z.
    #[error(transparent)]
    InvalidAxis(#[from] InvalidAxis),

    /// Command word with the wrong number of arguments.
    #[error("'{word}' takes {expected} argument(s), got {found}")]
    WrongArity {
        /// Command word as typed (lowercased)
        word: String,
        /// Arguments the word takes
        expected: usize,
        /// Arguments supplied
        found: usize,
    },

    /// Position is not a finite decimal number.
    #[error("'{0}' is not a number")]
    NotANumber(String),

    /// First token is neither an axis nor a command word.
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
}

/// Parse one operator line.
///
/// Returns `Ok(None)` for a blank line.
pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim().to_ascii_lowercase();
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&word, args)) = tokens.split_first() else {
        return Ok(None);
    };

    let command = match word {
        "home" => {
            expect_arity(word, args, 0)?;
            Command::Home
        }
        "q" => {
            expect_arity(word, args, 0)?;
            Command::Quit
        }
        "zero" => {
            expect_arity(word, args, 1)?;
            match args[0] {
                "all" | "tudo" => Command::ZeroAll,
                axis => Command::ZeroAxis(axis.parse()?),
            }
        }
        _ => match word.parse::<Axis>() {
            Ok(axis) => {
                expect_arity(word, args, 1)?;
                Command::MoveTo {
                    axis,
                    mm: parse_mm(args[0])?,
                }
            }
            // `w 10` reads as a move on an unknown axis.
            Err(invalid) if args.len() == 1 => return Err(invalid.into()),
            Err(_) => return Err(ParseError::UnknownCommand(word.to_string())),
        },
    };
    Ok(Some(command))
}

fn expect_arity(word: &str, args: &[&str], expected: usize) -> Result<(), ParseError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ParseError::WrongArity {
            word: word.to_string(),
            expected,
            found: args.len(),
        })
    }
}

fn parse_mm(token: &str) -> Result<f64, ParseError> {
    match token.parse::<f64>() {
        Ok(mm) if mm.is_finite() => Ok(mm),
        _ => Err(ParseError::NotANumber(token.to_string())),
    }
}
