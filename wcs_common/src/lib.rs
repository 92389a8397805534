//! WCS Common Library
//!
//! Shared types for the WCS console workspace: axis identity, the motion
//! backend contract, configuration loading and system constants.
//!
//! # Module Structure
//!
//! - [`axis`] - `Axis` enum and the axis-keyed `AxisTable`
//! - [`hal`] - Motion backend trait, errors and backend configuration
//! - [`config`] - Configuration loading traits and the console config
//! - [`consts`] - System-wide constants
//!
//! # Usage
//!
//! ```rust
//! use wcs_common::axis::Axis;
//!
//! let axis: Axis = "y".parse().unwrap();
//! assert_eq!(axis, Axis::Y);
//! ```

pub mod axis;
pub mod config;
pub mod consts;
pub mod hal;
