//! Motion backend contract and configuration.
//!
//! This module contains the trait every motion backend implements and the
//! configuration types consumed by backend implementations.

pub mod backend;
pub mod config;
