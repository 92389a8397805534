//! Axis identity and axis-keyed tables.
//!
//! The stage has exactly three linear axes. Every per-axis mapping in the
//! workspace (offsets, backend handles, scene paths, status values) is an
//! [`AxisTable`], so all of them share the same key set by construction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};
use std::str::FromStr;
use thiserror::Error;

/// Raised when text names an axis outside {x, y, z}.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid axis '{0}' (use x, y or z)")]
pub struct InvalidAxis(pub String);

/// One of the three stage axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Axis {
    /// X axis
    X = 0,
    /// Y axis
    Y = 1,
    /// Z axis
    Z = 2,
}

impl Axis {
    /// All axes in canonical order (X, Y, Z).
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Upper-case display label.
    pub const fn label(self) -> &'static str {
        match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Axis {
    type Err = InvalidAxis;

    /// Case-insensitive: `x`, `X`, `y`, `Y`, `z`, `Z`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Axis::ALL
            .into_iter()
            .find(|axis| axis.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| InvalidAxis(s.to_string()))
    }
}

/// Fixed table holding exactly one value per axis.
///
/// Deserializes from a TOML table with exactly the keys `x`, `y` and `z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisTable<T> {
    /// Value for X
    pub x: T,
    /// Value for Y
    pub y: T,
    /// Value for Z
    pub z: T,
}

impl<T> AxisTable<T> {
    /// Create a table from explicit per-axis values.
    pub const fn new(x: T, y: T, z: T) -> Self {
        Self { x, y, z }
    }

    /// Build a table by evaluating `f` for X, Y and Z in that order.
    pub fn from_fn(mut f: impl FnMut(Axis) -> T) -> Self {
        let x = f(Axis::X);
        let y = f(Axis::Y);
        let z = f(Axis::Z);
        Self { x, y, z }
    }

    /// Fallible variant of [`AxisTable::from_fn`]; stops at the first error.
    pub fn try_from_fn<E>(mut f: impl FnMut(Axis) -> Result<T, E>) -> Result<Self, E> {
        let x = f(Axis::X)?;
        let y = f(Axis::Y)?;
        let z = f(Axis::Z)?;
        Ok(Self { x, y, z })
    }

    /// Iterate `(axis, value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Axis, &T)> {
        Axis::ALL.into_iter().map(move |axis| (axis, &self[axis]))
    }

    /// Map every value, keeping the axis association.
    pub fn map<U>(&self, mut f: impl FnMut(Axis, &T) -> U) -> AxisTable<U> {
        AxisTable::from_fn(|axis| f(axis, &self[axis]))
    }
}

impl<T> Index<Axis> for AxisTable<T> {
    type Output = T;

    fn index(&self, axis: Axis) -> &T {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

impl<T> IndexMut<Axis> for AxisTable<T> {
    fn index_mut(&mut self, axis: Axis) -> &mut T {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }
}
