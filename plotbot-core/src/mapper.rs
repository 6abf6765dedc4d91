//! Logical canvas → device coordinate conversion.
//!
//! Drawing clients work in a fixed logical space, 500 units wide and
//! 360 units high, both centred on the origin. The device reports its
//! own extent once calibrated; conversion is a plain linear scale.
//! Out-of-range inputs are extrapolated, never clamped.

use serde::{Deserialize, Serialize};

/// Width of the logical drawing space (x ∈ −250..250).
pub const LOGICAL_WIDTH: f64 = 500.0;

/// Height of the logical drawing space (y ∈ −180..180).
pub const LOGICAL_HEIGHT: f64 = 360.0;

/// Device-reported plotting area, in device units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasExtent {
    pub max_x: f64,
    pub max_y: f64,
}

impl CanvasExtent {
    pub fn new(max_x: f64, max_y: f64) -> Self {
        Self { max_x, max_y }
    }

    /// Map a logical point onto this extent.
    pub fn convert(&self, x: f64, y: f64) -> (f64, f64) {
        convert(x, y, self)
    }
}

/// Map logical `(x, y)` onto the device canvas described by `extent`.
pub fn convert(x: f64, y: f64, extent: &CanvasExtent) -> (f64, f64) {
    let device_x = (x + LOGICAL_WIDTH / 2.0) * extent.max_x / LOGICAL_WIDTH;
    let device_y = (y + LOGICAL_HEIGHT / 2.0) * extent.max_y / LOGICAL_HEIGHT;
    (device_x, device_y)
}
