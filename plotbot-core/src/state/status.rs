//! Payload of the device's `get_status` reply.

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;
use crate::mapper::CanvasExtent;

/// Calibration report from the plotter.
///
/// An uncalibrated device may omit the extent fields entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceStatus {
    pub calibration_done: bool,
    #[serde(default)]
    pub canvas_max_x: f64,
    #[serde(default)]
    pub canvas_max_y: f64,
}

impl DeviceStatus {
    /// Decode a raw `get_status` response.
    pub fn parse(response: &str) -> Result<Self, BridgeError> {
        serde_json::from_str(response).map_err(BridgeError::MalformedStatus)
    }

    /// The usable canvas, if the device is calibrated with a positive extent.
    pub fn extent(&self) -> Option<CanvasExtent> {
        let usable = self.calibration_done && self.canvas_max_x > 0.0 && self.canvas_max_y > 0.0;
        usable.then(|| CanvasExtent::new(self.canvas_max_x, self.canvas_max_y))
    }
}
