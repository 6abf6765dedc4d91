//! Calibration state machine.
//!
//! Owned by the command consumer and published read-only to ingress.
//!
//! ```text
//!  Unknown ──(status: calibration_done)──► Calibrated(extent)
//!     ▲                                          │
//!     └──────────(any dispatch failure)──────────┘
//! ```
//!
//! There is no terminal state.

use std::fmt;

use crate::mapper::CanvasExtent;
use crate::state::DeviceStatus;

/// Whether the plotter is ready, and on which canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CalibrationState {
    /// Extent unknown; the consumer polls `get_status` and does not drain.
    #[default]
    Unknown,

    /// Device reported calibration done with this extent.
    Calibrated(CanvasExtent),
}

impl fmt::Display for CalibrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::Calibrated(e) => write!(f, "Calibrated({}x{})", e.max_x, e.max_y),
        }
    }
}

impl CalibrationState {
    pub fn is_calibrated(&self) -> bool {
        matches!(self, Self::Calibrated(_))
    }

    /// The canvas extent, once known.
    pub fn extent(&self) -> Option<CanvasExtent> {
        match self {
            Self::Calibrated(extent) => Some(*extent),
            Self::Unknown => None,
        }
    }

    // ── Transitions ──────────────────────────────────────────────

    /// Apply a status report.
    ///
    /// Valid from: `Unknown`. Returns `true` if the state moved to
    /// `Calibrated`. A calibrated state is left untouched; its extent
    /// only changes after a demotion.
    pub fn apply_status(&mut self, status: &DeviceStatus) -> bool {
        match (*self, status.extent()) {
            (Self::Unknown, Some(extent)) => {
                *self = Self::Calibrated(extent);
                true
            }
            _ => false,
        }
    }

    /// Forget the extent after a failed dispatch.
    ///
    /// Returns `true` if the state was `Calibrated`.
    pub fn demote(&mut self) -> bool {
        let was_calibrated = self.is_calibrated();
        *self = Self::Unknown;
        was_calibrated
    }
}
