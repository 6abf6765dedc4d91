//! Per-connection pen state.

use crate::command::Command;
use crate::error::BridgeError;
use crate::ingress::DrawEvent;
use crate::mapper::CanvasExtent;

/// Pen bookkeeping for one client connection.
///
/// Remembers the last logical "old" position the pen was moved to
/// with the pen raised. Starts at the origin; dropped with the
/// connection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    old_x: f64,
    old_y: f64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last remembered `(oldX, oldY)`.
    pub fn position(&self) -> (f64, f64) {
        (self.old_x, self.old_y)
    }

    /// Translate one event into device commands.
    ///
    /// `goToXY` needs the canvas extent; without one it fails with
    /// [`BridgeError::Uncalibrated`] and leaves the session untouched.
    pub fn translate(
        &mut self,
        event: &DrawEvent,
        extent: Option<CanvasExtent>,
    ) -> Result<Vec<Command>, BridgeError> {
        match *event {
            DrawEvent::GoToXy { x, y, old_x, old_y } => {
                let extent = extent.ok_or(BridgeError::Uncalibrated)?;
                let mut commands = Vec::with_capacity(4);

                // Note the asymmetry: a changed oldX or an *unchanged* oldY
                // triggers the pen-up travel move.
                if old_x != self.old_x || old_y == self.old_y {
                    commands.push(Command::PenUp);
                    commands.push(Command::go_to(extent.convert(old_x, old_y)));
                    self.old_x = old_x;
                    self.old_y = old_y;
                }

                commands.push(Command::PenDown);
                commands.push(Command::go_to(extent.convert(x, y)));
                Ok(commands)
            }
            DrawEvent::PenUp => Ok(vec![Command::PenUp]),
            DrawEvent::Unknown => Ok(Vec::new()),
        }
    }
}
