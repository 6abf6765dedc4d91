//! Device command vocabulary.
//!
//! The plotter understands four plain-text commands. `Command` keeps
//! them typed inside the pipeline and renders the wire form through
//! `Display` at dispatch time.

use std::fmt;

/// Literal acknowledgement returned by the device for every accepted
/// command other than `get_status`.
pub const ACK: &str = "ok";

/// One instruction for the plotter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Query calibration status and canvas extent.
    GetStatus,
    /// Lift the pen.
    PenUp,
    /// Lower the pen.
    PenDown,
    /// Move to a point in device units.
    GoTo { x: f64, y: f64 },
}

impl Command {
    pub fn go_to((x, y): (f64, f64)) -> Self {
        Command::GoTo { x, y }
    }

    /// Returns `true` if `response` is the success reply for this command.
    pub fn is_acknowledged_by(&self, response: &str) -> bool {
        response == ACK
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::GetStatus => write!(f, "get_status"),
            Command::PenUp => write!(f, "pen_up"),
            Command::PenDown => write!(f, "pen_down"),
            Command::GoTo { x, y } => write!(f, "go_to({x},{y})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_vocabulary() {
        assert_eq!(Command::GetStatus.to_string(), "get_status");
        assert_eq!(Command::PenUp.to_string(), "pen_up");
        assert_eq!(Command::PenDown.to_string(), "pen_down");
    }

    #[test]
    fn go_to_drops_trailing_zero_fraction() {
        assert_eq!(Command::go_to((500.0, 300.0)).to_string(), "go_to(500,300)");
        assert_eq!(Command::go_to((0.0, 0.0)).to_string(), "go_to(0,0)");
        assert_eq!(Command::go_to((12.5, -3.25)).to_string(), "go_to(12.5,-3.25)");
    }

    #[test]
    fn only_literal_ok_acknowledges() {
        assert!(Command::PenUp.is_acknowledged_by("ok"));
        assert!(!Command::PenUp.is_acknowledged_by("ok\n"));
        assert!(!Command::PenUp.is_acknowledged_by("error"));
        assert!(!Command::PenUp.is_acknowledged_by(""));
    }
}
