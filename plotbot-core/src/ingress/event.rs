//! Drawing event payloads.

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// One message from a drawing client.
///
/// ```text
/// {"type":"goToXY","x":10,"y":-4,"oldX":0,"oldY":0}
/// {"type":"penUp"}
/// ```
///
/// Any other `type` decodes as [`DrawEvent::Unknown`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DrawEvent {
    #[serde(rename = "goToXY")]
    GoToXy {
        x: f64,
        y: f64,
        #[serde(rename = "oldX")]
        old_x: f64,
        #[serde(rename = "oldY")]
        old_y: f64,
    },

    #[serde(rename = "penUp")]
    PenUp,

    #[serde(other)]
    Unknown,
}

impl DrawEvent {
    pub fn parse(text: &str) -> Result<Self, BridgeError> {
        serde_json::from_str(text).map_err(BridgeError::MalformedEvent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_go_to() {
        let event = DrawEvent::parse(r#"{"type":"goToXY","x":1,"y":2.5,"oldX":-3,"oldY":4}"#)
            .unwrap();
        assert_eq!(
            event,
            DrawEvent::GoToXy {
                x: 1.0,
                y: 2.5,
                old_x: -3.0,
                old_y: 4.0
            }
        );
    }

    #[test]
    fn parses_pen_up_and_unknown() {
        assert_eq!(DrawEvent::parse(r#"{"type":"penUp"}"#).unwrap(), DrawEvent::PenUp);
        assert_eq!(
            DrawEvent::parse(r#"{"type":"setColor","color":"red"}"#).unwrap(),
            DrawEvent::Unknown
        );
    }

    #[test]
    fn rejects_malformed() {
        for text in [
            "not json",
            r#"{"x":1}"#,
            r#"{"type":"goToXY","x":1,"y":2}"#,
            r#"{"type":"goToXY","x":"a","y":2,"oldX":0,"oldY":0}"#,
        ] {
            assert!(
                matches!(DrawEvent::parse(text), Err(BridgeError::MalformedEvent(_))),
                "{text} should be rejected"
            );
        }
    }
}
