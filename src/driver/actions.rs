//! W3C pointer action sequences
//!
//! A drag is always `move(0ms) -> down -> move(N ms) -> up` for a single
//! virtual pointer. The only way to build a [`PointerSequence`] is
//! [`PointerSequence::drag`], which rejects a zero drag duration.

use serde::Serialize;
use serde_json::json;
use std::time::Duration;

use super::error::{DriverError, DriverResult};
use super::traits::Point;

/// Left button / primary contact
const PRIMARY_BUTTON: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Viewport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointerAction {
    #[serde(rename_all = "camelCase")]
    PointerMove {
        /// Milliseconds
        duration: u64,
        origin: Origin,
        x: i32,
        y: i32,
    },
    PointerDown {
        button: u32,
    },
    PointerUp {
        button: u32,
    },
}

impl PointerAction {
    fn move_to(point: Point, duration: Duration) -> Self {
        PointerAction::PointerMove {
            duration: duration.as_millis() as u64,
            origin: Origin::Viewport,
            x: point.x,
            y: point.y,
        }
    }
}

/// One input source and its ordered actions, dispatched atomically
#[derive(Debug, Clone, PartialEq)]
pub struct PointerSequence {
    id: String,
    kind: PointerKind,
    actions: Vec<PointerAction>,
}

impl PointerSequence {
    /// Press at `start`, drag to `end` over `duration`, release.
    pub fn drag(start: Point, end: Point, duration: Duration) -> DriverResult<Self> {
        if duration.as_millis() == 0 {
            return Err(DriverError::InvalidGesture(
                "drag duration must be at least 1ms".to_string(),
            ));
        }

        Ok(Self {
            id: "finger".to_string(),
            kind: PointerKind::Touch,
            actions: vec![
                PointerAction::move_to(start, Duration::ZERO),
                PointerAction::PointerDown {
                    button: PRIMARY_BUTTON,
                },
                PointerAction::move_to(end, duration),
                PointerAction::PointerUp {
                    button: PRIMARY_BUTTON,
                },
            ],
        })
    }

    pub fn actions(&self) -> &[PointerAction] {
        &self.actions
    }

    /// First positioning point of the sequence
    pub fn start(&self) -> Option<Point> {
        self.actions.iter().find_map(|a| match a {
            PointerAction::PointerMove { x, y, .. } => Some(Point::new(*x, *y)),
            _ => None,
        })
    }

    /// Last move target of the sequence
    pub fn end(&self) -> Option<Point> {
        self.actions.iter().rev().find_map(|a| match a {
            PointerAction::PointerMove { x, y, .. } => Some(Point::new(*x, *y)),
            _ => None,
        })
    }

    /// Body for `POST /session/{id}/actions`
    pub fn to_request_body(&self) -> serde_json::Value {
        json!({
            "actions": [{
                "type": "pointer",
                "id": self.id,
                "parameters": { "pointerType": self.kind },
                "actions": self.actions,
            }]
        })
    }
}
