//! Error taxonomy for the automation driver layer

use std::time::Duration;
use thiserror::Error;

use super::traits::Locator;
use super::wait::Condition;

pub type DriverResult<T> = std::result::Result<T, DriverError>;

#[derive(Debug, Error)]
pub enum DriverError {
    /// Session could not be established
    #[error("Failed to connect to automation endpoint {endpoint}: {message}")]
    Connection { endpoint: String, message: String },

    /// A wait condition was not satisfied within its budget
    #[error("Timed out after {}ms waiting for {condition} of {locator}", waited.as_millis())]
    Timeout {
        condition: Condition,
        locator: Locator,
        waited: Duration,
    },

    /// The endpoint rejected or failed an action sequence
    #[error("Gesture dispatch failed: {0}")]
    GestureDispatch(Box<DriverError>),

    /// Failure while closing the session
    #[error("Failed to close session {session_id}: {message}")]
    Teardown { session_id: String, message: String },

    #[error("No element matches {0}")]
    NoSuchElement(Locator),

    #[error("Element {0} is no longer attached to the UI tree")]
    StaleElement(String),

    #[error("Session is not valid: {0}")]
    InvalidSession(String),

    #[error("Invalid gesture: {0}")]
    InvalidGesture(String),

    /// Any other error reported by the endpoint
    #[error("{error}: {message}")]
    Protocol { error: String, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl DriverError {
    /// Build an error from a W3C error code (or a legacy JSON Wire status)
    pub fn from_protocol(error: &str, message: &str) -> Self {
        match error {
            "stale element reference" => DriverError::StaleElement(message.to_string()),
            "invalid session id" | "session not created" => {
                DriverError::InvalidSession(message.to_string())
            }
            _ => DriverError::Protocol {
                error: error.to_string(),
                message: message.to_string(),
            },
        }
    }

    /// Whether retrying the same request can never succeed.
    ///
    /// Wait loops treat every other failure as "not yet satisfied".
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DriverError::Connection { .. } | DriverError::InvalidSession(_)
        )
    }

    /// Whether the error means the element is missing from the tree
    pub fn is_no_such_element(&self) -> bool {
        match self {
            DriverError::NoSuchElement(_) => true,
            DriverError::Protocol { error, .. } => error == "no such element",
            _ => false,
        }
    }
}

/// Map legacy JSON Wire Protocol status codes to W3C error codes
pub fn legacy_status_error(status: i64) -> &'static str {
    match status {
        7 => "no such element",
        10 => "stale element reference",
        6 => "invalid session id",
        33 => "session not created",
        21 => "timeout",
        11 => "element not visible",
        12 => "invalid element state",
        _ => "unknown error",
    }
}
