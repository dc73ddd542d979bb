use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::actions::PointerSequence;
use super::error::DriverResult;

/// Element locator for the remote UI tree.
///
/// A locator may match any number of elements; lookups use the first match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// XPath over the UI Automation tree (e.g. `//Button[@Name='Log in']`)
    XPath(String),
    /// UI Automation `Name` property
    Name(String),
    /// UI Automation `AutomationId` property
    AccessibilityId(String),
    /// UI Automation `ClassName` property
    ClassName(String),
}

impl Locator {
    /// WebDriver `using` strategy for this locator
    pub fn strategy(&self) -> &'static str {
        match self {
            Locator::XPath(_) => "xpath",
            Locator::Name(_) => "name",
            Locator::AccessibilityId(_) => "accessibility id",
            Locator::ClassName(_) => "class name",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Locator::XPath(v)
            | Locator::Name(v)
            | Locator::AccessibilityId(v)
            | Locator::ClassName(v) => v,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} `{}`", self.strategy(), self.value())
    }
}

/// Live reference to a node in the remote accessibility tree.
///
/// Only valid inside the session that returned it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub String);

impl ElementHandle {
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Screen coordinate in viewport pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Bounding box of an element or window
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Rect {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn center(&self) -> Point {
        let x = self.x as i32;
        let y = self.y as i32;
        Point::new(x + self.width as i32 / 2, y + self.height as i32 / 2)
    }
}

/// Remote automation session interface
///
/// Everything above the wire client (waits, gestures, page flows) talks to the
/// application through this trait only.
#[async_trait]
pub trait AutomationSession: Send + Sync {
    /// Remote session identifier
    fn session_id(&self) -> &str;

    /// Apply the session-wide implicit lookup and page-load timeouts
    async fn set_timeouts(&self, implicit: Duration, page_load: Duration) -> DriverResult<()>;

    async fn maximize_window(&self) -> DriverResult<()>;

    /// Application window bounds
    async fn window_rect(&self) -> DriverResult<Rect>;

    /// Find the first element matching the locator.
    ///
    /// Subject to the session's implicit wait.
    async fn find_element(&self, locator: &Locator) -> DriverResult<ElementHandle>;

    async fn element_rect(&self, element: &ElementHandle) -> DriverResult<Rect>;

    async fn is_displayed(&self, element: &ElementHandle) -> DriverResult<bool>;

    async fn is_enabled(&self, element: &ElementHandle) -> DriverResult<bool>;

    /// Read a UI Automation property (e.g. `Value.Value`)
    async fn attribute(&self, element: &ElementHandle, name: &str)
        -> DriverResult<Option<String>>;

    async fn click(&self, element: &ElementHandle) -> DriverResult<()>;

    /// Type into the element. Special keys use the WebDriver key code points.
    async fn send_keys(&self, element: &ElementHandle, text: &str) -> DriverResult<()>;

    /// Dispatch one pointer sequence as a single atomic action request
    async fn perform_actions(&self, sequence: &PointerSequence) -> DriverResult<()>;

    /// Capture the screen as PNG bytes
    async fn screenshot(&self) -> DriverResult<Vec<u8>>;

    /// End the remote session
    async fn quit(&self) -> DriverResult<()>;
}

/// WebDriver key code points
pub mod keys {
    pub const NULL: char = '\u{E000}';
    pub const DELETE: char = '\u{E017}';
    pub const CONTROL: char = '\u{E009}';

    /// Ctrl+A, releasing the modifier afterwards
    pub fn select_all() -> String {
        format!("{}a{}", CONTROL, NULL)
    }
}
