//! In-memory automation session for unit tests

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use super::actions::PointerSequence;
use super::error::{DriverError, DriverResult};
use super::traits::{keys, AutomationSession, ElementHandle, Locator, Rect};

pub struct FakeElement {
    id: String,
    locator: Locator,
    rect: Rect,
    displayed: bool,
    enabled: bool,
    value: String,
    selected_all: bool,
    appears_at: Option<Instant>,
}

impl FakeElement {
    pub fn new(id: &str, locator: Locator) -> Self {
        Self {
            id: id.to_string(),
            locator,
            rect: Rect {
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 40.0,
            },
            displayed: true,
            enabled: true,
            value: String::new(),
            selected_all: false,
            appears_at: None,
        }
    }

    pub fn rect(mut self, x: f64, y: f64, width: f64, height: f64) -> Self {
        self.rect = Rect {
            x,
            y,
            width,
            height,
        };
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    pub fn appears_after(mut self, delay: Duration) -> Self {
        self.appears_at = Some(Instant::now() + delay);
        self
    }

    fn is_present(&self) -> bool {
        self.appears_at.map_or(true, |at| Instant::now() >= at)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetTimeouts { implicit: Duration, page_load: Duration },
    Maximize,
    FindElement(Locator),
    Click(String),
    SendKeys(String, String),
    Actions(PointerSequence),
    Screenshot,
    Quit,
}

#[derive(Default)]
struct State {
    elements: Vec<FakeElement>,
    calls: Vec<Call>,
}

/// Scripted session: a flat list of elements and a log of every call.
///
/// Clones share the same state.
#[derive(Clone)]
pub struct FakeSession {
    state: Arc<Mutex<State>>,
    window: Rect,
    lookup_delay: Option<Duration>,
    dead: bool,
    fail_actions: bool,
    fail_maximize: bool,
    fail_quit: bool,
}

impl FakeSession {
    pub fn new() -> Self {
        Self {
            state: Arc::default(),
            window: Rect {
                x: 0.0,
                y: 0.0,
                width: 1280.0,
                height: 800.0,
            },
            lookup_delay: None,
            dead: false,
            fail_actions: false,
            fail_maximize: false,
            fail_quit: false,
        }
    }

    pub fn with_element(self, element: FakeElement) -> Self {
        self.state.lock().unwrap().elements.push(element);
        self
    }

    pub fn with_lookup_delay(mut self, delay: Duration) -> Self {
        self.lookup_delay = Some(delay);
        self
    }

    pub fn with_dead_session(mut self) -> Self {
        self.dead = true;
        self
    }

    pub fn with_failing_actions(mut self) -> Self {
        self.fail_actions = true;
        self
    }

    pub fn with_failing_maximize(mut self) -> Self {
        self.fail_maximize = true;
        self
    }

    pub fn with_failing_quit(mut self) -> Self {
        self.fail_quit = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn lookups(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::FindElement(_)))
            .count()
    }

    pub fn clicks(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Click(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Every `send_keys` payload sent to one element
    pub fn keys_sent_to(&self, id: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SendKeys(el, text) if el == id => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn dispatched(&self) -> Vec<PointerSequence> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Actions(seq) => Some(seq),
                _ => None,
            })
            .collect()
    }

    pub fn value_of(&self, id: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .elements
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.value.clone())
    }

    fn record(&self, call: Call) -> DriverResult<()> {
        self.state.lock().unwrap().calls.push(call);
        if self.dead {
            return Err(DriverError::InvalidSession("session deleted".to_string()));
        }
        Ok(())
    }

    fn with_present<T>(
        &self,
        element: &ElementHandle,
        f: impl FnOnce(&mut FakeElement) -> T,
    ) -> DriverResult<T> {
        let mut state = self.state.lock().unwrap();
        state
            .elements
            .iter_mut()
            .find(|e| e.id == element.id() && e.is_present())
            .map(f)
            .ok_or_else(|| DriverError::StaleElement(element.id().to_string()))
    }
}

#[async_trait]
impl AutomationSession for FakeSession {
    fn session_id(&self) -> &str {
        "fake-session"
    }

    async fn set_timeouts(&self, implicit: Duration, page_load: Duration) -> DriverResult<()> {
        self.record(Call::SetTimeouts {
            implicit,
            page_load,
        })
    }

    async fn maximize_window(&self) -> DriverResult<()> {
        self.record(Call::Maximize)?;
        if self.fail_maximize {
            return Err(DriverError::from_protocol(
                "unsupported operation",
                "window cannot be maximized",
            ));
        }
        Ok(())
    }

    async fn window_rect(&self) -> DriverResult<Rect> {
        Ok(self.window)
    }

    async fn find_element(&self, locator: &Locator) -> DriverResult<ElementHandle> {
        self.record(Call::FindElement(locator.clone()))?;
        if let Some(delay) = self.lookup_delay {
            tokio::time::sleep(delay).await;
        }
        let state = self.state.lock().unwrap();
        state
            .elements
            .iter()
            .find(|e| &e.locator == locator && e.is_present())
            .map(|e| ElementHandle(e.id.clone()))
            .ok_or_else(|| DriverError::NoSuchElement(locator.clone()))
    }

    async fn element_rect(&self, element: &ElementHandle) -> DriverResult<Rect> {
        self.with_present(element, |e| e.rect)
    }

    async fn is_displayed(&self, element: &ElementHandle) -> DriverResult<bool> {
        self.with_present(element, |e| e.displayed)
    }

    async fn is_enabled(&self, element: &ElementHandle) -> DriverResult<bool> {
        self.with_present(element, |e| e.enabled)
    }

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> DriverResult<Option<String>> {
        let name = name.to_string();
        self.with_present(element, move |e| {
            (name == "Value.Value").then(|| e.value.clone())
        })
    }

    async fn click(&self, element: &ElementHandle) -> DriverResult<()> {
        self.record(Call::Click(element.id().to_string()))?;
        self.with_present(element, |_| ())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> DriverResult<()> {
        self.record(Call::SendKeys(element.id().to_string(), text.to_string()))?;
        self.with_present(element, |e| {
            if text == keys::select_all() {
                e.selected_all = true;
            } else if text == keys::DELETE.to_string() {
                if e.selected_all {
                    e.value.clear();
                } else {
                    e.value.pop();
                }
                e.selected_all = false;
            } else {
                if e.selected_all {
                    e.value.clear();
                    e.selected_all = false;
                }
                e.value.push_str(text);
            }
        })
    }

    async fn perform_actions(&self, sequence: &PointerSequence) -> DriverResult<()> {
        self.record(Call::Actions(sequence.clone()))?;
        if self.fail_actions {
            return Err(DriverError::from_protocol(
                "unknown error",
                "pointer injection failed",
            ));
        }
        Ok(())
    }

    async fn screenshot(&self) -> DriverResult<Vec<u8>> {
        self.record(Call::Screenshot)?;
        Ok(b"\x89PNG\r\n\x1a\nfake".to_vec())
    }

    async fn quit(&self) -> DriverResult<()> {
        self.record(Call::Quit)?;
        if self.fail_quit {
            return Err(DriverError::from_protocol(
                "unknown error",
                "application already exited",
            ));
        }
        Ok(())
    }
}
