//! Explicit waits
//!
//! Polls a condition on a locator against the live UI tree until it holds or
//! the budget runs out. Lookup failures count as "not yet"; only failures
//! that can never recover (dead session, lost connection) end the wait early.

use log::{debug, trace};
use std::fmt;
use std::time::{Duration, Instant};

use super::error::{DriverError, DriverResult};
use super::traits::{AutomationSession, ElementHandle, Locator};

/// Default sleep between two failed polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// What an explicit wait waits for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Element exists in the tree, rendered or not
    Presence,
    /// Element exists and is rendered
    Visibility,
    /// Element is rendered and enabled
    Clickable,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Condition::Presence => "presence",
            Condition::Visibility => "visibility",
            Condition::Clickable => "clickability",
        })
    }
}

/// Configuration for polling operations
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub timeout: Duration,
    pub interval: Duration,
}

impl PollConfig {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(15))
    }
}

/// Explicit-wait engine bound to one session
pub struct ElementWait<'a> {
    session: &'a dyn AutomationSession,
    config: PollConfig,
}

impl<'a> ElementWait<'a> {
    pub fn new(session: &'a dyn AutomationSession, config: PollConfig) -> Self {
        Self { session, config }
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Wait until `condition` holds for the first element matching `locator`.
    ///
    /// Returns within `timeout + interval` when the condition never holds, and
    /// within one interval of it starting to hold.
    pub async fn until(
        &self,
        condition: Condition,
        locator: &Locator,
    ) -> DriverResult<ElementHandle> {
        let start = Instant::now();
        let mut polls = 0u32;

        loop {
            polls += 1;
            let remaining = self.config.timeout.saturating_sub(start.elapsed());

            // The lookup itself may block on the session's implicit wait
            match tokio::time::timeout(remaining, self.evaluate(condition, locator)).await {
                Ok(Ok(Some(element))) => {
                    debug!(
                        "{} of {} satisfied after {} poll(s), {}ms",
                        condition,
                        locator,
                        polls,
                        start.elapsed().as_millis()
                    );
                    return Ok(element);
                }
                Ok(Ok(None)) => {}
                Ok(Err(e)) if e.is_fatal() => return Err(e),
                Ok(Err(e)) => trace!("{} of {} not yet satisfied: {}", condition, locator, e),
                Err(_) => trace!("lookup for {} outlived the wait budget", locator),
            }

            let remaining = self.config.timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                return Err(DriverError::Timeout {
                    condition,
                    locator: locator.clone(),
                    waited: start.elapsed(),
                });
            }

            tokio::time::sleep(self.config.interval.min(remaining)).await;
        }
    }

    /// Whether `condition` comes to hold within the wait budget
    pub async fn holds(&self, condition: Condition, locator: &Locator) -> bool {
        self.until(condition, locator).await.is_ok()
    }

    /// Evaluate the condition once against the current tree
    async fn evaluate(
        &self,
        condition: Condition,
        locator: &Locator,
    ) -> DriverResult<Option<ElementHandle>> {
        let element = match self.session.find_element(locator).await {
            Ok(element) => element,
            Err(e) if e.is_no_such_element() => return Ok(None),
            Err(e) => return Err(e),
        };

        let satisfied = match condition {
            Condition::Presence => true,
            Condition::Visibility => self.session.is_displayed(&element).await?,
            Condition::Clickable => {
                self.session.is_displayed(&element).await?
                    && self.session.is_enabled(&element).await?
            }
        };

        Ok(satisfied.then_some(element))
    }
}
