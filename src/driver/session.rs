//! Session lifecycle: create, configure, maximize, tear down

use log::{error, info, warn};
use std::time::Duration;

use super::error::{DriverError, DriverResult};
use super::gesture::GestureExecutor;
use super::traits::AutomationSession;
use super::wait::{ElementWait, PollConfig};
use super::windows::{Capabilities, WindowsDriverClient};

/// The two timeout classes of a session, plus page load
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionTimeouts {
    /// Ceiling for every direct element lookup
    pub implicit: Duration,
    /// Ceiling for each explicit condition wait
    pub explicit: Duration,
    pub page_load: Duration,
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self {
            implicit: Duration::from_secs(10),
            explicit: Duration::from_secs(15),
            page_load: Duration::from_secs(30),
        }
    }
}

/// One live connection to the automation endpoint
pub struct Session {
    driver: Box<dyn AutomationSession>,
    timeouts: SessionTimeouts,
}

impl Session {
    /// Open a remote session and apply its implicit wait.
    ///
    /// Any failure here is a `DriverError::Connection`.
    pub async fn open(
        endpoint: &str,
        capabilities: &Capabilities,
        timeouts: SessionTimeouts,
    ) -> DriverResult<Self> {
        info!("Opening automation session at {}", endpoint);
        let client = WindowsDriverClient::connect(endpoint, capabilities).await?;

        Self::attach(Box::new(client), timeouts)
            .await
            .map_err(|e| match e {
                DriverError::Connection { .. } => e,
                other => DriverError::Connection {
                    endpoint: endpoint.to_string(),
                    message: other.to_string(),
                },
            })
    }

    /// Take ownership of an already created remote session
    pub async fn attach(
        driver: Box<dyn AutomationSession>,
        timeouts: SessionTimeouts,
    ) -> DriverResult<Self> {
        if let Err(e) = driver.set_timeouts(timeouts.implicit, timeouts.page_load).await {
            // Do not leave the application running behind a half-configured session
            if let Err(quit_err) = driver.quit().await {
                warn!(
                    "Could not quit half-configured session {} - {}",
                    driver.session_id(),
                    quit_err
                );
            }
            return Err(e);
        }

        info!(
            "Session {} ready with timeouts - Implicit: {}s, Explicit: {}s",
            driver.session_id(),
            timeouts.implicit.as_secs(),
            timeouts.explicit.as_secs()
        );

        Ok(Self { driver, timeouts })
    }

    pub fn id(&self) -> &str {
        self.driver.session_id()
    }

    pub fn driver(&self) -> &dyn AutomationSession {
        self.driver.as_ref()
    }

    pub fn timeouts(&self) -> SessionTimeouts {
        self.timeouts
    }

    /// Explicit-wait engine using the session's explicit timeout
    pub fn wait(&self) -> ElementWait<'_> {
        self.wait_with(PollConfig::new(self.timeouts.explicit))
    }

    pub fn wait_with(&self, config: PollConfig) -> ElementWait<'_> {
        ElementWait::new(self.driver(), config)
    }

    pub fn gestures(&self) -> GestureExecutor<'_> {
        GestureExecutor::new(self.driver())
    }

    /// Maximize the application window. Best-effort.
    pub async fn maximize(&self) -> bool {
        match self.driver.maximize_window().await {
            Ok(()) => {
                info!("Application window maximized");
                true
            }
            Err(e) => {
                warn!("Could not maximize window - {}", e);
                false
            }
        }
    }

    pub async fn screenshot(&self) -> DriverResult<Vec<u8>> {
        self.driver.screenshot().await
    }

    /// Release the remote session.
    ///
    /// Never fails: a teardown error is logged and reported as `false` so it
    /// cannot mask the outcome of the test that ran before it.
    pub async fn close(self) -> bool {
        let session_id = self.id().to_string();
        match self.driver.quit().await {
            Ok(()) => {
                info!("Session {} closed", session_id);
                true
            }
            Err(e) => {
                let err = DriverError::Teardown {
                    session_id,
                    message: e.to_string(),
                };
                error!("{}", err);
                false
            }
        }
    }
}
