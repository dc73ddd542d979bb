//! Login page of the application under test
//!
//! The flow moves through `Start -> OnboardingDismissed -> CredentialsEntered
//! -> Submitted -> Success`; any propagated failure leaves it in `Failure`.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::driver::gesture::GestureOrigin;
use crate::driver::traits::{keys, ElementHandle, Locator};
use crate::driver::wait::Condition;
use crate::driver::{DriverError, Session};
use crate::report::Reporter;

/// Pause after each UI step while animations finish
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(1);

/// UI Automation property holding an edit control's text
const VALUE_ATTRIBUTE: &str = "Value.Value";

/// Elements of the login page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
    LoginButton,
    SkipButton,
    OnboardingImage,
    WelcomeBanner,
}

impl LoginField {
    pub fn locator(&self) -> Locator {
        let xpath = match self {
            LoginField::Email => "//*[contains(@Name, 'Email address')]/Edit",
            LoginField::Password => "//*[contains(@Name, 'Password')]/Edit",
            LoginField::LoginButton => "//Button[@Name='Log in']",
            LoginField::SkipButton => "//Button[@Name='Skip' or @Name='SKIP']",
            LoginField::OnboardingImage => "//*[contains(@Name, 'been looking for')]",
            LoginField::WelcomeBanner => "//*[contains(@Name, 'Welcome back!')]",
        };
        Locator::XPath(xpath.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Start,
    OnboardingDismissed,
    CredentialsEntered,
    Submitted,
    Success,
    Failure,
}

impl fmt::Display for LoginState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Error)]
#[error("{step} failed: {source}")]
pub struct LoginError {
    pub step: &'static str,
    #[source]
    pub source: DriverError,
}

impl LoginError {
    fn at(step: &'static str, source: DriverError) -> Self {
        Self { step, source }
    }
}

pub struct LoginPage<'a> {
    session: &'a Session,
    reporter: &'a Reporter,
    settle: Duration,
    state: LoginState,
}

impl<'a> LoginPage<'a> {
    pub fn new(session: &'a Session, reporter: &'a Reporter) -> Self {
        Self {
            session,
            reporter,
            settle: DEFAULT_SETTLE,
            state: LoginState::Start,
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub fn state(&self) -> LoginState {
        self.state
    }

    async fn settle(&self) {
        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }
    }

    fn fail(&mut self, err: LoginError) -> LoginError {
        self.state = LoginState::Failure;
        self.reporter.error(format!("Login failed: {}", err));
        err
    }

    /// Dismiss the onboarding carousel.
    ///
    /// The swipe on the onboarding image and the "Welcome back!" focus are
    /// best-effort; a missing skip button is not.
    pub async fn skip_welcome_screen(&mut self) -> Result<(), LoginError> {
        self.reporter.info("Attempting to skip welcome screen");

        match self.swipe_onboarding().await {
            Ok(()) => self.reporter.info("Swiped onboarding image"),
            Err(e) => self
                .reporter
                .warn(format!("Onboarding image not swiped, continuing - {}", e)),
        }

        if let Err(e) = self.click_when_ready(LoginField::SkipButton).await {
            return Err(self.fail(LoginError::at("Skipping onboarding", e)));
        }
        self.reporter.info("Clicked Skip button");
        self.settle().await;

        match self.focus_welcome_back().await {
            Ok(()) => self.reporter.info("Scrolled past welcome screen"),
            Err(e) => self
                .reporter
                .warn(format!("Could not scroll welcome screen - {}", e)),
        }

        self.state = LoginState::OnboardingDismissed;
        Ok(())
    }

    async fn swipe_onboarding(&self) -> Result<(), DriverError> {
        let image = self
            .session
            .wait()
            .until(Condition::Presence, &LoginField::OnboardingImage.locator())
            .await?;

        // Start right of the center and drag left across it
        self.session
            .gestures()
            .swipe(
                &GestureOrigin::element_offset(&image, 200, 0),
                -400,
                0,
                Duration::from_millis(600),
            )
            .await?;
        self.settle().await;
        Ok(())
    }

    async fn focus_welcome_back(&self) -> Result<(), DriverError> {
        let banner = self
            .session
            .wait()
            .until(Condition::Presence, &LoginField::WelcomeBanner.locator())
            .await?;
        self.session.driver().click(&banner).await?;

        self.session
            .gestures()
            .swipe_window(0.95, 0.05, Duration::from_millis(100))
            .await?;
        self.settle().await;
        Ok(())
    }

    /// Fill both credential fields and submit
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), LoginError> {
        self.reporter.info(format!("Logging in with email: {}", email));

        if let Err(e) = self.fill(LoginField::Email, email).await {
            return Err(self.fail(LoginError::at("Entering email", e)));
        }
        self.reporter.info("Entered email");

        if let Err(e) = self.fill(LoginField::Password, password).await {
            return Err(self.fail(LoginError::at("Entering password", e)));
        }
        self.reporter.info("Entered password");
        self.state = LoginState::CredentialsEntered;

        if let Err(e) = self.click_when_ready(LoginField::LoginButton).await {
            return Err(self.fail(LoginError::at("Submitting credentials", e)));
        }
        self.state = LoginState::Submitted;
        self.reporter.info("Clicked Log in button");
        self.settle().await;

        self.state = LoginState::Success;
        Ok(())
    }

    async fn click_when_ready(&self, field: LoginField) -> Result<ElementHandle, DriverError> {
        let element = self
            .session
            .wait()
            .until(Condition::Clickable, &field.locator())
            .await?;
        self.session.driver().click(&element).await?;
        Ok(element)
    }

    /// Focus a text field, clear whatever it holds and type `value`
    async fn fill(&self, field: LoginField, value: &str) -> Result<(), DriverError> {
        let element = self.click_when_ready(field).await?;
        self.clear(&element).await?;
        self.session.driver().send_keys(&element, value).await?;
        self.settle().await;
        Ok(())
    }

    /// Select-all then delete: two key events regardless of the content length
    async fn clear(&self, element: &ElementHandle) -> Result<(), DriverError> {
        let driver = self.session.driver();
        let current = driver.attribute(element, VALUE_ATTRIBUTE).await?;
        if current.map_or(true, |v| v.is_empty()) {
            return Ok(());
        }

        driver.send_keys(element, &keys::select_all()).await?;
        driver.send_keys(element, &keys::DELETE.to_string()).await
    }

    /// Whether both credential fields are visible
    pub async fn is_displayed(&self) -> bool {
        let wait = self.session.wait();
        wait.holds(Condition::Visibility, &LoginField::Email.locator())
            .await
            && wait
                .holds(Condition::Visibility, &LoginField::Password.locator())
                .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::actions::PointerAction;
    use crate::driver::testing::{FakeElement, FakeSession};
    use crate::driver::traits::Point;
    use crate::driver::SessionTimeouts;
    use std::path::Path;
    use std::time::Instant;

    const EXPLICIT: Duration = Duration::from_millis(300);

    fn login_screen() -> FakeSession {
        FakeSession::new()
            .with_element(
                FakeElement::new("image", LoginField::OnboardingImage.locator())
                    .rect(100.0, 100.0, 400.0, 200.0),
            )
            .with_element(FakeElement::new("skip", LoginField::SkipButton.locator()))
            .with_element(FakeElement::new("banner", LoginField::WelcomeBanner.locator()))
            .with_element(FakeElement::new("email", LoginField::Email.locator()))
            .with_element(FakeElement::new("password", LoginField::Password.locator()))
            .with_element(FakeElement::new("login", LoginField::LoginButton.locator()))
    }

    async fn attach(fake: &FakeSession) -> Session {
        let timeouts = SessionTimeouts {
            explicit: EXPLICIT,
            ..SessionTimeouts::default()
        };
        Session::attach(Box::new(fake.clone()), timeouts)
            .await
            .unwrap()
    }

    fn reporter() -> Reporter {
        Reporter::console(Path::new("unused"))
    }

    #[tokio::test]
    async fn test_successful_login() {
        let fake = login_screen();
        let session = attach(&fake).await;
        let reporter = reporter();
        let mut page = LoginPage::new(&session, &reporter).with_settle(Duration::ZERO);
        assert_eq!(page.state(), LoginState::Start);

        page.skip_welcome_screen().await.unwrap();
        assert_eq!(page.state(), LoginState::OnboardingDismissed);

        assert!(page.is_displayed().await);
        page.login("user@example.com", "secret").await.unwrap();
        assert_eq!(page.state(), LoginState::Success);

        assert_eq!(
            fake.clicks(),
            vec!["skip", "banner", "email", "password", "login"]
        );
        assert_eq!(fake.value_of("email").as_deref(), Some("user@example.com"));
        assert_eq!(fake.value_of("password").as_deref(), Some("secret"));

        // Onboarding swipe: 200px right of the image center, 400px to the left
        let swipes = fake.dispatched();
        assert_eq!(swipes.len(), 2);
        assert_eq!(swipes[0].start(), Some(Point::new(500, 200)));
        assert_eq!(swipes[0].end(), Some(Point::new(100, 200)));
        assert!(matches!(
            swipes[1].actions()[2],
            PointerAction::PointerMove { duration: 100, .. }
        ));

        let (entries, _) = reporter.take();
        assert!(entries
            .iter()
            .any(|e| e.message == "Logging in with email: user@example.com"));
        assert!(entries.iter().all(|e| !e.message.contains("secret")));
    }

    #[tokio::test]
    async fn test_password_timeout_fails_flow() {
        let fake = FakeSession::new()
            .with_element(FakeElement::new("email", LoginField::Email.locator()))
            .with_element(FakeElement::new("login", LoginField::LoginButton.locator()));
        let session = attach(&fake).await;
        let reporter = reporter();
        let mut page = LoginPage::new(&session, &reporter).with_settle(Duration::ZERO);

        let start = Instant::now();
        let err = page.login("user@example.com", "secret").await.unwrap_err();

        assert!(start.elapsed() >= EXPLICIT);
        assert_eq!(err.step, "Entering password");
        match &err.source {
            DriverError::Timeout {
                condition, locator, ..
            } => {
                assert_eq!(*condition, Condition::Clickable);
                assert_eq!(*locator, LoginField::Password.locator());
            }
            other => panic!("expected timeout, got {:?}", other),
        }
        assert_eq!(page.state(), LoginState::Failure);
        assert!(!fake.clicks().contains(&"login".to_string()));

        let (entries, _) = reporter.take();
        assert!(entries
            .iter()
            .any(|e| e.level == "ERROR" && e.message.starts_with("Login failed")));
    }

    #[tokio::test]
    async fn test_absent_onboarding_is_skipped() {
        let fake = FakeSession::new()
            .with_element(FakeElement::new("skip", LoginField::SkipButton.locator()));
        let session = attach(&fake).await;
        let reporter = reporter();
        let mut page = LoginPage::new(&session, &reporter).with_settle(Duration::ZERO);

        page.skip_welcome_screen().await.unwrap();

        assert_eq!(page.state(), LoginState::OnboardingDismissed);
        assert_eq!(fake.clicks(), vec!["skip"]);
        assert!(fake.dispatched().is_empty());

        let (entries, _) = reporter.take();
        let warnings = entries.iter().filter(|e| e.level == "WARN").count();
        assert_eq!(warnings, 2);
    }

    #[tokio::test]
    async fn test_late_welcome_banner_is_still_focused() {
        let fake = FakeSession::new()
            .with_element(FakeElement::new("image", LoginField::OnboardingImage.locator()))
            .with_element(FakeElement::new("skip", LoginField::SkipButton.locator()))
            .with_element(
                FakeElement::new("banner", LoginField::WelcomeBanner.locator())
                    .appears_after(Duration::from_millis(100)),
            );
        let session = attach(&fake).await;
        let reporter = reporter();
        let mut page = LoginPage::new(&session, &reporter).with_settle(Duration::ZERO);

        page.skip_welcome_screen().await.unwrap();

        assert_eq!(fake.clicks(), vec!["skip", "banner"]);
        assert_eq!(fake.dispatched().len(), 2);

        let (entries, _) = reporter.take();
        assert!(entries
            .iter()
            .any(|e| e.message == "Scrolled past welcome screen"));
    }

    #[tokio::test]
    async fn test_missing_skip_button_is_fatal() {
        let fake = FakeSession::new().with_element(FakeElement::new(
            "image",
            LoginField::OnboardingImage.locator(),
        ));
        let session = attach(&fake).await;
        let reporter = reporter();
        let mut page = LoginPage::new(&session, &reporter).with_settle(Duration::ZERO);

        let err = page.skip_welcome_screen().await.unwrap_err();
        assert_eq!(err.step, "Skipping onboarding");
        assert_eq!(page.state(), LoginState::Failure);
    }

    #[tokio::test]
    async fn test_prefilled_field_cleared_in_constant_events() {
        let fake = FakeSession::new()
            .with_element(
                FakeElement::new("email", LoginField::Email.locator())
                    .value("a-very-long-previous-address@example.com"),
            )
            .with_element(FakeElement::new("password", LoginField::Password.locator()))
            .with_element(FakeElement::new("login", LoginField::LoginButton.locator()));
        let session = attach(&fake).await;
        let reporter = reporter();
        let mut page = LoginPage::new(&session, &reporter).with_settle(Duration::ZERO);

        page.login("user@example.com", "secret").await.unwrap();

        assert_eq!(
            fake.keys_sent_to("email"),
            vec![
                keys::select_all(),
                keys::DELETE.to_string(),
                "user@example.com".to_string()
            ]
        );
        // Empty field: typed directly
        assert_eq!(fake.keys_sent_to("password"), vec!["secret".to_string()]);
        assert_eq!(fake.value_of("email").as_deref(), Some("user@example.com"));
    }

    #[tokio::test]
    async fn test_is_displayed_needs_both_fields() {
        let fake = FakeSession::new()
            .with_element(FakeElement::new("email", LoginField::Email.locator()))
            .with_element(FakeElement::new("password", LoginField::Password.locator()).hidden());
        let session = attach(&fake).await;
        let reporter = reporter();
        let page = LoginPage::new(&session, &reporter);

        assert!(!page.is_displayed().await);
    }
}
