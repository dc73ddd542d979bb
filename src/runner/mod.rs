pub mod state;

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use std::time::Duration;

use crate::driver::{Capabilities, Session};
use crate::pages::login::{LoginError, LoginPage, DEFAULT_SETTLE};
use crate::report::types::TestResults;
use crate::report::{json, junit, Reporter};
use crate::utils::config::{Config, Credentials};

pub use state::*;

/// Class name the cases are reported under
pub const SUITE_NAME: &str = "LoginTest";

pub const SUCCESSFUL_LOGIN: &str = "successful_login";

/// Open a session against the configured endpoint, run the login suite,
/// tear down and write `test-results.json` and `junit.xml` into `output`.
///
/// Fails only when the run cannot start; failed test cases are reported in
/// the returned state.
pub async fn run_suite(config: &Config, output: &Path) -> Result<SuiteState> {
    let reporter = Reporter::new(&config.log_file, &config.screenshot_directory)
        .with_context(|| format!("Failed to open log file {}", config.log_file.display()))?;

    reporter.info("Setting up test environment");
    reporter.info(format!("Environment: {}", config.environment));
    reporter.info(format!("App path: {}", config.app_path));

    let capabilities = Capabilities::windows_app(&config.app_path);
    let session = match Session::open(&config.appium_url, &capabilities, config.timeouts()).await {
        Ok(session) => session,
        Err(e) => {
            reporter.error(format!("Failed to initialize test environment: {}", e));
            return Err(e).context("Could not start the application session");
        }
    };
    session.maximize().await;
    reporter.info("Test environment setup completed successfully");

    let mut suite = SuiteState::new(&uuid::Uuid::new_v4().to_string(), &config.environment);
    suite.start();

    LoginSuite::new(config, &session, &reporter)
        .run(&mut suite)
        .await;

    reporter.info("Tearing down test environment");
    if session.close().await {
        reporter.info("Application closed successfully");
    } else {
        reporter.error("Error during teardown, see log for details");
    }
    suite.finish();

    let results = to_results(&suite);
    let results_path = json::write_results(&results, output)?;
    let junit_path = junit::write_report(&results, output)?;
    print_summary(&results);
    println!(
        "\n{} JSON report saved to: {}",
        "📄".to_string().blue(),
        results_path.display().to_string().cyan()
    );
    println!(
        "{} JUnit report saved to: {}",
        "📊".to_string().blue(),
        junit_path.display().to_string().cyan()
    );

    Ok(suite)
}

pub fn to_results(suite: &SuiteState) -> TestResults {
    TestResults {
        run_id: suite.run_id.clone(),
        environment: suite.environment.clone(),
        cases: suite.cases.iter().map(|c| c.to_report()).collect(),
        summary: suite.summary(),
        generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}

fn print_summary(results: &TestResults) {
    println!();
    for case in &results.cases {
        let mark = match &case.status {
            CaseStatus::Passed => "✓".green(),
            CaseStatus::Failed { .. } => "✗".red(),
            _ => "-".yellow(),
        };
        println!("  {} {}::{}", mark, case.class_name, case.name);
        if let Some(error) = case.error() {
            println!("      {}", error.red());
        }
    }

    let summary = &results.summary;
    println!(
        "\n{} passed, {} failed, {} skipped ({:.1}s)",
        summary.passed.to_string().green(),
        summary.failed.to_string().red(),
        summary.skipped.to_string().yellow(),
        summary.total_duration_ms.unwrap_or(0) as f64 / 1000.0
    );
}

/// The login test cases, run sequentially over one open session
pub struct LoginSuite<'a> {
    config: &'a Config,
    session: &'a Session,
    reporter: &'a Reporter,
    settle: Duration,
}

impl<'a> LoginSuite<'a> {
    pub fn new(config: &'a Config, session: &'a Session, reporter: &'a Reporter) -> Self {
        Self {
            config,
            session,
            reporter,
            settle: DEFAULT_SETTLE,
        }
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    pub async fn run(&self, suite: &mut SuiteState) {
        // Suite-level lines stay in the log file only
        self.reporter.take();
        suite.add_case(self.successful_login().await);
    }

    async fn successful_login(&self) -> CaseState {
        let mut case = CaseState::new(SUCCESSFUL_LOGIN, SUITE_NAME);

        let Some(credentials) = &self.config.valid_credentials else {
            self.reporter.warn(format!(
                "Skipping {}: valid.email and valid.password are not configured",
                SUCCESSFUL_LOGIN
            ));
            case.skip("valid credentials are not configured".to_string());
            return self.collect(case);
        };

        case.start();
        self.reporter.info(format!("Starting test: {}", SUCCESSFUL_LOGIN));

        let mut page = LoginPage::new(self.session, self.reporter).with_settle(self.settle);
        let outcome = self.log_in(&mut page, credentials).await;

        match outcome {
            Ok(()) => {
                self.reporter.info("Login attempt completed");
                if self.config.screenshot_on_pass {
                    self.screenshot("After_Login_Success").await;
                }
                case.pass();
            }
            Err(e) => case.fail(e.to_string()),
        }

        self.after_test(&case).await;
        self.collect(case)
    }

    /// Case setup (onboarding, settle, checkpoint screenshot) then the login
    async fn log_in(
        &self,
        page: &mut LoginPage<'_>,
        credentials: &Credentials,
    ) -> Result<(), LoginError> {
        page.skip_welcome_screen().await?;
        self.pause(self.settle * 2).await;
        self.screenshot("After_Setup").await;

        self.reporter.info(format!(
            "Testing successful login in {} environment",
            self.config.environment
        ));
        self.reporter
            .info(format!("Using email: {}", credentials.email));
        page.login(&credentials.email, &credentials.password).await
    }

    /// Outcome logging and the failure screenshot, once per case
    async fn after_test(&self, case: &CaseState) {
        match case.error() {
            Some(error) => {
                self.reporter.fail(format!("Test Failed: {}", case.name));
                self.reporter.fail(format!("Failure Reason: {}", error));
                if self.config.screenshot_on_fail {
                    self.screenshot(&format!("Test_Failed_{}", case.name)).await;
                }
            }
            None => self.reporter.pass(format!("Test Passed: {}", case.name)),
        }
    }

    /// Attach everything the sink received while the case ran
    fn collect(&self, mut case: CaseState) -> CaseState {
        let (logs, attachments) = self.reporter.take();
        case.logs = logs;
        case.attachments = attachments;
        case
    }

    /// Best-effort: a failed capture never changes the test outcome
    async fn screenshot(&self, name: &str) {
        let saved = match self.session.screenshot().await {
            Ok(png) => self
                .reporter
                .attach_screenshot(name, &png)
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        if let Err(e) = saved {
            self.reporter
                .error(format!("Failed to take screenshot: {}", e));
        }
    }

    async fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}
