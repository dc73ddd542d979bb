use log::LevelFilter;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use super::properties::Properties;
use crate::driver::SessionTimeouts;

/// Configuration keys
pub mod keys {
    pub const ENVIRONMENT: &str = "environment";
    pub const APP_PATH: &str = "app.path";
    pub const APPIUM_URL: &str = "appium.url";
    pub const VALID_EMAIL: &str = "valid.email";
    pub const VALID_PASSWORD: &str = "valid.password";
    pub const IMPLICIT_WAIT: &str = "implicit.wait";
    pub const EXPLICIT_WAIT: &str = "explicit.wait";
    pub const PAGE_LOAD_TIMEOUT: &str = "page.load.timeout";
    pub const SCREENSHOT_ON_PASS: &str = "screenshot.on.pass";
    pub const SCREENSHOT_ON_FAIL: &str = "screenshot.on.fail";
    pub const SCREENSHOT_DIRECTORY: &str = "screenshot.directory";
    pub const LOG_LEVEL: &str = "log.level";
    pub const LOG_FILE: &str = "log.file";
}

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.properties";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing required configuration key '{0}'")]
    Missing(&'static str),
}

/// Email/password pair
#[derive(Clone, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"********")
            .finish()
    }
}

/// Test run configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment name, informational only
    pub environment: String,

    /// Application under test (executable path or app id)
    pub app_path: String,

    /// Automation endpoint URL
    pub appium_url: String,

    pub valid_credentials: Option<Credentials>,

    pub implicit_wait_secs: u64,
    pub explicit_wait_secs: u64,
    pub page_load_timeout_secs: u64,

    pub screenshot_on_pass: bool,
    pub screenshot_on_fail: bool,
    pub screenshot_directory: PathBuf,

    pub log_level: String,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "test".to_string(),
            app_path: String::new(),
            appium_url: String::new(),
            valid_credentials: None,
            implicit_wait_secs: 10,
            explicit_wait_secs: 15,
            page_load_timeout_secs: 30,
            screenshot_on_pass: false,
            screenshot_on_fail: true,
            screenshot_directory: PathBuf::from("test-output/screenshots"),
            log_level: "INFO".to_string(),
            log_file: PathBuf::from("test-output/logs/test.log"),
        }
    }
}

/// Environment variable that overrides a key: `app.path` -> `APP_PATH`
pub fn env_key(key: &str) -> String {
    key.replace('.', "_").to_uppercase()
}

/// Properties with environment-variable overrides
struct Source<'a, E: Fn(&str) -> Option<String>> {
    props: &'a Properties,
    env: E,
}

impl<E: Fn(&str) -> Option<String>> Source<'_, E> {
    fn string(&self, key: &str) -> Option<String> {
        (self.env)(&env_key(key)).or_else(|| self.props.get(key).map(str::to_string))
    }

    fn string_or(&self, key: &str, default: &str) -> String {
        self.string(key).unwrap_or_else(|| default.to_string())
    }

    fn required(&self, key: &'static str) -> Result<String, ConfigError> {
        self.string(key)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(key))
    }

    /// Unparseable values fall back to the default
    fn int(&self, key: &str, default: u64) -> u64 {
        self.string(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Anything but a case-insensitive "true" is false
    fn boolean(&self, key: &str, default: bool) -> bool {
        self.string(key)
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(default)
    }

    fn credentials(&self, email_key: &str, password_key: &str) -> Option<Credentials> {
        Some(Credentials {
            email: self.string(email_key)?,
            password: self.string(password_key)?,
        })
    }
}

impl Config {
    /// Load from a properties file, letting environment variables override
    /// individual keys
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let props = Properties::load(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(&props, |name| std::env::var(name).ok())
    }

    pub fn from_source(
        props: &Properties,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let src = Source { props, env };
        let defaults = Config::default();

        Ok(Self {
            environment: src.string_or(keys::ENVIRONMENT, &defaults.environment),
            app_path: src.required(keys::APP_PATH)?,
            appium_url: src.required(keys::APPIUM_URL)?,
            valid_credentials: src.credentials(keys::VALID_EMAIL, keys::VALID_PASSWORD),
            implicit_wait_secs: src.int(keys::IMPLICIT_WAIT, defaults.implicit_wait_secs),
            explicit_wait_secs: src.int(keys::EXPLICIT_WAIT, defaults.explicit_wait_secs),
            page_load_timeout_secs: src
                .int(keys::PAGE_LOAD_TIMEOUT, defaults.page_load_timeout_secs),
            screenshot_on_pass: src.boolean(keys::SCREENSHOT_ON_PASS, defaults.screenshot_on_pass),
            screenshot_on_fail: src.boolean(keys::SCREENSHOT_ON_FAIL, defaults.screenshot_on_fail),
            screenshot_directory: src
                .string(keys::SCREENSHOT_DIRECTORY)
                .map(PathBuf::from)
                .unwrap_or(defaults.screenshot_directory),
            log_level: src.string_or(keys::LOG_LEVEL, &defaults.log_level),
            log_file: src
                .string(keys::LOG_FILE)
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
        })
    }

    pub fn timeouts(&self) -> SessionTimeouts {
        SessionTimeouts {
            implicit: Duration::from_secs(self.implicit_wait_secs),
            explicit: Duration::from_secs(self.explicit_wait_secs),
            page_load: Duration::from_secs(self.page_load_timeout_secs),
        }
    }

    /// `log.level` as a filter for the logger; unknown names mean INFO
    pub fn log_filter(&self) -> LevelFilter {
        self.log_level.trim().parse().unwrap_or(LevelFilter::Info)
    }
}
