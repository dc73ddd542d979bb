use serde_json::{json, Value};

/// Device name the Windows driver expects for the local desktop
pub const DEFAULT_DEVICE_NAME: &str = "WindowsPC";

/// Capability set sent with the new-session request
#[derive(Debug, Clone, PartialEq)]
pub struct Capabilities {
    pub platform_name: String,
    pub automation_name: String,
    /// Executable path or packaged app id of the application under test
    pub app: String,
    pub device_name: String,
}

impl Capabilities {
    /// Capabilities for launching a Windows desktop application
    pub fn windows_app(app: &str) -> Self {
        Self {
            platform_name: "Windows".to_string(),
            automation_name: "Windows".to_string(),
            app: app.to_string(),
            device_name: DEFAULT_DEVICE_NAME.to_string(),
        }
    }

    /// Body for `POST /session`.
    ///
    /// Carries both the W3C form (Appium) and `desiredCapabilities`
    /// (WinAppDriver, JSON Wire Protocol).
    pub fn to_request_body(&self) -> Value {
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "platformName": self.platform_name,
                    "appium:automationName": self.automation_name,
                    "appium:app": self.app,
                    "appium:deviceName": self.device_name,
                },
                "firstMatch": [{}],
            },
            "desiredCapabilities": {
                "platformName": self.platform_name,
                "app": self.app,
                "deviceName": self.device_name,
            },
        })
    }
}
