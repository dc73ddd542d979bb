//! WebDriver HTTP client
//!
//! Speaks W3C WebDriver and understands the JSON Wire Protocol responses that
//! WinAppDriver still returns (`status` codes, `ELEMENT` ids).

use async_trait::async_trait;
use base64::Engine;
use log::debug;
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;

use super::capabilities::Capabilities;
use crate::driver::actions::PointerSequence;
use crate::driver::error::{legacy_status_error, DriverError, DriverResult};
use crate::driver::traits::{AutomationSession, ElementHandle, Locator, Rect};

/// W3C web element identifier key
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";
/// JSON Wire Protocol element identifier key
const LEGACY_ELEMENT_KEY: &str = "ELEMENT";

/// Launching the application happens inside the new-session request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Client bound to one remote session
pub struct WindowsDriverClient {
    /// Base URL of the endpoint (e.g. "http://127.0.0.1:4723")
    base_url: String,
    client: reqwest::Client,
    session_id: String,
}

impl WindowsDriverClient {
    /// Create a new remote session
    pub async fn connect(endpoint: &str, capabilities: &Capabilities) -> DriverResult<Self> {
        let base_url = endpoint.trim_end_matches('/').to_string();
        let connection_error = |message: String| DriverError::Connection {
            endpoint: base_url.clone(),
            message,
        };

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| connection_error(e.to_string()))?;

        let resp = client
            .post(format!("{}/session", base_url))
            .json(&capabilities.to_request_body())
            .send()
            .await
            .map_err(|e| connection_error(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| connection_error(e.to_string()))?;
        let json = parse_body(&body).map_err(|e| connection_error(e.to_string()))?;
        check_error(status, &json, &body).map_err(|e| connection_error(e.to_string()))?;

        let session_id = json
            .get("sessionId")
            .or_else(|| json["value"].get("sessionId"))
            .and_then(Value::as_str)
            .ok_or_else(|| connection_error("no session id in response".to_string()))?
            .to_string();

        debug!("Created session {} at {}", session_id, base_url);

        Ok(Self {
            base_url,
            client,
            session_id,
        })
    }

    /// Whether the endpoint reports itself ready for new sessions
    pub async fn is_ready(endpoint: &str) -> bool {
        let url = format!("{}/status", endpoint.trim_end_matches('/'));
        let Ok(client) = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
        else {
            return false;
        };

        match client.get(&url).send().await {
            Ok(resp) if resp.status().is_success() => match resp.json::<Value>().await {
                // WinAppDriver answers with build info only
                Ok(json) => json["value"]["ready"].as_bool().unwrap_or(true),
                Err(_) => false,
            },
            _ => false,
        }
    }

    fn session_path(&self, suffix: &str) -> String {
        format!("{}/session/{}{}", self.base_url, self.session_id, suffix)
    }

    fn element_path(&self, element: &ElementHandle, suffix: &str) -> String {
        self.session_path(&format!("/element/{}{}", element.id(), suffix))
    }

    async fn execute(&self, method: Method, url: String, body: Option<Value>) -> DriverResult<Value> {
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let resp = request.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        let json = parse_body(&text)?;
        check_error(status, &json, &text)?;

        Ok(json.get("value").cloned().unwrap_or(Value::Null))
    }

    async fn get(&self, url: String) -> DriverResult<Value> {
        self.execute(Method::GET, url, None).await
    }

    async fn post(&self, url: String, body: Value) -> DriverResult<Value> {
        self.execute(Method::POST, url, Some(body)).await
    }
}

fn parse_body(body: &str) -> DriverResult<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| DriverError::Protocol {
        error: "invalid response".to_string(),
        message: format!("{}: {}", e, body),
    })
}

/// Turn W3C error objects, legacy status codes and bare HTTP failures into
/// `DriverError`s
fn check_error(status: StatusCode, json: &Value, raw: &str) -> DriverResult<()> {
    let message = json["value"]["message"].as_str().unwrap_or_default();

    if let Some(code) = json.get("status").and_then(Value::as_i64) {
        if code != 0 {
            return Err(DriverError::from_protocol(legacy_status_error(code), message));
        }
    }

    if let Some(error) = json["value"].get("error").and_then(Value::as_str) {
        return Err(DriverError::from_protocol(error, message));
    }

    if !status.is_success() {
        return Err(DriverError::Protocol {
            error: format!("HTTP {}", status),
            message: raw.to_string(),
        });
    }

    Ok(())
}

fn element_from_value(value: &Value) -> Option<ElementHandle> {
    value
        .get(ELEMENT_KEY)
        .or_else(|| value.get(LEGACY_ELEMENT_KEY))
        .and_then(Value::as_str)
        .map(|id| ElementHandle(id.to_string()))
}

fn locator_body(locator: &Locator) -> Value {
    json!({
        "using": locator.strategy(),
        "value": locator.value(),
    })
}

fn into_rect(value: Value) -> DriverResult<Rect> {
    serde_json::from_value(value.clone()).map_err(|e| DriverError::Protocol {
        error: "invalid response".to_string(),
        message: format!("expected a rect, got {}: {}", value, e),
    })
}

fn into_bool(value: Value) -> DriverResult<bool> {
    value.as_bool().ok_or_else(|| DriverError::Protocol {
        error: "invalid response".to_string(),
        message: format!("expected a boolean, got {}", value),
    })
}

#[async_trait]
impl AutomationSession for WindowsDriverClient {
    fn session_id(&self) -> &str {
        &self.session_id
    }

    async fn set_timeouts(&self, implicit: Duration, page_load: Duration) -> DriverResult<()> {
        let body = json!({
            "implicit": implicit.as_millis() as u64,
            "pageLoad": page_load.as_millis() as u64,
        });
        self.post(self.session_path("/timeouts"), body).await?;
        Ok(())
    }

    async fn maximize_window(&self) -> DriverResult<()> {
        self.post(self.session_path("/window/maximize"), json!({}))
            .await?;
        Ok(())
    }

    async fn window_rect(&self) -> DriverResult<Rect> {
        match self.get(self.session_path("/window/rect")).await {
            Ok(value) => into_rect(value),
            // Older endpoints only know the JSON Wire size route
            Err(DriverError::Protocol { .. }) => {
                into_rect(self.get(self.session_path("/window/size")).await?)
            }
            Err(e) => Err(e),
        }
    }

    async fn find_element(&self, locator: &Locator) -> DriverResult<ElementHandle> {
        let value = self
            .post(self.session_path("/element"), locator_body(locator))
            .await
            .map_err(|e| {
                if e.is_no_such_element() {
                    DriverError::NoSuchElement(locator.clone())
                } else {
                    e
                }
            })?;

        element_from_value(&value).ok_or_else(|| DriverError::Protocol {
            error: "invalid response".to_string(),
            message: format!("no element id in {}", value),
        })
    }

    async fn element_rect(&self, element: &ElementHandle) -> DriverResult<Rect> {
        into_rect(self.get(self.element_path(element, "/rect")).await?)
    }

    async fn is_displayed(&self, element: &ElementHandle) -> DriverResult<bool> {
        into_bool(self.get(self.element_path(element, "/displayed")).await?)
    }

    async fn is_enabled(&self, element: &ElementHandle) -> DriverResult<bool> {
        into_bool(self.get(self.element_path(element, "/enabled")).await?)
    }

    async fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> DriverResult<Option<String>> {
        let value = self
            .get(self.element_path(element, &format!("/attribute/{}", name)))
            .await?;

        Ok(match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
    }

    async fn click(&self, element: &ElementHandle) -> DriverResult<()> {
        self.post(self.element_path(element, "/click"), json!({}))
            .await?;
        Ok(())
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> DriverResult<()> {
        let chars: Vec<String> = text.chars().map(|c| c.to_string()).collect();
        let body = json!({
            "text": text,
            "value": chars,
        });
        self.post(self.element_path(element, "/value"), body).await?;
        Ok(())
    }

    async fn perform_actions(&self, sequence: &PointerSequence) -> DriverResult<()> {
        self.post(self.session_path("/actions"), sequence.to_request_body())
            .await?;
        Ok(())
    }

    async fn screenshot(&self) -> DriverResult<Vec<u8>> {
        let value = self.get(self.session_path("/screenshot")).await?;
        let data = value.as_str().ok_or_else(|| DriverError::Protocol {
            error: "invalid response".to_string(),
            message: "screenshot is not a base64 string".to_string(),
        })?;

        base64::engine::general_purpose::STANDARD
            .decode(data)
            .map_err(|e| DriverError::Protocol {
                error: "invalid response".to_string(),
                message: format!("failed to decode screenshot: {}", e),
            })
    }

    async fn quit(&self) -> DriverResult<()> {
        self.execute(Method::DELETE, self.session_path(""), None)
            .await?;
        Ok(())
    }
}
