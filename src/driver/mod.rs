pub mod actions;
pub mod error;
pub mod gesture;
pub mod session;
pub mod traits;
pub mod wait;
pub mod windows;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{DriverError, DriverResult};
pub use session::{Session, SessionTimeouts};
pub use windows::{Capabilities, WindowsDriverClient};

/// Check whether the automation endpoint accepts new sessions
pub async fn endpoint_ready(endpoint: &str) -> bool {
    WindowsDriverClient::is_ready(endpoint).await
}
