//! WebDriver wire client for the Windows automation endpoint
//! (Appium Windows driver or WinAppDriver).

pub mod capabilities;
pub mod client;

pub use capabilities::Capabilities;
pub use client::WindowsDriverClient;
