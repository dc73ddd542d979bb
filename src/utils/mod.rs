pub mod config;
pub mod properties;

pub use config::Config;
