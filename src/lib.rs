pub mod driver;
pub mod pages;
pub mod report;
pub mod runner;
pub mod utils;

// Re-export common items
pub use driver::endpoint_ready;
pub use report::generate_report;
pub use runner::run_suite;
