pub mod json;
pub mod junit;
pub mod sink;
pub mod types;

pub use sink::{Level, Reporter};

use anyhow::Result;
use std::path::Path;

/// Generate report from a saved results file
pub fn generate_report(results_path: &Path, format: &str, output: Option<&Path>) -> Result<()> {
    let test_results = json::read_results(results_path)?;

    match format {
        "json" => json::generate(&test_results, output),
        "junit" => {
            let dir = output.unwrap_or_else(|| Path::new("."));
            let path = junit::write_report(&test_results, dir)?;
            println!("JUnit report saved to: {}", path.display());
            Ok(())
        }
        _ => anyhow::bail!("Unknown format: {}", format),
    }
}
