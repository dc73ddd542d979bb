use super::types::TestResults;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// File name of the results document inside the output directory
pub const RESULTS_FILE: &str = "test-results.json";

/// Generate JSON report
pub fn generate(results: &TestResults, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;

    if let Some(path) = output {
        std::fs::write(path, json)?;
        println!("JSON report saved to: {}", path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

/// Write `test-results.json` into `output_dir`
pub fn write_results(results: &TestResults, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(RESULTS_FILE);
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

pub fn read_results(path: &Path) -> Result<TestResults> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read results file {}", path.display()))?;
    let results = serde_json::from_str(&content)
        .with_context(|| format!("Invalid results file {}", path.display()))?;
    Ok(results)
}
