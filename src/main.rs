use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use winapp_tester::utils::config::{Config, DEFAULT_CONFIG_FILE};
use winapp_tester::{driver, report, runner};

#[derive(Parser)]
#[command(name = "winapp-tester")]
#[command(version = "0.1.0")]
#[command(about = "Login end-to-end suite for a Windows desktop application", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the login suite against the configured endpoint
    Run {
        /// Path to the .properties configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,

        /// Output directory for reports
        #[arg(short, long, default_value = "./test-output")]
        output: PathBuf,
    },

    /// Check whether the automation endpoint is up
    Status {
        /// Path to the .properties configuration file
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
    },

    /// Generate report from test results
    Report {
        /// Path to test results JSON
        results: PathBuf,

        /// Output format (json, junit)
        #[arg(short, long, default_value = "junit")]
        format: String,

        /// Output file (json) or directory (junit)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = Config::load(path)
        .with_context(|| format!("Could not load configuration from {}", path.display()))?;

    // RUST_LOG, when set, wins over log.level
    env_logger::Builder::new()
        .filter_level(config.log_filter())
        .parse_default_env()
        .init();

    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            let config = load_config(&config)?;

            println!(
                "{} Running login suite against: {}",
                "▶".green().bold(),
                config.appium_url.cyan()
            );
            println!("  Environment: {}", config.environment.cyan());
            println!("  Application: {}", config.app_path);

            let suite = runner::run_suite(&config, &output).await?;
            if !suite.all_passed() {
                std::process::exit(1);
            }
        }

        Commands::Status { config } => {
            let config = load_config(&config)?;

            if driver::endpoint_ready(&config.appium_url).await {
                println!(
                    "{} Automation endpoint ready at {}",
                    "✓".green().bold(),
                    config.appium_url.cyan()
                );
            } else {
                println!(
                    "{} Automation endpoint not reachable at {}",
                    "✗".red().bold(),
                    config.appium_url.cyan()
                );
                std::process::exit(1);
            }
        }

        Commands::Report {
            results,
            format,
            output,
        } => {
            env_logger::init();
            println!(
                "{} Generating {} report from: {}",
                "📊".to_string().blue(),
                format.cyan(),
                results.display()
            );
            report::generate_report(&results, &format, output.as_deref())?;
        }
    }

    Ok(())
}
