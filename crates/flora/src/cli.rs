//! Command line interface
//!
//! | Command | Description |
//! |---------|-------------|
//! | `flora identify --image <path>` | Identify the plant in an image and print the merged result as JSON |
//! | `flora config` | Print the effective configuration as TOML |

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use flora_application::pool::PoolShutdownGuard;
use flora_domain::{IdentificationOption, IdentificationOptions, IdentificationRequest};
use flora_infrastructure::logging::init_logging;
use flora_infrastructure::{AppConfig, ConfigLoader, ErrorContext, TimedOperation, build_context};
use tracing::info;

/// Command line interface for Flora
#[derive(Parser, Debug)]
#[command(name = "flora")]
#[command(about = "Flora - Plant identification orchestration")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Identify the plant in an image
    Identify {
        /// Image file to identify
        #[arg(short, long)]
        image: PathBuf,

        /// Identification option (repeatable): disease_detection, care_details,
        /// similar_images, taxonomy_details
        #[arg(short, long = "option", value_name = "NAME", value_parser = parse_option)]
        options: Vec<IdentificationOption>,
    },
    /// Print the effective configuration
    Config,
}

fn parse_option(value: &str) -> Result<IdentificationOption, String> {
    value.parse().map_err(|e: flora_domain::Error| e.to_string())
}

impl Cli {
    /// Load configuration for this invocation
    pub fn load_config(&self) -> anyhow::Result<AppConfig> {
        let mut loader = ConfigLoader::new();
        if let Some(path) = &self.config {
            loader = loader.with_config_path(path);
        }
        Ok(loader.load()?)
    }
}

/// Run the parsed command, writing its output to stdout
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.load_config()?;

    match cli.command {
        Command::Config => {
            let rendered =
                toml::to_string_pretty(&config).config_context("Failed to render configuration")?;
            print!("{rendered}");
            Ok(())
        }
        Command::Identify { image, options } => {
            init_logging(&config.logging)?;
            let merged = identify(config, &image, options).await?;
            println!("{merged}");
            Ok(())
        }
    }
}

async fn identify(
    config: AppConfig,
    image: &Path,
    options: Vec<IdentificationOption>,
) -> anyhow::Result<String> {
    let context = build_context(config)?;
    let guard = PoolShutdownGuard::new(std::sync::Arc::clone(&context.pool));

    let bytes = std::fs::read(image)
        .io_context(format!("Failed to read image {}", image.display()))?;
    let options: IdentificationOptions = options.into_iter().collect();
    let request = IdentificationRequest::new(bytes, options)?;

    let timer = TimedOperation::start();
    let result = context.service.identify(&request).await;
    info!(
        content_key = %request.content_key(),
        elapsed_ms = timer.elapsed_ms(),
        ok = result.is_ok(),
        "Identification finished"
    );

    guard.pool().shutdown(true).await;
    let merged = result?;
    Ok(serde_json::to_string_pretty(&merged).context("Failed to render identification result")?)
}
