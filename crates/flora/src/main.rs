//! Flora - Entry Point
//!
//! Binary entry point. Lives in the `flora` facade crate next to the
//! library re-exports.

use clap::Parser;
use flora::cli::{Cli, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    run(Cli::parse()).await
}
