//! CLI configuration module

use clap::Parser;

use crate::{
    cli::Command,
    config::{
        logging::LoggingConfig,
        storefront::{StorageConfig, StorefrontArgs},
    },
};

pub mod logging;
pub mod storefront;

/// LUXE nightclub storefront
#[derive(Debug, Parser)]
#[command(name = "luxe", about = "LUXE nightclub storefront", long_about = None)]
pub struct AppConfig {
    /// Storage settings.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Storefront settings.
    #[command(flatten)]
    pub storefront: StorefrontArgs,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

impl AppConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
