//! LUXE storefront CLI.

use std::{io, sync::Arc};

use luxe::{
    context::{AppContext, AppInitError},
    store::{FileStore, KeyValueStore, StoreError},
};
use thiserror::Error;
use tracing::debug;

use crate::config::AppConfig;

pub mod cli;
pub mod config;
pub mod observability;

/// Errors that end a CLI run.
#[derive(Debug, Error)]
pub enum AppError {
    /// The data directory couldn't be opened or written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The storefront couldn't start.
    #[error(transparent)]
    Init(#[from] AppInitError),

    /// The command failed.
    #[error("{0}")]
    Command(String),
}

/// Open the data directory, run the configured command and save state.
///
/// # Errors
///
/// Returns an error if the storefront can't start, the command fails or
/// state can't be saved.
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.storage.data_dir)?);
    let context = AppContext::start(store, config.storefront.to_config())?;

    debug!(data_dir = %config.storage.data_dir.display(), "running command");

    let mut out = io::stdout();
    let result = config.command.run(&context, &mut out).await;

    context.shutdown()?;

    result.map_err(AppError::Command)
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn state_survives_between_runs() -> TestResult {
        let dir = tempfile::tempdir()?;
        let data_dir = dir.path().to_string_lossy().into_owned();

        for args in [
            vec!["login", "--email", "ana@luxe.com", "--password", "secret1"],
            vec!["cart", "add", "1", "VIP", "-q", "2"],
        ] {
            let config = AppConfig::try_parse_from(
                ["luxe", "--data-dir", data_dir.as_str(), "--auth-delay-ms", "0"]
                    .into_iter()
                    .chain(args),
            )?;

            run(config).await?;
        }

        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(dir.path())?);
        let context = AppContext::start(store, luxe::context::StorefrontConfig::instant())?;

        assert!(context.session.is_authenticated());
        assert_eq!(context.cart.item_count(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn failed_command_is_reported() -> TestResult {
        let dir = tempfile::tempdir()?;
        let data_dir = dir.path().to_string_lossy().into_owned();

        let config =
            AppConfig::try_parse_from(["luxe", "--data-dir", data_dir.as_str(), "event", "42"])?;

        let result = run(config).await;

        assert!(
            matches!(result, Err(AppError::Command(_))),
            "expected command error, got {result:?}"
        );

        Ok(())
    }
}
