//! LUXE storefront CLI

use std::process;

use luxe_app::{config::AppConfig, observability};

#[tokio::main]
async fn main() {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(error) => error.exit(),
    };

    if let Err(error) = observability::init_subscriber(&config.logging) {
        #[expect(clippy::print_stderr, reason = "logging is not initialised yet")]
        {
            eprintln!("{error}");
        }

        process::exit(1);
    }

    if let Err(error) = luxe_app::run(config).await {
        #[expect(clippy::print_stderr, reason = "errors are reported to the user")]
        {
            eprintln!("error: {error}");
        }

        process::exit(1);
    }
}
