//! Storefront Config

use std::{path::PathBuf, time::Duration};

use clap::Args;
use rust_decimal::Decimal;

use luxe::{context::StorefrontConfig, tickets::DEFAULT_QR_BASE_URL};

/// Where member data is kept.
#[derive(Debug, Args)]
pub struct StorageConfig {
    /// Directory holding the cart, session and tickets
    #[arg(long, env = "LUXE_DATA_DIR", default_value = ".luxe")]
    pub data_dir: PathBuf,
}

/// Pricing, QR and simulation settings.
#[derive(Debug, Args)]
pub struct StorefrontArgs {
    /// Service fee added to non-empty carts, in BRL
    #[arg(long, env = "LUXE_SERVICE_FEE", default_value = "15")]
    pub service_fee: Decimal,

    /// Base URL encoded into ticket QR codes
    #[arg(long, env = "LUXE_QR_BASE_URL", default_value = DEFAULT_QR_BASE_URL)]
    pub qr_base_url: String,

    /// Simulated sign-in latency in milliseconds
    #[arg(long, env = "LUXE_AUTH_DELAY_MS", default_value_t = 1_000_u64)]
    pub auth_delay_ms: u64,

    /// Simulated payment latency in milliseconds
    #[arg(long, env = "LUXE_PAYMENT_DELAY_MS", default_value_t = 2_000_u64)]
    pub payment_delay_ms: u64,

    /// Read `events/luxe.yml` and `coupons/luxe.yml` from this directory
    /// instead of the built-in fixtures
    #[arg(long, env = "LUXE_FIXTURES_DIR")]
    pub fixtures_dir: Option<PathBuf>,
}

impl StorefrontArgs {
    /// Settings for [`luxe::context::AppContext::start`].
    #[must_use]
    pub fn to_config(&self) -> StorefrontConfig {
        StorefrontConfig {
            service_fee: self.service_fee,
            qr_base_url: self.qr_base_url.clone(),
            auth_delay: Duration::from_millis(self.auth_delay_ms),
            payment_delay: Duration::from_millis(self.payment_delay_ms),
            fixtures_dir: self.fixtures_dir.clone(),
        }
    }
}
