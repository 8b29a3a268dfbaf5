//! App Context
//!
//! Builds the storefront services once at start-up and hands out shared
//! references. Nothing is global; callers own the context.

use std::{path::PathBuf, sync::Arc, time::Duration};

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    auth::{AuthError, AuthService, Registration, Session, SimulatedAuthService, User},
    cart::Cart,
    catalog::Catalog,
    checkout::{CheckoutProcessor, PaymentGateway, SimulatedPaymentGateway},
    coupons::CouponBook,
    fixtures::{BUILTIN_SET, Fixture, FixtureError},
    pricing::SERVICE_FEE,
    store::{KeyValueStore, StoreError},
    tickets::{DEFAULT_QR_BASE_URL, TicketWallet},
};

/// Storefront settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// Fee added to non-empty carts.
    pub service_fee: Decimal,

    /// Base of ticket QR validation links.
    pub qr_base_url: String,

    /// Simulated sign-in latency.
    pub auth_delay: Duration,

    /// Simulated payment latency.
    pub payment_delay: Duration,

    /// Directory to read the `luxe` fixture set from instead of the
    /// embedded copy.
    pub fixtures_dir: Option<PathBuf>,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            service_fee: SERVICE_FEE,
            qr_base_url: DEFAULT_QR_BASE_URL.to_string(),
            auth_delay: Duration::from_millis(1_000),
            payment_delay: Duration::from_millis(2_000),
            fixtures_dir: None,
        }
    }
}

impl StorefrontConfig {
    /// No artificial delays, e.g. for tests.
    #[must_use]
    pub fn instant() -> Self {
        Self {
            auth_delay: Duration::ZERO,
            payment_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Start-up failures.
#[derive(Debug, Error)]
pub enum AppInitError {
    /// Catalog or coupon fixtures couldn't be loaded.
    #[error("failed to load fixtures")]
    Fixtures(#[source] FixtureError),
}

/// The storefront's services.
#[derive(Clone)]
pub struct AppContext {
    /// Persistent storage.
    pub store: Arc<dyn KeyValueStore>,

    /// Signed-in member.
    pub session: Arc<Session>,

    /// Shopping cart.
    pub cart: Arc<Cart>,

    /// The member's tickets and orders.
    pub wallet: Arc<TicketWallet>,

    /// Events on sale.
    pub catalog: Arc<Catalog>,

    /// Coupon table.
    pub coupons: Arc<CouponBook>,

    /// Payment collector.
    pub gateway: Arc<dyn PaymentGateway>,

    /// Settings.
    pub config: StorefrontConfig,
}

impl AppContext {
    /// Build the context with simulated auth and payments.
    ///
    /// # Errors
    ///
    /// Returns an error when the fixtures can't be loaded.
    pub fn start(
        store: Arc<dyn KeyValueStore>,
        config: StorefrontConfig,
    ) -> Result<Self, AppInitError> {
        let auth = Arc::new(SimulatedAuthService::new(
            config.auth_delay,
            config.auth_delay + config.auth_delay / 2,
        ));
        let gateway = Arc::new(SimulatedPaymentGateway::new(config.payment_delay));

        Self::with_services(store, auth, gateway, config)
    }

    /// Build the context around the given collaborators.
    ///
    /// Restores the cart and session and loads the restored member's tickets.
    ///
    /// # Errors
    ///
    /// Returns an error when the fixtures can't be loaded.
    pub fn with_services(
        store: Arc<dyn KeyValueStore>,
        auth: Arc<dyn AuthService>,
        gateway: Arc<dyn PaymentGateway>,
        config: StorefrontConfig,
    ) -> Result<Self, AppInitError> {
        let fixture = match &config.fixtures_dir {
            Some(dir) => {
                let mut fixture = Fixture::with_base_path(dir);

                fixture.load_set(BUILTIN_SET).map_err(AppInitError::Fixtures)?;

                fixture
            }
            None => Fixture::builtin().map_err(AppInitError::Fixtures)?,
        };

        let session = Arc::new(Session::restore(store.clone(), auth));
        let cart = Arc::new(Cart::load(store.clone()));
        let wallet = Arc::new(TicketWallet::new(store.clone(), config.qr_base_url.clone()));

        wallet.load_for(session.current_user().as_ref());

        info!(
            events = fixture.events().len(),
            cart_lines = cart.len(),
            signed_in = session.is_authenticated(),
            "storefront started"
        );

        Ok(Self {
            store,
            session,
            cart,
            wallet,
            catalog: Arc::new(fixture.catalog()),
            coupons: Arc::new(fixture.coupon_book()),
            gateway,
            config,
        })
    }

    /// Sign in and switch the wallet to the member's tickets.
    ///
    /// # Errors
    ///
    /// Returns the auth service's error.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self.session.login(email, password).await?;

        self.wallet.load_for(Some(&user));

        Ok(user)
    }

    /// Submit a registration.
    ///
    /// # Errors
    ///
    /// Returns the auth service's error.
    pub async fn register(&self, registration: Registration) -> Result<(), AuthError> {
        self.session.register(registration).await
    }

    /// Sign out and empty the wallet.
    pub fn logout(&self) {
        self.session.logout();
        self.wallet.load_for(None);
    }

    /// A checkout over the shared cart and wallet.
    pub fn checkout(&self) -> CheckoutProcessor {
        CheckoutProcessor::new(
            self.cart.clone(),
            self.wallet.clone(),
            self.session.clone(),
            self.gateway.clone(),
            self.coupons.clone(),
            self.config.service_fee,
        )
    }

    /// Write the cart and wallet to the store.
    ///
    /// # Errors
    ///
    /// Returns the first write that failed; the rest are still attempted.
    pub fn shutdown(&self) -> Result<(), StoreError> {
        let cart = self.cart.flush();
        let wallet = self.wallet.flush();

        if let Err(error) = &cart {
            warn!(error = %error, "failed to flush cart");
        }

        if let Err(error) = &wallet {
            warn!(error = %error, "failed to flush wallet");
        }

        cart.and(wallet)
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("session", &self.session)
            .field("cart", &self.cart)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
