//! Auth service.

use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use tracing::debug;

use crate::{
    auth::{AuthError, Registration, User},
    validation::is_blank,
};

/// Default simulated sign-in latency.
pub const DEFAULT_LOGIN_DELAY: Duration = Duration::from_millis(1_000);

/// Default simulated registration latency.
pub const DEFAULT_REGISTER_DELAY: Duration = Duration::from_millis(1_500);

/// Backend that verifies credentials and accepts registrations.
#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Verify credentials and return the member they belong to.
    async fn login(&self, email: String, password: String) -> Result<User, AuthError>;

    /// Submit a membership registration. Does not sign the member in.
    async fn register(&self, registration: Registration) -> Result<(), AuthError>;
}

/// Accepts any non-empty credentials after an artificial delay.
#[derive(Debug, Clone)]
pub struct SimulatedAuthService {
    login_delay: Duration,
    register_delay: Duration,
}

impl SimulatedAuthService {
    /// Use the given latencies.
    #[must_use]
    pub const fn new(login_delay: Duration, register_delay: Duration) -> Self {
        Self {
            login_delay,
            register_delay,
        }
    }

    /// Respond immediately.
    #[must_use]
    pub const fn instant() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }
}

impl Default for SimulatedAuthService {
    fn default() -> Self {
        Self::new(DEFAULT_LOGIN_DELAY, DEFAULT_REGISTER_DELAY)
    }
}

#[async_trait]
impl AuthService for SimulatedAuthService {
    async fn login(&self, email: String, password: String) -> Result<User, AuthError> {
        tokio::time::sleep(self.login_delay).await;

        if is_blank(&email) || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        debug!(email = %email, "simulated login accepted");

        Ok(User {
            name: "VIP Member".to_string(),
            email: email.trim().to_string(),
        })
    }

    async fn register(&self, registration: Registration) -> Result<(), AuthError> {
        tokio::time::sleep(self.register_delay).await;

        debug!(email = %registration.email, "simulated registration accepted");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn simulated_login_accepts_any_credentials() -> TestResult {
        let service = SimulatedAuthService::instant();

        let user = service
            .login(" ana@luxe.com".to_string(), "secret1".to_string())
            .await?;

        assert_eq!(user.email, "ana@luxe.com");
        assert_eq!(user.name, "VIP Member");

        Ok(())
    }

    #[tokio::test]
    async fn simulated_login_rejects_empty_credentials() {
        let service = SimulatedAuthService::instant();

        let result = service
            .login("ana@luxe.com".to_string(), String::new())
            .await;

        assert_eq!(result, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_login_waits_for_the_configured_delay() -> TestResult {
        let service = SimulatedAuthService::default();
        let started = tokio::time::Instant::now();

        service
            .login("ana@luxe.com".to_string(), "secret1".to_string())
            .await?;

        assert!(started.elapsed() >= DEFAULT_LOGIN_DELAY);

        Ok(())
    }
}
