//! Auth session provider.

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use tracing::{info, warn};

use crate::{
    auth::{AuthError, AuthService, Registration, User},
    store::{AUTH_FLAG_KEY, KeyValueStore, USER_KEY, load_json, save_json},
};

const AUTH_FLAG_VALUE: &str = "true";

/// The signed-in member (if any), persisted across runs.
pub struct Session {
    store: Arc<dyn KeyValueStore>,
    auth: Arc<dyn AuthService>,
    user: Mutex<Option<User>>,
}

impl Session {
    /// Restore the persisted session. A missing flag or user record means
    /// signed out; an unreadable record clears both keys.
    pub fn restore(store: Arc<dyn KeyValueStore>, auth: Arc<dyn AuthService>) -> Self {
        let session = Self {
            store,
            auth,
            user: Mutex::new(None),
        };

        match session.read_persisted() {
            Ok(user) => {
                session.replace_user(user);
            }
            Err(error) => {
                warn!(error = %error, "discarding unreadable auth session");
                session.logout();
            }
        }

        session
    }

    fn read_persisted(&self) -> Result<Option<User>, crate::store::StoreError> {
        let flagged = self.store.get(AUTH_FLAG_KEY)?.as_deref() == Some(AUTH_FLAG_VALUE);

        if !flagged {
            return Ok(None);
        }

        load_json(self.store.as_ref(), USER_KEY)
    }

    /// Sign in through the auth service and persist the session.
    ///
    /// # Errors
    ///
    /// Returns the auth service's error; the session is left unchanged.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .auth
            .login(email.to_string(), password.to_string())
            .await?;

        let persisted = save_json(self.store.as_ref(), USER_KEY, &user)
            .and_then(|()| self.store.set(AUTH_FLAG_KEY, AUTH_FLAG_VALUE));

        if let Err(error) = persisted {
            warn!(error = %error, "failed to persist auth session");
        }

        info!(user_id = %user.id(), "signed in");

        self.replace_user(Some(user.clone()));

        Ok(user)
    }

    /// Submit a registration. The member still has to sign in afterwards.
    ///
    /// # Errors
    ///
    /// Returns the auth service's error.
    pub async fn register(&self, registration: Registration) -> Result<(), AuthError> {
        self.auth.register(registration).await
    }

    /// Forget the signed-in member.
    pub fn logout(&self) {
        for key in [USER_KEY, AUTH_FLAG_KEY] {
            if let Err(error) = self.store.remove(key) {
                warn!(key, error = %error, "failed to clear auth session key");
            }
        }

        if self.replace_user(None).is_some() {
            info!("signed out");
        }
    }

    /// Whether someone is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.lock().is_some()
    }

    /// The signed-in member.
    pub fn current_user(&self) -> Option<User> {
        self.lock().clone()
    }

    fn replace_user(&self, user: Option<User>) -> Option<User> {
        std::mem::replace(&mut *self.lock(), user)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<User>> {
        self.user.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &*self.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::{
        auth::{MockAuthService, SimulatedAuthService},
        store::MemoryStore,
    };

    fn ana() -> User {
        User {
            name: "Ana".to_string(),
            email: "ana@luxe.com".to_string(),
        }
    }

    #[tokio::test]
    async fn login_persists_and_restores() -> TestResult {
        let store = Arc::new(MemoryStore::new());
        let auth = Arc::new(SimulatedAuthService::instant());

        let session = Session::restore(store.clone(), auth.clone());

        assert!(!session.is_authenticated());

        let user = session.login("ana@luxe.com", "secret1").await?;

        assert_eq!(session.current_user(), Some(user.clone()));
        assert_eq!(store.get(AUTH_FLAG_KEY)?.as_deref(), Some("true"));

        let restored = Session::restore(store, auth);

        assert_eq!(restored.current_user(), Some(user));

        Ok(())
    }

    #[tokio::test]
    async fn failed_login_leaves_session_signed_out() {
        let mut auth = MockAuthService::new();

        auth.expect_login()
            .returning(|_, _| Err(AuthError::InvalidCredentials));

        let session = Session::restore(Arc::new(MemoryStore::new()), Arc::new(auth));

        let result = session.login("ana@luxe.com", "wrong-password").await;

        assert_eq!(result, Err(AuthError::InvalidCredentials));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn logout_clears_persisted_keys() -> TestResult {
        let store = Arc::new(MemoryStore::new());

        save_json(store.as_ref(), USER_KEY, &ana())?;
        store.set(AUTH_FLAG_KEY, "true")?;

        let session = Session::restore(store.clone(), Arc::new(MockAuthService::new()));

        assert!(session.is_authenticated());

        session.logout();

        assert!(!session.is_authenticated());
        assert!(store.is_empty());

        Ok(())
    }

    #[test]
    fn user_without_flag_is_signed_out() -> TestResult {
        let store = Arc::new(MemoryStore::new());

        save_json(store.as_ref(), USER_KEY, &ana())?;

        let session = Session::restore(store, Arc::new(MockAuthService::new()));

        assert_eq!(session.current_user(), None);

        Ok(())
    }

    #[test]
    fn corrupt_user_record_is_discarded() -> TestResult {
        let store = Arc::new(MemoryStore::new());

        store.set(USER_KEY, "{broken")?;
        store.set(AUTH_FLAG_KEY, "true")?;

        let session = Session::restore(store.clone(), Arc::new(MockAuthService::new()));

        assert!(!session.is_authenticated());
        assert_eq!(store.get(AUTH_FLAG_KEY)?, None);

        Ok(())
    }
}
