//! Account authentication against the backend.
//!
//! The backend owns credential checking; this service drives the HTTP
//! flows and maintains the persisted identity record that the session
//! reader and cart store key off. Writing or removing that record goes
//! through client storage, so a successful login or logout automatically
//! wakes every subscriber in the process.

mod error;

pub use error::AuthError;

use secrecy::SecretString;
use tracing::instrument;

use wirecrest_core::UserId;

use crate::backend::{
    BackendError, CommerceClient, PasswordResetRequest, ProfileData, ProfileUpdate,
    RegisterRequest,
};
use crate::session::{SessionReader, StoredUser};
use crate::storage::{ClientStorage, keys};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// The identity record now persisted in client storage.
    pub user: StoredUser,
    /// Location captured before a login redirect, if one was pending.
    /// Consumed: it is removed from storage when returned.
    pub return_to: Option<String>,
}

/// Login, registration, and profile operations.
#[derive(Clone)]
pub struct AuthService {
    backend: CommerceClient,
    storage: ClientStorage,
}

impl AuthService {
    /// Create the service over a backend client and client storage.
    ///
    /// Use the same storage handle as the cart store so session changes
    /// propagate.
    #[must_use]
    pub const fn new(backend: CommerceClient, storage: ClientStorage) -> Self {
        Self { backend, storage }
    }

    /// Authenticate and persist the identity record.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] when the backend refuses
    /// the email/password pair.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &str,
        password: SecretString,
    ) -> Result<LoginOutcome, AuthError> {
        let user = match self.backend.login(email, &password).await {
            Ok(user) => user,
            Err(BackendError::Rejected(reason)) => {
                return Err(AuthError::InvalidCredentials(reason));
            }
            Err(other) => return Err(other.into()),
        };

        self.storage.set(keys::CURRENT_USER, &user)?;

        // Consume any return target captured by a rejected cart mutation.
        let return_to: Option<String> = self.storage.get(keys::RETURN_URL);
        if return_to.is_some() {
            self.storage.remove(keys::RETURN_URL)?;
        }

        tracing::info!(user_id = %user.id, "logged in");
        Ok(LoginOutcome { user, return_to })
    }

    /// Remove the identity record. Subscribed stores reset themselves.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be removed.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<(), AuthError> {
        self.storage.remove(keys::CURRENT_USER)?;
        tracing::info!("logged out");
        Ok(())
    }

    /// The currently persisted identity, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<StoredUser> {
        SessionReader::new(self.storage.clone()).current_user()
    }

    /// Create an account. The new user still has to log in.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<String, AuthError> {
        Ok(self.backend.register(request).await?)
    }

    /// Drive one step of the OTP password-reset flow.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the step.
    #[instrument(skip(self, request))]
    pub async fn password_reset(
        &self,
        request: &PasswordResetRequest,
    ) -> Result<String, AuthError> {
        Ok(self.backend.password_reset(request).await?)
    }

    /// Fetch the profile on record for the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call fails.
    pub async fn profile(&self, user_id: UserId) -> Result<ProfileData, AuthError> {
        Ok(self.backend.profile(user_id).await?)
    }

    /// Update profile fields, refreshing the persisted identity record so
    /// greeting surfaces stay current.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend call or the record refresh fails.
    #[instrument(skip(self, update), fields(user_id = %user_id))]
    pub async fn update_profile(
        &self,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> Result<String, AuthError> {
        let first_name = update.first_name.clone();
        let last_name = update.last_name.clone();
        let message = self.backend.update_profile(user_id, update).await?;

        if let Some(mut user) = self.current_user()
            && user.id == user_id
        {
            user.first_name = first_name;
            user.last_name = last_name;
            self.storage.set(keys::CURRENT_USER, &user)?;
        }

        Ok(message)
    }
}
