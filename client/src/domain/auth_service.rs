//! Account use-cases: sign-up, login, logout and profile maintenance.

use std::sync::Arc;

use tracing::{debug, info};

use super::ports::BloodBankGateway;
use super::service_support::map_gateway_error;
use super::{
    Error, LoginCredentials, ProfileUpdate, Registration, RegistrationDraft, Session, User,
};

/// Service owning the login state of a [`Session`].
#[derive(Clone)]
pub struct AuthService<G> {
    gateway: Arc<G>,
    session: Arc<Session>,
}

impl<G> AuthService<G> {
    /// Create a new auth service.
    #[must_use]
    pub fn new(gateway: Arc<G>, session: Arc<Session>) -> Self {
        Self { gateway, session }
    }

    /// Forget the current token. Logging out twice is harmless.
    ///
    /// # Errors
    ///
    /// Returns an internal error when the persisted token cannot be removed.
    pub fn logout(&self) -> Result<(), Error> {
        self.session.clear_token()?;
        info!("logged out");
        Ok(())
    }
}

impl<G> AuthService<G>
where
    G: BloodBankGateway,
{
    /// Validate and submit a sign-up form.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorCode::InvalidRequest`](super::ErrorCode::InvalidRequest)
    /// without calling the backend when the draft is invalid, or the mapped
    /// backend failure otherwise.
    pub async fn register(&self, draft: RegistrationDraft) -> Result<User, Error> {
        let registration = Registration::try_from(draft)
            .map_err(|err| Error::invalid_field(err.field(), err.to_string()))?;
        let user = self
            .gateway
            .register(&registration)
            .await
            .map_err(map_gateway_error)?;
        info!(user_id = %user.id, role = %user.role, "account registered");
        Ok(user)
    }

    /// Exchange credentials for a token and store it in the session.
    ///
    /// # Errors
    ///
    /// Returns the mapped backend failure; the session is left untouched.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<(), Error> {
        let token = self
            .gateway
            .login(credentials)
            .await
            .map_err(map_gateway_error)?;
        self.session.set_token(token)?;
        info!(email = %credentials.email(), "logged in");
        Ok(())
    }

    /// Fetch the caller's profile.
    ///
    /// # Errors
    ///
    /// Fails fast with `Unauthenticated` when logged out.
    pub async fn profile(&self) -> Result<User, Error> {
        let token = self.session.require_token()?;
        self.gateway
            .profile(&token)
            .await
            .map_err(map_gateway_error)
    }

    /// Apply a partial profile update.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for blank names or cities, then
    /// `Unauthenticated` when logged out.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<User, Error> {
        update
            .validate()
            .map_err(|err| Error::invalid_field(err.field(), err.to_string()))?;
        let token = self.session.require_token()?;
        if update.is_empty() {
            debug!("empty profile update; fetching current profile instead");
            return self
                .gateway
                .profile(&token)
                .await
                .map_err(map_gateway_error);
        }
        self.gateway
            .update_profile(&token, &update)
            .await
            .map_err(map_gateway_error)
    }
}
