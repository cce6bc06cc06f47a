//! Driven port for the blood-bank backend API.
//!
//! Services own validation and session handling; implementations of this
//! port only translate typed calls into backend round trips. Every
//! authenticated call receives the bearer token explicitly so a missing
//! session never reaches an adapter.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{
    AccessToken, BloodRequest, DashboardStats, DonationRecord, Donor, DonorProfile, History,
    HistoryFilter, LoginCredentials, NewBloodRequest, NewDonation, NewDonorProfile,
    ProfileUpdate, Registration, RequestId, User,
};

define_port_error! {
    /// Errors raised by backend gateway adapters.
    pub enum GatewayError {
        /// Backend refused the credentials or token.
        Unauthenticated {
            /// Adapter-supplied detail.
            message: String,
        } => "backend rejected credentials: {message}",
        /// Backend answered with a non-success status.
        Rejected {
            /// HTTP status code.
            status: u16,
            /// Backend `detail` message or the generic fallback.
            message: String,
        } => "backend rejected request with status {status}: {message}",
        /// Connection, timeout or other transport failure.
        Transport {
            /// Adapter-supplied detail.
            message: String,
        } => "backend transport failed: {message}",
        /// Success response body did not match the expected shape.
        Decode {
            /// Adapter-supplied detail.
            message: String,
        } => "backend response decode failed: {message}",
    }
}

/// Port covering every backend endpoint the client uses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BloodBankGateway: Send + Sync {
    /// Exchange credentials for a bearer token.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AccessToken, GatewayError>;

    /// Create an account.
    async fn register(&self, registration: &Registration) -> Result<User, GatewayError>;

    /// Fetch the caller's profile.
    async fn profile(&self, token: &AccessToken) -> Result<User, GatewayError>;

    /// Apply a partial profile update and return the stored profile.
    async fn update_profile(
        &self,
        token: &AccessToken,
        update: &ProfileUpdate,
    ) -> Result<User, GatewayError>;

    /// Fetch the donor directory.
    async fn list_donors(&self, token: &AccessToken) -> Result<Vec<Donor>, GatewayError>;

    /// Create or replace the caller's donor profile.
    async fn upsert_donor_profile(
        &self,
        token: &AccessToken,
        profile: &NewDonorProfile,
    ) -> Result<DonorProfile, GatewayError>;

    /// Post a blood request.
    async fn create_request(
        &self,
        token: &AccessToken,
        request: &NewBloodRequest,
    ) -> Result<BloodRequest, GatewayError>;

    /// Fetch every request visible to the caller.
    async fn list_requests(&self, token: &AccessToken) -> Result<Vec<BloodRequest>, GatewayError>;

    /// Fetch the backend's donor matches for a request.
    async fn request_matches(
        &self,
        token: &AccessToken,
        request_id: RequestId,
    ) -> Result<Vec<Donor>, GatewayError>;

    /// Fetch the caller's history with the filter forwarded as query parameters.
    async fn history(
        &self,
        token: &AccessToken,
        filter: &HistoryFilter,
    ) -> Result<History, GatewayError>;

    /// Append a donation to the caller's history.
    async fn log_donation(
        &self,
        token: &AccessToken,
        donation: &NewDonation,
    ) -> Result<DonationRecord, GatewayError>;

    /// Fetch dashboard statistics.
    async fn dashboard_stats(&self, token: &AccessToken) -> Result<DashboardStats, GatewayError>;
}
