//! Domain primitives, workflows and ports.
//!
//! Purpose: define the strongly typed records exchanged with the blood-bank
//! backend, the pure rules applied to them (compatibility, eligibility,
//! filtering, aggregation) and the services that drive the backend through
//! the [`ports::BloodBankGateway`] port. Raw form input is validated here
//! before anything reaches the network.
//!
//! Public surface:
//! - Error / ErrorCode: stable error payload returned by every service.
//! - BloodGroup / Urgency / RequestStatus: closed vocabularies.
//! - Session: bearer token context shared by the services.
//! - AuthService, DonorRegistry, RequestWorkflow, HistoryLedger,
//!   DashboardService: use-case services.
//! - DashboardAggregator: pure dashboard computation.

pub mod auth;
pub mod blood_group;
pub mod blood_request;
pub mod dashboard;
pub mod donor;
pub mod error;
pub mod history;
pub mod matching;
pub mod ports;
pub mod search;
pub mod session;
pub mod urgency;
pub mod user;

mod auth_service;
mod dashboard_service;
mod donor_registry;
mod history_ledger;
mod request_workflow;
mod service_support;
#[cfg(test)]
mod test_support;

pub use self::auth::{AccessToken, LoginCredentials, LoginValidationError};
pub use self::auth_service::AuthService;
pub use self::blood_group::{BloodGroup, BloodGroupParseError};
pub use self::blood_request::{
    BloodRequest, NewBloodRequest, RequestDraft, RequestId, RequestStatus,
    RequestValidationError, filter_requests, sort_for_display,
};
pub use self::dashboard::{
    ActivityEvent, ActivityKind, DEFAULT_ACTIVITY_PAGE_SIZE, DashboardAggregator,
    DashboardSnapshot, DashboardStats, DashboardSummary, StockLevel,
};
pub use self::dashboard_service::DashboardService;
pub use self::donor::{
    DONATION_INTERVAL_DAYS, Donor, DonorProfile, DonorProfileDraft, DonorValidationError,
    MAX_DONOR_AGE, MIN_DONOR_AGE, NewDonorProfile, filter_donors,
};
pub use self::donor_registry::DonorRegistry;
pub use self::error::{Error, ErrorCode, ErrorValidationError, GENERIC_API_MESSAGE};
pub use self::history::{
    DonationDraft, DonationRecord, EntryType, History, HistoryEntry, HistoryFilter,
    HistoryValidationError, NewDonation, parse_date,
};
pub use self::history_ledger::HistoryLedger;
pub use self::matching::find_matches;
pub use self::request_workflow::RequestWorkflow;
pub use self::search::SearchQuery;
pub use self::session::Session;
pub use self::urgency::{Urgency, UrgencyParseError};
pub use self::user::{
    EmailAddress, ProfileUpdate, Registration, RegistrationDraft, Role, User, UserId,
    UserValidationError,
};

/// Convenient service result alias.
///
/// # Examples
/// ```
/// use bloodbank_client::domain::{ClientResult, Error};
///
/// fn check(city: &str) -> ClientResult<()> {
///     if city.trim().is_empty() {
///         return Err(Error::invalid_field("city", "city must not be empty"));
///     }
///     Ok(())
/// }
///
/// assert!(check(" ").is_err());
/// ```
pub type ClientResult<T> = Result<T, Error>;
