//! Blood requests posted by recipients and their lifecycle.

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BloodGroup, SearchQuery, Urgency, UserId};

/// Validation errors for request drafts and status changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestValidationError {
    /// Blood group text was not one of the eight groups.
    InvalidBloodGroup {
        /// Rejected text.
        value: String,
    },
    /// City was blank once trimmed.
    EmptyCity,
    /// Urgency text was outside the closed set.
    InvalidUrgency {
        /// Rejected text.
        value: String,
    },
    /// Status text was not a known status.
    UnknownStatus {
        /// Rejected text.
        value: String,
    },
    /// Requested status change is not allowed.
    InvalidTransition {
        /// Current status.
        from: RequestStatus,
        /// Requested status.
        to: RequestStatus,
    },
}

impl RequestValidationError {
    /// Name of the input field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::InvalidBloodGroup { .. } => "blood_group",
            Self::EmptyCity => "city",
            Self::InvalidUrgency { .. } => "urgency",
            Self::UnknownStatus { .. } | Self::InvalidTransition { .. } => "status",
        }
    }
}

impl fmt::Display for RequestValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBloodGroup { value } => {
                write!(f, "blood group {value:?} is not recognised")
            }
            Self::EmptyCity => write!(f, "city must not be empty"),
            Self::InvalidUrgency { value } => write!(
                f,
                "urgency must be one of normal, high, critical (got {value:?})"
            ),
            Self::UnknownStatus { value } => write!(f, "unknown request status {value:?}"),
            Self::InvalidTransition { from, to } => {
                write!(f, "request cannot move from {from} to {to}")
            }
        }
    }
}

impl std::error::Error for RequestValidationError {}

/// Backend-assigned request identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(i64);

impl RequestId {
    /// Wrap a raw backend identifier.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a request is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Waiting for donors.
    #[default]
    Open,
    /// Donors have been found.
    Matched,
    /// Fulfilled or withdrawn.
    Closed,
}

impl RequestStatus {
    /// Lowercase wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Matched => "matched",
            Self::Closed => "closed",
        }
    }

    /// Whether the lifecycle allows moving to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Open, Self::Matched | Self::Closed) | (Self::Matched, Self::Closed)
        )
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = RequestValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "matched" => Ok(Self::Matched),
            "closed" => Ok(Self::Closed),
            _ => Err(RequestValidationError::UnknownStatus {
                value: raw.to_owned(),
            }),
        }
    }
}

/// A recipient's request for blood.
///
/// ## Invariants
/// - `blood_group` is always one of the eight groups (enforced by the type).
/// - `status` only changes through [`BloodRequest::transition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BloodRequest {
    /// Backend identifier.
    pub id: RequestId,
    /// Recipient who posted the request.
    pub requester_id: UserId,
    /// Patient the blood is for, when the backend supplies it.
    pub patient_name: Option<String>,
    /// Required blood group.
    pub blood_group: BloodGroup,
    /// City where the blood is needed.
    pub city: String,
    /// Priority tag.
    pub urgency: Urgency,
    /// Lifecycle status.
    pub status: RequestStatus,
    /// Creation date.
    pub created_at: Option<NaiveDate>,
}

impl BloodRequest {
    /// Return a copy of the request with its status moved to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestValidationError::InvalidTransition`] for transitions
    /// the lifecycle does not allow.
    pub fn transition(&self, next: RequestStatus) -> Result<Self, RequestValidationError> {
        if !self.status.can_transition_to(next) {
            return Err(RequestValidationError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        Ok(Self {
            status: next,
            ..self.clone()
        })
    }

    /// Whether the request is still waiting for donors.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == RequestStatus::Open
    }

    /// Whether the list search query matches this request.
    #[must_use]
    pub fn matches(&self, query: &SearchQuery) -> bool {
        query.matches_any(
            [
                self.patient_name.as_deref(),
                Some(self.city.as_str()),
                Some(self.blood_group.as_str()),
            ]
            .into_iter()
            .flatten(),
        )
    }
}

/// Filter a request snapshot by patient name, city or blood group.
///
/// # Examples
/// ```
/// use bloodbank_client::domain::{filter_requests, SearchQuery};
///
/// assert!(filter_requests(&[], &SearchQuery::new("o+")).is_empty());
/// ```
#[must_use]
pub fn filter_requests(requests: &[BloodRequest], query: &SearchQuery) -> Vec<BloodRequest> {
    requests
        .iter()
        .filter(|request| request.matches(query))
        .cloned()
        .collect()
}

/// Display order: most urgent first, then oldest first; undated requests last.
pub fn sort_for_display(requests: &mut [BloodRequest]) {
    requests.sort_by_key(|request| {
        (
            Reverse(request.urgency),
            request.created_at.is_none(),
            request.created_at,
        )
    });
}

/// Raw request form input.
#[derive(Debug, Clone, Default)]
pub struct RequestDraft {
    /// Blood group text.
    pub blood_group: String,
    /// City.
    pub city: String,
    /// Urgency text.
    pub urgency: String,
    /// Optional patient name.
    pub patient_name: Option<String>,
}

/// Validated request ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBloodRequest {
    /// Required blood group.
    pub blood_group: BloodGroup,
    /// Trimmed city.
    pub city: String,
    /// Priority tag.
    pub urgency: Urgency,
    /// Patient name, trimmed, when supplied.
    pub patient_name: Option<String>,
}

impl TryFrom<RequestDraft> for NewBloodRequest {
    type Error = RequestValidationError;

    fn try_from(draft: RequestDraft) -> Result<Self, Self::Error> {
        let blood_group = draft.blood_group.parse::<BloodGroup>().map_err(|_| {
            RequestValidationError::InvalidBloodGroup {
                value: draft.blood_group.clone(),
            }
        })?;
        let city = draft.city.trim();
        if city.is_empty() {
            return Err(RequestValidationError::EmptyCity);
        }
        let urgency = draft.urgency.parse::<Urgency>().map_err(|_| {
            RequestValidationError::InvalidUrgency {
                value: draft.urgency.clone(),
            }
        })?;
        Ok(Self {
            blood_group,
            city: city.to_owned(),
            urgency,
            patient_name: draft
                .patient_name
                .map(|name| name.trim().to_owned())
                .filter(|name| !name.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for request validation, lifecycle and ordering.
    use super::*;
    use rstest::rstest;

    fn request(id: i64, urgency: Urgency, created: Option<(i32, u32, u32)>) -> BloodRequest {
        BloodRequest {
            id: RequestId::new(id),
            requester_id: UserId::new(9),
            patient_name: None,
            blood_group: BloodGroup::APositive,
            city: "Lahore".to_owned(),
            urgency,
            status: RequestStatus::Open,
            created_at: created.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
        }
    }

    #[rstest]
    #[case(RequestStatus::Open, RequestStatus::Matched, true)]
    #[case(RequestStatus::Open, RequestStatus::Closed, true)]
    #[case(RequestStatus::Matched, RequestStatus::Closed, true)]
    #[case(RequestStatus::Open, RequestStatus::Open, false)]
    #[case(RequestStatus::Matched, RequestStatus::Open, false)]
    #[case(RequestStatus::Closed, RequestStatus::Open, false)]
    #[case(RequestStatus::Closed, RequestStatus::Matched, false)]
    fn lifecycle_transitions(
        #[case] from: RequestStatus,
        #[case] to: RequestStatus,
        #[case] allowed: bool,
    ) {
        let mut original = request(1, Urgency::Normal, None);
        original.status = from;
        let result = original.transition(to);
        assert_eq!(result.is_ok(), allowed);
        assert_eq!(original.status, from, "transition must not mutate the input");
    }

    #[rstest]
    fn draft_with_unknown_urgency_is_rejected() {
        let draft = RequestDraft {
            blood_group: "A+".to_owned(),
            city: "Lahore".to_owned(),
            urgency: "urgent".to_owned(),
            patient_name: None,
        };
        let err = NewBloodRequest::try_from(draft).expect_err("urgent is not canonical");
        assert_eq!(err.field(), "urgency");
    }

    #[rstest]
    fn draft_is_normalised() {
        let draft = RequestDraft {
            blood_group: "ab-".to_owned(),
            city: "  Multan ".to_owned(),
            urgency: "Critical".to_owned(),
            patient_name: Some("  ".to_owned()),
        };
        let request = NewBloodRequest::try_from(draft).expect("valid draft");
        assert_eq!(request.blood_group, BloodGroup::AbNegative);
        assert_eq!(request.city, "Multan");
        assert_eq!(request.urgency, Urgency::Critical);
        assert_eq!(request.patient_name, None);
    }

    #[rstest]
    fn display_order_puts_critical_then_oldest_first() {
        let mut requests = vec![
            request(1, Urgency::Normal, Some((2024, 1, 1))),
            request(2, Urgency::Critical, Some((2024, 1, 3))),
            request(3, Urgency::Critical, Some((2024, 1, 2))),
            request(4, Urgency::High, None),
            request(5, Urgency::High, Some((2024, 1, 5))),
        ];
        sort_for_display(&mut requests);
        let ids: Vec<i64> = requests.iter().map(|r| r.id.get()).collect();
        assert_eq!(ids, vec![3, 2, 5, 4, 1]);
    }

    #[rstest]
    fn status_parses_case_insensitively() {
        assert_eq!("Matched".parse::<RequestStatus>(), Ok(RequestStatus::Matched));
        assert!("pending".parse::<RequestStatus>().is_err());
    }
}
