//! Wire DTOs for the blood-bank backend.
//!
//! Responses decode into these transport shapes first, then map into domain
//! records in one pass. Mapping failures are plain strings that the adapter
//! wraps as decode errors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    ActivityEvent, ActivityKind, BloodGroup, BloodRequest, DashboardStats, DonationRecord, Donor,
    DonorProfile, EmailAddress, EntryType, History, HistoryEntry, NewBloodRequest, NewDonation,
    NewDonorProfile, ProfileUpdate, Registration, RequestId, RequestStatus, Role, StockLevel,
    Urgency, User, UserId, parse_date,
};

fn group(raw: &str) -> Result<BloodGroup, String> {
    raw.parse().map_err(|err| format!("{err}"))
}

fn optional_group(raw: Option<String>) -> Result<Option<BloodGroup>, String> {
    raw.filter(|value| !value.trim().is_empty())
        .map(|value| group(&value))
        .transpose()
}

fn email(raw: &str) -> Result<EmailAddress, String> {
    EmailAddress::new(raw).map_err(|err| format!("{err}"))
}

fn non_negative(field: &str, value: i64) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("{field} {value} is out of range"))
}

const fn default_units() -> i64 {
    1
}

// ---- auth ----

#[derive(Debug, Serialize)]
pub(super) struct LoginRequestDto<'a> {
    pub(super) email: &'a str,
    pub(super) password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenDto {
    pub(super) access_token: String,
}

#[derive(Debug, Serialize)]
pub(super) struct SignupRequestDto<'a> {
    full_name: &'a str,
    email: &'a str,
    password: &'a str,
    role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    blood_group: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    city: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_donation_date: Option<NaiveDate>,
}

impl<'a> From<&'a Registration> for SignupRequestDto<'a> {
    fn from(value: &'a Registration) -> Self {
        Self {
            full_name: value.full_name(),
            email: value.email().as_ref(),
            password: value.password(),
            role: value.role(),
            phone_number: value.phone_number(),
            age: value.age(),
            blood_group: value.blood_group().map(BloodGroup::as_str),
            city: value.city(),
            last_donation_date: value.last_donation_date(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct UserDto {
    id: i64,
    full_name: String,
    email: String,
    role: String,
    #[serde(default)]
    phone_number: Option<String>,
    #[serde(default)]
    age: Option<i64>,
    #[serde(default)]
    blood_group: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    last_donation_date: Option<NaiveDate>,
}

impl UserDto {
    pub(super) fn into_domain(self) -> Result<User, String> {
        Ok(User {
            id: UserId::new(self.id),
            full_name: self.full_name,
            email: email(&self.email)?,
            role: self.role.parse().map_err(|err| format!("{err}"))?,
            phone_number: self.phone_number,
            age: self.age.map(|age| non_negative("age", age)).transpose()?,
            blood_group: optional_group(self.blood_group)?,
            city: self.city,
            last_donation_date: self.last_donation_date,
        })
    }
}

#[derive(Debug, Serialize)]
pub(super) struct ProfileUpdateDto<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    full_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone_number: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    blood_group: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    city: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_donation_date: Option<NaiveDate>,
}

impl<'a> From<&'a ProfileUpdate> for ProfileUpdateDto<'a> {
    fn from(value: &'a ProfileUpdate) -> Self {
        Self {
            full_name: value.full_name.as_deref().map(str::trim),
            phone_number: value.phone_number.as_deref(),
            age: value.age,
            blood_group: value.blood_group.map(BloodGroup::as_str),
            city: value.city.as_deref().map(str::trim),
            last_donation_date: value.last_donation_date,
        }
    }
}

// ---- donors ----

#[derive(Debug, Deserialize)]
pub(super) struct DonorListItemDto {
    id: i64,
    full_name: String,
    email: String,
    blood_group: String,
    city: String,
    age: i64,
    #[serde(default)]
    last_donation_date: Option<NaiveDate>,
}

impl DonorListItemDto {
    pub(super) fn into_domain(self) -> Result<Donor, String> {
        Ok(Donor {
            id: self.id,
            full_name: self.full_name,
            email: email(&self.email)?,
            blood_group: group(&self.blood_group)?,
            city: self.city,
            age: non_negative("age", self.age)?,
            last_donation_date: self.last_donation_date,
        })
    }
}

#[derive(Debug, Serialize)]
pub(super) struct DonorProfileRequestDto<'a> {
    blood_group: &'static str,
    city: &'a str,
    age: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_donation_date: Option<NaiveDate>,
}

impl<'a> From<&'a NewDonorProfile> for DonorProfileRequestDto<'a> {
    fn from(value: &'a NewDonorProfile) -> Self {
        Self {
            blood_group: value.blood_group.as_str(),
            city: &value.city,
            age: value.age,
            last_donation_date: value.last_donation_date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct DonorProfileDto {
    id: i64,
    user_id: i64,
    blood_group: String,
    city: String,
    age: i64,
    #[serde(default)]
    last_donation_date: Option<NaiveDate>,
}

impl DonorProfileDto {
    pub(super) fn into_domain(self) -> Result<DonorProfile, String> {
        Ok(DonorProfile {
            id: self.id,
            user_id: UserId::new(self.user_id),
            blood_group: group(&self.blood_group)?,
            city: self.city,
            age: non_negative("age", self.age)?,
            last_donation_date: self.last_donation_date,
        })
    }
}

// ---- requests ----

#[derive(Debug, Serialize)]
pub(super) struct CreateRequestDto<'a> {
    blood_group: &'static str,
    city: &'a str,
    urgency: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    patient_name: Option<&'a str>,
}

impl<'a> From<&'a NewBloodRequest> for CreateRequestDto<'a> {
    fn from(value: &'a NewBloodRequest) -> Self {
        Self {
            blood_group: value.blood_group.as_str(),
            city: &value.city,
            urgency: value.urgency.as_str(),
            patient_name: value.patient_name.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct BloodRequestDto {
    id: i64,
    #[serde(alias = "requester_id")]
    user_id: i64,
    #[serde(default)]
    patient_name: Option<String>,
    blood_group: String,
    city: String,
    #[serde(default)]
    urgency: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    fulfilled: Option<bool>,
    #[serde(default)]
    created_at: Option<NaiveDate>,
}

impl BloodRequestDto {
    fn status(&self) -> Result<RequestStatus, String> {
        match (&self.status, self.fulfilled) {
            (Some(raw), _) => raw.parse().map_err(|err| format!("{err}")),
            (None, Some(true)) => Ok(RequestStatus::Closed),
            (None, _) => Ok(RequestStatus::Open),
        }
    }

    pub(super) fn into_domain(self) -> Result<BloodRequest, String> {
        let status = self.status()?;
        let urgency = match self.urgency.as_deref() {
            Some(raw) => raw.parse::<Urgency>().map_err(|err| format!("{err}"))?,
            None => Urgency::default(),
        };
        Ok(BloodRequest {
            id: RequestId::new(self.id),
            requester_id: UserId::new(self.user_id),
            patient_name: self.patient_name,
            blood_group: group(&self.blood_group)?,
            city: self.city,
            urgency,
            status,
            created_at: self.created_at,
        })
    }
}

// ---- history ----

#[derive(Debug, Deserialize)]
pub(super) struct HistoryEntryDto {
    id: i64,
    entry_type: String,
    date: NaiveDate,
    hospital: String,
    blood_group: String,
    #[serde(default = "default_units", alias = "quantity")]
    units: i64,
}

impl HistoryEntryDto {
    fn into_domain(self) -> Result<HistoryEntry, String> {
        Ok(HistoryEntry {
            id: self.id,
            entry_type: self
                .entry_type
                .parse::<EntryType>()
                .map_err(|err| format!("{err}"))?,
            date: self.date,
            hospital: self.hospital,
            blood_group: group(&self.blood_group)?,
            units: non_negative("units", self.units)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct HistoryResponseDto {
    #[serde(default)]
    donations: Vec<HistoryEntryDto>,
    #[serde(default)]
    received: Vec<HistoryEntryDto>,
}

impl HistoryResponseDto {
    pub(super) fn into_domain(self) -> Result<History, String> {
        let convert = |entries: Vec<HistoryEntryDto>| {
            entries
                .into_iter()
                .map(HistoryEntryDto::into_domain)
                .collect::<Result<Vec<_>, _>>()
        };
        Ok(History {
            donations: convert(self.donations)?,
            received: convert(self.received)?,
        })
    }
}

#[derive(Debug, Serialize)]
pub(super) struct HistoryCreateDto<'a> {
    hospital: &'a str,
    blood_group: &'static str,
    date: NaiveDate,
    units: u32,
}

impl<'a> From<&'a NewDonation> for HistoryCreateDto<'a> {
    fn from(value: &'a NewDonation) -> Self {
        Self {
            hospital: &value.hospital,
            blood_group: value.blood_group.as_str(),
            date: value.date,
            units: value.units,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct DonationRecordDto {
    id: i64,
    #[serde(alias = "donor_id")]
    user_id: i64,
    hospital: String,
    blood_group: String,
    date: NaiveDate,
    #[serde(default = "default_units", alias = "quantity")]
    units: i64,
}

impl DonationRecordDto {
    pub(super) fn into_domain(self) -> Result<DonationRecord, String> {
        let units = non_negative("units", self.units)?;
        if units == 0 {
            return Err("units must be at least 1".to_owned());
        }
        Ok(DonationRecord {
            id: self.id,
            donor_id: UserId::new(self.user_id),
            hospital: self.hospital,
            blood_group: group(&self.blood_group)?,
            date: self.date,
            units,
        })
    }
}

// ---- stats ----

#[derive(Debug, Deserialize)]
struct StockLevelDto {
    group: String,
    units: u64,
}

#[derive(Debug, Deserialize)]
struct ActivityDto {
    #[serde(default)]
    donor: Option<String>,
    group: String,
    city: String,
    time: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct DashboardStatsDto {
    #[serde(default)]
    total_donors: u64,
    #[serde(default)]
    pending_requests: u64,
    #[serde(default)]
    recent_donations_count: u64,
    #[serde(default)]
    stock_levels: Vec<StockLevelDto>,
    #[serde(default)]
    recent_activity: Vec<ActivityDto>,
}

impl DashboardStatsDto {
    pub(super) fn into_domain(self) -> Result<DashboardStats, String> {
        let stock_levels = self
            .stock_levels
            .into_iter()
            .map(|level| {
                Ok(StockLevel {
                    group: group(&level.group)?,
                    units: level.units,
                })
            })
            .collect::<Result<Vec<_>, String>>()?;
        let recent_activity = self
            .recent_activity
            .into_iter()
            .map(|activity| {
                Ok(ActivityEvent {
                    kind: ActivityKind::Donation,
                    actor: activity.donor.unwrap_or_else(|| "Unknown".to_owned()),
                    blood_group: group(&activity.group)?,
                    location: activity.city,
                    occurred_on: parse_date(&activity.time).map_err(|err| format!("{err}"))?,
                })
            })
            .collect::<Result<Vec<_>, String>>()?;
        Ok(DashboardStats {
            total_donors: self.total_donors,
            pending_requests: self.pending_requests,
            recent_donations_count: self.recent_donations_count,
            stock_levels,
            recent_activity,
        })
    }
}

// ---- errors ----

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBodyDto {
    #[serde(default)]
    detail: Option<Value>,
}

impl ErrorBodyDto {
    /// Backend `detail` as a display message: the string itself, or the first
    /// `msg` of a validation-error list.
    pub(super) fn message(&self) -> Option<String> {
        let message = match self.detail.as_ref()? {
            Value::String(text) => Some(text.clone()),
            Value::Array(items) => items
                .first()
                .and_then(|item| item.get("msg"))
                .and_then(Value::as_str)
                .map(str::to_owned),
            _ => None,
        }?;
        let trimmed = message.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    }
}
