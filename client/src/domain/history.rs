//! Donation history: logged donations, received transfusions and filters.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BloodGroup, UserId};

/// Date format accepted for history inputs.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validation errors for donation logging and history filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryValidationError {
    /// Hospital was blank once trimmed.
    EmptyHospital,
    /// Blood group text was not one of the eight groups.
    InvalidBloodGroup {
        /// Rejected text.
        value: String,
    },
    /// Date text was not a valid `YYYY-MM-DD` calendar date.
    InvalidDate {
        /// Rejected text.
        value: String,
    },
    /// Donation date lies after today.
    DateInFuture {
        /// Rejected date.
        date: NaiveDate,
    },
    /// Units must be a positive whole number.
    NonPositiveUnits {
        /// Rejected value.
        units: i64,
    },
    /// Entry type was not `donation` or `received`.
    UnknownEntryType {
        /// Rejected text.
        value: String,
    },
    /// Range start lies after its end.
    InvertedRange {
        /// Range start.
        start: NaiveDate,
        /// Range end.
        end: NaiveDate,
    },
}

impl HistoryValidationError {
    /// Name of the input field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyHospital => "hospital",
            Self::InvalidBloodGroup { .. } => "blood_group",
            Self::InvalidDate { .. } | Self::DateInFuture { .. } => "date",
            Self::NonPositiveUnits { .. } => "units",
            Self::UnknownEntryType { .. } => "entry_type",
            Self::InvertedRange { .. } => "start_date",
        }
    }
}

impl fmt::Display for HistoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyHospital => write!(f, "hospital must not be empty"),
            Self::InvalidBloodGroup { value } => {
                write!(f, "blood group {value:?} is not recognised")
            }
            Self::InvalidDate { value } => {
                write!(f, "date {value:?} is not a valid YYYY-MM-DD calendar date")
            }
            Self::DateInFuture { date } => write!(f, "date {date} is in the future"),
            Self::NonPositiveUnits { units } => {
                write!(f, "units must be at least 1 (got {units})")
            }
            Self::UnknownEntryType { value } => {
                write!(f, "entry type must be donation or received (got {value:?})")
            }
            Self::InvertedRange { start, end } => {
                write!(f, "start date {start} is after end date {end}")
            }
        }
    }
}

impl std::error::Error for HistoryValidationError {}

/// Parse a `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns [`HistoryValidationError::InvalidDate`] for malformed or
/// impossible dates such as `2023-02-29`.
pub fn parse_date(raw: &str) -> Result<NaiveDate, HistoryValidationError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        HistoryValidationError::InvalidDate {
            value: raw.to_owned(),
        }
    })
}

/// Kind of history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Blood given by the user.
    Donation,
    /// Transfusion received by the user.
    Received,
}

impl EntryType {
    /// Lowercase wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Donation => "donation",
            Self::Received => "received",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = HistoryValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "donation" => Ok(Self::Donation),
            "received" => Ok(Self::Received),
            _ => Err(HistoryValidationError::UnknownEntryType {
                value: raw.to_owned(),
            }),
        }
    }
}

/// One row of a user's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Entry identifier.
    pub id: i64,
    /// Donation or received transfusion.
    pub entry_type: EntryType,
    /// Calendar date of the event.
    pub date: NaiveDate,
    /// Hospital where it happened.
    pub hospital: String,
    /// Blood group involved.
    pub blood_group: BloodGroup,
    /// Units involved.
    pub units: u32,
}

/// A user's history split by entry type, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    /// Donations given.
    pub donations: Vec<HistoryEntry>,
    /// Transfusions received.
    pub received: Vec<HistoryEntry>,
}

impl History {
    /// Total entries across both sequences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.donations.len() + self.received.len()
    }

    /// Whether both sequences are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.donations.is_empty() && self.received.is_empty()
    }
}

/// Validated history filter; the date range is inclusive on both ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    entry_type: Option<EntryType>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

impl HistoryFilter {
    /// Build a filter.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryValidationError::InvertedRange`] when `start_date`
    /// is after `end_date`.
    ///
    /// # Examples
    /// ```
    /// use bloodbank_client::domain::HistoryFilter;
    /// use chrono::NaiveDate;
    ///
    /// let start = NaiveDate::from_ymd_opt(2024, 2, 1);
    /// let end = NaiveDate::from_ymd_opt(2024, 1, 1);
    /// assert!(HistoryFilter::new(None, start, end).is_err());
    /// ```
    pub fn new(
        entry_type: Option<EntryType>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Self, HistoryValidationError> {
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if start > end {
                return Err(HistoryValidationError::InvertedRange { start, end });
            }
        }
        Ok(Self {
            entry_type,
            start_date,
            end_date,
        })
    }

    /// Build a filter from raw form text; blank fields mean "any".
    ///
    /// # Errors
    ///
    /// Returns [`HistoryValidationError`] for unknown entry types, invalid
    /// dates or inverted ranges.
    pub fn from_strs(
        entry_type: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Self, HistoryValidationError> {
        fn present(value: Option<&str>) -> Option<&str> {
            value.filter(|raw| !raw.trim().is_empty())
        }

        let entry_type = present(entry_type).map(str::parse).transpose()?;
        let start_date = present(start_date).map(parse_date).transpose()?;
        let end_date = present(end_date).map(parse_date).transpose()?;
        Self::new(entry_type, start_date, end_date)
    }

    /// Requested entry type, if any.
    #[must_use]
    pub const fn entry_type(&self) -> Option<EntryType> {
        self.entry_type
    }

    /// Inclusive range start.
    #[must_use]
    pub const fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    /// Inclusive range end.
    #[must_use]
    pub const fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    /// Whether the filter constrains nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Whether `entry` passes the filter.
    #[must_use]
    pub fn admits(&self, entry: &HistoryEntry) -> bool {
        self.entry_type.is_none_or(|kind| kind == entry.entry_type)
            && self.start_date.is_none_or(|start| entry.date >= start)
            && self.end_date.is_none_or(|end| entry.date <= end)
    }

    /// Keep only admitted entries, ordered most recent first.
    #[must_use]
    pub fn apply(&self, history: History) -> History {
        let keep = |entries: Vec<HistoryEntry>| {
            let mut kept: Vec<HistoryEntry> =
                entries.into_iter().filter(|entry| self.admits(entry)).collect();
            kept.sort_by(|a, b| b.date.cmp(&a.date));
            kept
        };
        History {
            donations: keep(history.donations),
            received: keep(history.received),
        }
    }
}

/// Raw donation form input.
#[derive(Debug, Clone, Default)]
pub struct DonationDraft {
    /// Hospital name.
    pub hospital: String,
    /// Blood group text.
    pub blood_group: String,
    /// `YYYY-MM-DD` date text.
    pub date: String,
    /// Units donated.
    pub units: i64,
}

/// Validated donation ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDonation {
    /// Trimmed hospital name.
    pub hospital: String,
    /// Blood group donated.
    pub blood_group: BloodGroup,
    /// Donation date, not after today.
    pub date: NaiveDate,
    /// Units donated, at least one.
    pub units: u32,
}

impl NewDonation {
    /// Validate a draft against today's date.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryValidationError`] for blank hospitals, unknown
    /// groups, invalid or future dates, and units below one.
    pub fn from_draft(draft: DonationDraft, today: NaiveDate) -> Result<Self, HistoryValidationError> {
        let hospital = draft.hospital.trim();
        if hospital.is_empty() {
            return Err(HistoryValidationError::EmptyHospital);
        }
        let blood_group = draft.blood_group.parse::<BloodGroup>().map_err(|_| {
            HistoryValidationError::InvalidBloodGroup {
                value: draft.blood_group.clone(),
            }
        })?;
        let date = parse_date(&draft.date)?;
        if date > today {
            return Err(HistoryValidationError::DateInFuture { date });
        }
        let units = u32::try_from(draft.units)
            .ok()
            .filter(|units| *units >= 1)
            .ok_or(HistoryValidationError::NonPositiveUnits { units: draft.units })?;
        Ok(Self {
            hospital: hospital.to_owned(),
            blood_group,
            date,
            units,
        })
    }
}

/// Donation as stored by the backend. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationRecord {
    /// Entry identifier.
    pub id: i64,
    /// Donor who logged it.
    pub donor_id: UserId,
    /// Hospital name.
    pub hospital: String,
    /// Blood group donated.
    pub blood_group: BloodGroup,
    /// Donation date.
    pub date: NaiveDate,
    /// Units donated.
    pub units: u32,
}
