//! Donor directory entries, donor profiles and directory filtering.

use std::fmt;

use chrono::{Days, NaiveDate};
use serde::Serialize;

use super::{BloodGroup, EmailAddress, Role, SearchQuery, User, UserId};

/// Minimum gap between whole-blood donations.
pub const DONATION_INTERVAL_DAYS: u64 = 56;
/// Youngest age accepted for a donor profile.
pub const MIN_DONOR_AGE: u32 = 18;
/// Oldest age accepted for a donor profile.
pub const MAX_DONOR_AGE: u32 = 65;

/// Validation errors for donor profile drafts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DonorValidationError {
    /// Blood group text was not one of the eight groups.
    InvalidBloodGroup {
        /// Rejected text.
        value: String,
    },
    /// City was blank once trimmed.
    EmptyCity,
    /// Age was outside the accepted donor range.
    AgeOutOfRange {
        /// Rejected age.
        age: u32,
    },
    /// Last donation date is later than today.
    DonationInFuture,
}

impl DonorValidationError {
    /// Name of the input field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::InvalidBloodGroup { .. } => "blood_group",
            Self::EmptyCity => "city",
            Self::AgeOutOfRange { .. } => "age",
            Self::DonationInFuture => "last_donation_date",
        }
    }
}

impl fmt::Display for DonorValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBloodGroup { value } => {
                write!(f, "blood group {value:?} is not recognised")
            }
            Self::EmptyCity => write!(f, "city must not be empty"),
            Self::AgeOutOfRange { age } => write!(
                f,
                "donor age must be between {MIN_DONOR_AGE} and {MAX_DONOR_AGE} (got {age})"
            ),
            Self::DonationInFuture => write!(f, "last donation date must not be in the future"),
        }
    }
}

impl std::error::Error for DonorValidationError {}

/// Entry in the donor directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Donor {
    /// Donor profile identifier.
    pub id: i64,
    /// Display name.
    pub full_name: String,
    /// Contact email.
    pub email: EmailAddress,
    /// Donor's blood group.
    pub blood_group: BloodGroup,
    /// Donor's city.
    pub city: String,
    /// Age in years.
    pub age: u32,
    /// Most recent donation, if any.
    pub last_donation_date: Option<NaiveDate>,
}

impl Donor {
    /// Whether enough time has passed since the last donation.
    ///
    /// # Examples
    /// ```
    /// use bloodbank_client::domain::{BloodGroup, Donor, EmailAddress};
    /// use chrono::NaiveDate;
    ///
    /// let donor = Donor {
    ///     id: 1,
    ///     full_name: "Ali Raza".to_owned(),
    ///     email: EmailAddress::new("ali@example.com").unwrap(),
    ///     blood_group: BloodGroup::OPositive,
    ///     city: "Lahore".to_owned(),
    ///     age: 30,
    ///     last_donation_date: NaiveDate::from_ymd_opt(2024, 1, 1),
    /// };
    /// let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
    /// assert!(donor.is_eligible_on(today));
    /// ```
    #[must_use]
    pub fn is_eligible_on(&self, today: NaiveDate) -> bool {
        self.last_donation_date.is_none_or(|last| {
            last.checked_add_days(Days::new(DONATION_INTERVAL_DAYS))
                .is_some_and(|next| next <= today)
        })
    }

    /// Whether the directory search query matches this donor.
    #[must_use]
    pub fn matches(&self, query: &SearchQuery) -> bool {
        query.matches_any([
            self.full_name.as_str(),
            self.city.as_str(),
            self.blood_group.as_str(),
        ])
    }
}

impl From<Donor> for User {
    fn from(donor: Donor) -> Self {
        Self {
            id: UserId::new(donor.id),
            full_name: donor.full_name,
            email: donor.email,
            role: Role::Donor,
            phone_number: None,
            age: Some(donor.age),
            blood_group: Some(donor.blood_group),
            city: Some(donor.city),
            last_donation_date: donor.last_donation_date,
        }
    }
}

/// Filter a directory snapshot without touching it.
#[must_use]
pub fn filter_donors(donors: &[Donor], query: &SearchQuery) -> Vec<Donor> {
    donors
        .iter()
        .filter(|donor| donor.matches(query))
        .cloned()
        .collect()
}

/// Raw donor profile form input.
#[derive(Debug, Clone, Default)]
pub struct DonorProfileDraft {
    /// Blood group text.
    pub blood_group: String,
    /// City.
    pub city: String,
    /// Age in years.
    pub age: u32,
    /// Optional last donation date.
    pub last_donation_date: Option<NaiveDate>,
}

/// Validated donor profile ready for submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDonorProfile {
    /// Donor's blood group.
    pub blood_group: BloodGroup,
    /// Trimmed city.
    pub city: String,
    /// Age in years.
    pub age: u32,
    /// Most recent donation.
    pub last_donation_date: Option<NaiveDate>,
}

impl NewDonorProfile {
    /// Validate a draft against today's date.
    ///
    /// # Errors
    ///
    /// Returns [`DonorValidationError`] for unknown groups, blank cities,
    /// out-of-range ages, or donation dates after `today`.
    pub fn from_draft(
        draft: DonorProfileDraft,
        today: NaiveDate,
    ) -> Result<Self, DonorValidationError> {
        let blood_group = draft
            .blood_group
            .parse::<BloodGroup>()
            .map_err(|_| DonorValidationError::InvalidBloodGroup {
                value: draft.blood_group.clone(),
            })?;
        let city = draft.city.trim();
        if city.is_empty() {
            return Err(DonorValidationError::EmptyCity);
        }
        if !(MIN_DONOR_AGE..=MAX_DONOR_AGE).contains(&draft.age) {
            return Err(DonorValidationError::AgeOutOfRange { age: draft.age });
        }
        if draft.last_donation_date.is_some_and(|date| date > today) {
            return Err(DonorValidationError::DonationInFuture);
        }
        Ok(Self {
            blood_group,
            city: city.to_owned(),
            age: draft.age,
            last_donation_date: draft.last_donation_date,
        })
    }
}

/// Donor profile as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DonorProfile {
    /// Profile identifier.
    pub id: i64,
    /// Owning user.
    pub user_id: UserId,
    /// Donor's blood group.
    pub blood_group: BloodGroup,
    /// Donor's city.
    pub city: String,
    /// Age in years.
    pub age: u32,
    /// Most recent donation.
    pub last_donation_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    //! Regression coverage for eligibility, filtering and profile validation.
    use super::*;
    use rstest::{fixture, rstest};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn donor(name: &str, group: BloodGroup, city: &str) -> Donor {
        Donor {
            id: 1,
            full_name: name.to_owned(),
            email: EmailAddress::new("donor@example.com").expect("email"),
            blood_group: group,
            city: city.to_owned(),
            age: 30,
            last_donation_date: None,
        }
    }

    #[fixture]
    fn directory() -> Vec<Donor> {
        vec![
            donor("Ali Raza", BloodGroup::OPositive, "Lahore"),
            donor("Sara Khan", BloodGroup::ANegative, "Karachi"),
            donor("Bilal Ahmed", BloodGroup::AbPositive, "Islamabad"),
        ]
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some(date(2024, 1, 5)), true)]
    #[case(Some(date(2024, 1, 6)), false)]
    #[case(Some(date(2024, 2, 20)), false)]
    fn eligibility_uses_donation_interval(
        #[case] last: Option<NaiveDate>,
        #[case] expected: bool,
    ) {
        let mut candidate = donor("Ali Raza", BloodGroup::OPositive, "Lahore");
        candidate.last_donation_date = last;
        assert_eq!(candidate.is_eligible_on(date(2024, 3, 1)), expected);
    }

    #[rstest]
    #[case("lahore", vec!["Ali Raza"])]
    #[case("KHAN", vec!["Sara Khan"])]
    #[case("ab+", vec!["Bilal Ahmed"])]
    #[case("", vec!["Ali Raza", "Sara Khan", "Bilal Ahmed"])]
    #[case("quetta", vec![])]
    fn filters_by_name_city_or_group(
        directory: Vec<Donor>,
        #[case] raw: &str,
        #[case] expected: Vec<&str>,
    ) {
        let names: Vec<String> = filter_donors(&directory, &SearchQuery::new(raw))
            .into_iter()
            .map(|donor| donor.full_name)
            .collect();
        assert_eq!(names, expected);
    }

    #[rstest]
    fn filtering_leaves_snapshot_untouched(directory: Vec<Donor>) {
        let before = directory.clone();
        let _filtered = filter_donors(&directory, &SearchQuery::new("ali"));
        assert_eq!(directory, before);
    }

    #[rstest]
    #[case("Z+", " Lahore", 30, None, "blood_group")]
    #[case("O+", "  ", 30, None, "city")]
    #[case("O+", "Lahore", 17, None, "age")]
    #[case("O+", "Lahore", 66, None, "age")]
    #[case("O+", "Lahore", 30, Some(date(2024, 3, 2)), "last_donation_date")]
    fn invalid_profiles_name_the_field(
        #[case] group: &str,
        #[case] city: &str,
        #[case] age: u32,
        #[case] last: Option<NaiveDate>,
        #[case] field: &str,
    ) {
        let draft = DonorProfileDraft {
            blood_group: group.to_owned(),
            city: city.to_owned(),
            age,
            last_donation_date: last,
        };
        let err = NewDonorProfile::from_draft(draft, date(2024, 3, 1)).expect_err("invalid");
        assert_eq!(err.field(), field);
    }

    #[rstest]
    fn valid_profile_is_trimmed() {
        let draft = DonorProfileDraft {
            blood_group: "o+".to_owned(),
            city: " Lahore ".to_owned(),
            age: 30,
            last_donation_date: None,
        };
        let profile = NewDonorProfile::from_draft(draft, date(2024, 3, 1)).expect("valid");
        assert_eq!(profile.blood_group, BloodGroup::OPositive);
        assert_eq!(profile.city, "Lahore");
    }
}
