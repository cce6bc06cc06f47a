//! User accounts, registration payloads and profile updates.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::BloodGroup;

/// Validation errors returned while building registrations and updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Full name was blank once trimmed.
    EmptyFullName,
    /// Email did not have the `local@domain` shape.
    InvalidEmail,
    /// Password was empty.
    EmptyPassword,
    /// Role text was not a known role.
    UnknownRole {
        /// Rejected role text.
        value: String,
    },
    /// Administrators are provisioned by the backend, not self-registered.
    AdminRegistration,
    /// Blood group text was not one of the eight groups.
    InvalidBloodGroup {
        /// Rejected blood group text.
        value: String,
    },
    /// City was supplied but blank.
    EmptyCity,
}

impl UserValidationError {
    /// Name of the input field the error refers to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyFullName => "full_name",
            Self::InvalidEmail => "email",
            Self::EmptyPassword => "password",
            Self::UnknownRole { .. } | Self::AdminRegistration => "role",
            Self::InvalidBloodGroup { .. } => "blood_group",
            Self::EmptyCity => "city",
        }
    }
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyFullName => write!(f, "full name must not be empty"),
            Self::InvalidEmail => write!(f, "email must look like name@example.com"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::UnknownRole { value } => {
                write!(f, "role must be donor or recipient (got {value:?})")
            }
            Self::AdminRegistration => write!(f, "admin accounts cannot self-register"),
            Self::InvalidBloodGroup { value } => {
                write!(f, "blood group {value:?} is not recognised")
            }
            Self::EmptyCity => write!(f, "city must not be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Backend-assigned user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
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

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account role. Fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Offers blood donations.
    Donor,
    /// Posts blood requests.
    Recipient,
    /// Views aggregated statistics.
    Admin,
}

impl Role {
    /// Lowercase wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Donor => "donor",
            Self::Recipient => "recipient",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = UserValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "donor" => Ok(Self::Donor),
            "recipient" => Ok(Self::Recipient),
            "admin" => Ok(Self::Admin),
            _ => Err(UserValidationError::UnknownRole {
                value: raw.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Syntactically plausible email address, trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate an email address.
    ///
    /// # Errors
    ///
    /// Returns [`UserValidationError::InvalidEmail`] unless the input has
    /// exactly one `@` with non-empty parts and no whitespace.
    pub fn new(raw: &str) -> Result<Self, UserValidationError> {
        let trimmed = raw.trim();
        let mut parts = trimmed.split('@');
        let valid = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(local), Some(domain), None)
                if !local.is_empty() && !domain.is_empty()
        ) && !trimmed.chars().any(char::is_whitespace);
        if valid {
            Ok(Self(trimmed.to_owned()))
        } else {
            Err(UserValidationError::InvalidEmail)
        }
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Account as returned by the backend profile endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend identifier.
    pub id: UserId,
    /// Display name.
    pub full_name: String,
    /// Login email.
    pub email: EmailAddress,
    /// Immutable account role.
    pub role: Role,
    /// Contact number.
    pub phone_number: Option<String>,
    /// Age in years.
    pub age: Option<u32>,
    /// Blood group, when known.
    pub blood_group: Option<BloodGroup>,
    /// Home city.
    pub city: Option<String>,
    /// Most recent donation.
    pub last_donation_date: Option<NaiveDate>,
}

/// Raw sign-up form input.
#[derive(Debug, Clone, Default)]
pub struct RegistrationDraft {
    /// Full name.
    pub full_name: String,
    /// Email address.
    pub email: String,
    /// Plain-text password; zeroized once validated.
    pub password: String,
    /// `donor` or `recipient`.
    pub role: String,
    /// Optional contact number.
    pub phone_number: Option<String>,
    /// Optional age.
    pub age: Option<u32>,
    /// Optional blood group text.
    pub blood_group: Option<String>,
    /// Optional city.
    pub city: Option<String>,
    /// Optional last donation date.
    pub last_donation_date: Option<NaiveDate>,
}

/// Validated sign-up payload.
///
/// ## Invariants
/// - `full_name` is trimmed and non-empty.
/// - `role` is [`Role::Donor`] or [`Role::Recipient`].
/// - `password` is non-empty and wiped from memory on drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    full_name: String,
    email: EmailAddress,
    password: Zeroizing<String>,
    role: Role,
    phone_number: Option<String>,
    age: Option<u32>,
    blood_group: Option<BloodGroup>,
    city: Option<String>,
    last_donation_date: Option<NaiveDate>,
}

impl Registration {
    /// Full name, trimmed.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Login email.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password as entered.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Requested role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Contact number.
    #[must_use]
    pub fn phone_number(&self) -> Option<&str> {
        self.phone_number.as_deref()
    }

    /// Age in years.
    #[must_use]
    pub const fn age(&self) -> Option<u32> {
        self.age
    }

    /// Blood group.
    #[must_use]
    pub const fn blood_group(&self) -> Option<BloodGroup> {
        self.blood_group
    }

    /// Home city.
    #[must_use]
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    /// Most recent donation.
    #[must_use]
    pub const fn last_donation_date(&self) -> Option<NaiveDate> {
        self.last_donation_date
    }
}

impl TryFrom<RegistrationDraft> for Registration {
    type Error = UserValidationError;

    fn try_from(draft: RegistrationDraft) -> Result<Self, Self::Error> {
        let full_name = draft.full_name.trim();
        if full_name.is_empty() {
            return Err(UserValidationError::EmptyFullName);
        }
        let email = EmailAddress::new(&draft.email)?;
        if draft.password.is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }
        let role: Role = draft.role.parse()?;
        if role == Role::Admin {
            return Err(UserValidationError::AdminRegistration);
        }

        Ok(Self {
            full_name: full_name.to_owned(),
            email,
            password: Zeroizing::new(draft.password),
            role,
            phone_number: non_blank(draft.phone_number),
            age: draft.age,
            blood_group: parse_optional_group(draft.blood_group)?,
            city: optional_city(draft.city)?,
            last_donation_date: draft.last_donation_date,
        })
    }
}

/// Partial profile update; `None` fields are left untouched server-side.
///
/// The role is deliberately absent: it cannot change after registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New full name.
    pub full_name: Option<String>,
    /// New contact number.
    pub phone_number: Option<String>,
    /// New age.
    pub age: Option<u32>,
    /// New blood group.
    pub blood_group: Option<BloodGroup>,
    /// New home city.
    pub city: Option<String>,
    /// New last donation date.
    pub last_donation_date: Option<NaiveDate>,
}

impl ProfileUpdate {
    /// Check the supplied fields.
    ///
    /// # Errors
    ///
    /// Returns an error when a supplied name or city is blank.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if self
            .full_name
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(UserValidationError::EmptyFullName);
        }
        if self
            .city
            .as_deref()
            .is_some_and(|city| city.trim().is_empty())
        {
            return Err(UserValidationError::EmptyCity);
        }
        Ok(())
    }

    /// Whether the update carries no changes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

fn optional_city(value: Option<String>) -> Result<Option<String>, UserValidationError> {
    match value {
        Some(raw) if raw.trim().is_empty() => Err(UserValidationError::EmptyCity),
        Some(raw) => Ok(Some(raw.trim().to_owned())),
        None => Ok(None),
    }
}

fn parse_optional_group(value: Option<String>) -> Result<Option<BloodGroup>, UserValidationError> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| {
            raw.parse::<BloodGroup>()
                .map_err(|_| UserValidationError::InvalidBloodGroup { value: raw })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    //! Regression coverage for registration and profile validation.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn draft() -> RegistrationDraft {
        RegistrationDraft {
            full_name: "  Ali Raza ".to_owned(),
            email: "ali@example.com".to_owned(),
            password: "s3cret".to_owned(),
            role: "donor".to_owned(),
            phone_number: Some("   ".to_owned()),
            age: Some(30),
            blood_group: Some("o+".to_owned()),
            city: Some(" Lahore ".to_owned()),
            last_donation_date: None,
        }
    }

    #[rstest]
    fn valid_registration_is_normalised(draft: RegistrationDraft) {
        let registration = Registration::try_from(draft).expect("valid draft");
        assert_eq!(registration.full_name(), "Ali Raza");
        assert_eq!(registration.role(), Role::Donor);
        assert_eq!(registration.blood_group(), Some(BloodGroup::OPositive));
        assert_eq!(registration.city(), Some("Lahore"));
        assert_eq!(registration.phone_number(), None);
    }

    #[rstest]
    #[case::blank_name(|d: &mut RegistrationDraft| d.full_name = " ".to_owned(), UserValidationError::EmptyFullName)]
    #[case::bad_email(|d: &mut RegistrationDraft| d.email = "ali.example.com".to_owned(), UserValidationError::InvalidEmail)]
    #[case::two_ats(|d: &mut RegistrationDraft| d.email = "a@b@c".to_owned(), UserValidationError::InvalidEmail)]
    #[case::empty_password(|d: &mut RegistrationDraft| d.password.clear(), UserValidationError::EmptyPassword)]
    #[case::admin(|d: &mut RegistrationDraft| d.role = "admin".to_owned(), UserValidationError::AdminRegistration)]
    #[case::blank_city(|d: &mut RegistrationDraft| d.city = Some(String::new()), UserValidationError::EmptyCity)]
    fn invalid_registrations_are_rejected(
        mut draft: RegistrationDraft,
        #[case] mutate: fn(&mut RegistrationDraft),
        #[case] expected: UserValidationError,
    ) {
        mutate(&mut draft);
        let err = Registration::try_from(draft).expect_err("invalid draft");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn unknown_blood_group_names_the_field(mut draft: RegistrationDraft) {
        draft.blood_group = Some("C+".to_owned());
        let err = Registration::try_from(draft).expect_err("invalid group");
        assert_eq!(err.field(), "blood_group");
    }

    #[rstest]
    fn profile_update_rejects_blank_city() {
        let update = ProfileUpdate {
            city: Some("  ".to_owned()),
            ..ProfileUpdate::default()
        };
        assert_eq!(update.validate(), Err(UserValidationError::EmptyCity));
    }

    #[rstest]
    fn default_profile_update_is_empty() {
        assert!(ProfileUpdate::default().is_empty());
    }
}
