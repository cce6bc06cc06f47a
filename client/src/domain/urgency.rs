//! Urgency levels attached to blood requests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned for urgency values outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrgencyParseError {
    value: String,
}

impl fmt::Display for UrgencyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "urgency must be one of normal, high, critical (got {:?})",
            self.value
        )
    }
}

impl std::error::Error for UrgencyParseError {}

/// Priority tag on a blood request.
///
/// Input is accepted in any ASCII case; the canonical form is lowercase.
/// Ordering runs from least to most urgent.
///
/// # Examples
/// ```
/// use bloodbank_client::domain::Urgency;
///
/// assert_eq!("Critical".parse::<Urgency>().unwrap(), Urgency::Critical);
/// assert!("urgent".parse::<Urgency>().is_err());
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum Urgency {
    /// Routine request.
    #[default]
    Normal,
    /// Needed soon.
    High,
    /// Needed immediately.
    Critical,
}

impl Urgency {
    /// Canonical lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = UrgencyParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(UrgencyParseError {
                value: raw.to_owned(),
            }),
        }
    }
}

impl TryFrom<String> for Urgency {
    type Error = UrgencyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Urgency> for String {
    fn from(value: Urgency) -> Self {
        value.as_str().to_owned()
    }
}
