//! ABO/Rh blood groups and donor-to-recipient compatibility.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Unicode minus sign, accepted in place of `-` on input.
const UNICODE_MINUS: char = '\u{2212}';

/// Error returned when a string is not one of the eight blood groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloodGroupParseError {
    value: String,
}

impl BloodGroupParseError {
    /// The rejected input, as supplied.
    #[must_use]
    pub fn value(&self) -> &str {
        self.value.as_str()
    }
}

impl fmt::Display for BloodGroupParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "blood group must be one of O+, O-, A+, A-, B+, B-, AB+, AB- (got {:?})",
            self.value
        )
    }
}

impl std::error::Error for BloodGroupParseError {}

/// One of the eight ABO/Rh blood groups.
///
/// Serialises as the conventional short form (`"O+"`, `"AB-"`).
///
/// # Examples
/// ```
/// use bloodbank_client::domain::BloodGroup;
///
/// let group: BloodGroup = "ab-".parse().unwrap();
/// assert_eq!(group, BloodGroup::AbNegative);
/// assert!(BloodGroup::ONegative.can_donate_to(group));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BloodGroup {
    /// O positive.
    OPositive,
    /// O negative.
    ONegative,
    /// A positive.
    APositive,
    /// A negative.
    ANegative,
    /// B positive.
    BPositive,
    /// B negative.
    BNegative,
    /// AB positive.
    AbPositive,
    /// AB negative.
    AbNegative,
}

impl BloodGroup {
    /// Every blood group, in the order the registration forms list them.
    pub const ALL: [Self; 8] = [
        Self::OPositive,
        Self::ONegative,
        Self::APositive,
        Self::ANegative,
        Self::BPositive,
        Self::BNegative,
        Self::AbPositive,
        Self::AbNegative,
    ];

    /// Short conventional label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OPositive => "O+",
            Self::ONegative => "O-",
            Self::APositive => "A+",
            Self::ANegative => "A-",
            Self::BPositive => "B+",
            Self::BNegative => "B-",
            Self::AbPositive => "AB+",
            Self::AbNegative => "AB-",
        }
    }

    /// Groups that can receive red cells from a donor of this group.
    #[must_use]
    pub fn recipients(self) -> &'static [Self] {
        match self {
            Self::ONegative => &Self::ALL,
            Self::OPositive => &[
                Self::OPositive,
                Self::APositive,
                Self::BPositive,
                Self::AbPositive,
            ],
            Self::ANegative => &[
                Self::ANegative,
                Self::APositive,
                Self::AbNegative,
                Self::AbPositive,
            ],
            Self::APositive => &[Self::APositive, Self::AbPositive],
            Self::BNegative => &[
                Self::BNegative,
                Self::BPositive,
                Self::AbNegative,
                Self::AbPositive,
            ],
            Self::BPositive => &[Self::BPositive, Self::AbPositive],
            Self::AbNegative => &[Self::AbNegative, Self::AbPositive],
            Self::AbPositive => &[Self::AbPositive],
        }
    }

    /// Whether a donor of this group can give to `recipient`.
    #[must_use]
    pub fn can_donate_to(self, recipient: Self) -> bool {
        self.recipients().contains(&recipient)
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodGroup {
    type Err = BloodGroupParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalised = raw
            .trim()
            .replace(UNICODE_MINUS, "-")
            .to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|group| group.as_str() == normalised)
            .ok_or_else(|| BloodGroupParseError {
                value: raw.to_owned(),
            })
    }
}

impl TryFrom<String> for BloodGroup {
    type Error = BloodGroupParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BloodGroup> for String {
    fn from(value: BloodGroup) -> Self {
        value.as_str().to_owned()
    }
}
