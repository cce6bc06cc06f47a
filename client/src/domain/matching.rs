//! Local donor matching for a blood request.

use chrono::NaiveDate;

use super::{BloodRequest, Donor};

fn same_city(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

/// Donors who can give to `request` today.
///
/// A donor matches when their group can donate to the requested group, they
/// live in the request's city, and they are past the donation interval.
/// Input order is preserved.
#[must_use]
pub fn find_matches(request: &BloodRequest, donors: &[Donor], today: NaiveDate) -> Vec<Donor> {
    donors
        .iter()
        .filter(|donor| donor.blood_group.can_donate_to(request.blood_group))
        .filter(|donor| same_city(&donor.city, &request.city))
        .filter(|donor| donor.is_eligible_on(today))
        .cloned()
        .collect()
}
