//! Dashboard aggregation over fetched snapshots.
//!
//! Everything here is pure: the aggregator borrows a snapshot, never mutates
//! it, and yields the same summary for the same input.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BloodGroup, BloodRequest, RequestStatus, Role, User};

/// Default number of activity events shown on the dashboard.
pub const DEFAULT_ACTIVITY_PAGE_SIZE: usize = 5;

/// Units available for one blood group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    /// Blood group.
    pub group: BloodGroup,
    /// Units on hand.
    pub units: u64,
}

/// What happened in an activity event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    /// A donor gave blood.
    Donation,
    /// A recipient posted a request.
    Request,
}

/// One row of the recent activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Event kind.
    pub kind: ActivityKind,
    /// Donor or patient name.
    pub actor: String,
    /// Blood group involved.
    pub blood_group: BloodGroup,
    /// Hospital or city.
    pub location: String,
    /// Day the event happened.
    pub occurred_on: NaiveDate,
}

/// Statistics reported by the backend stats endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardStats {
    /// Donor profiles on record.
    pub total_donors: u64,
    /// Requests still waiting.
    pub pending_requests: u64,
    /// Donations logged over the last thirty days.
    pub recent_donations_count: u64,
    /// Capacity per group.
    pub stock_levels: Vec<StockLevel>,
    /// Latest donations, newest first.
    pub recent_activity: Vec<ActivityEvent>,
}

/// Inputs to [`DashboardAggregator::summarise`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardSnapshot {
    /// Known users.
    pub users: Vec<User>,
    /// Known requests.
    pub requests: Vec<BloodRequest>,
    /// Per-group capacity figures; a group may appear more than once.
    pub stock_levels: Vec<StockLevel>,
    /// Unordered activity events.
    pub activity: Vec<ActivityEvent>,
    /// Backend count of donations over the last thirty days.
    pub recent_donations_count: u64,
}

/// Computed dashboard figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    /// Users with the donor role.
    pub total_donors: usize,
    /// Requests with status open.
    pub pending_requests: usize,
    /// Donations over the last thirty days, as reported by the backend.
    pub recent_donations_count: u64,
    /// Units per group in canonical group order; absent groups are omitted.
    pub available_units: Vec<StockLevel>,
    /// Newest events first, at most one page.
    pub recent_activity: Vec<ActivityEvent>,
}

/// Folds a snapshot into dashboard figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardAggregator {
    page_size: usize,
}

impl Default for DashboardAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVITY_PAGE_SIZE)
    }
}

impl DashboardAggregator {
    /// Create an aggregator that keeps `page_size` activity events.
    #[must_use]
    pub const fn new(page_size: usize) -> Self {
        Self { page_size }
    }

    /// Activity feed length.
    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    /// Compute the summary for `snapshot`.
    ///
    /// # Examples
    /// ```
    /// use bloodbank_client::domain::{DashboardAggregator, DashboardSnapshot};
    ///
    /// let summary = DashboardAggregator::default().summarise(&DashboardSnapshot::default());
    /// assert_eq!(summary.total_donors, 0);
    /// assert!(summary.recent_activity.is_empty());
    /// ```
    #[must_use]
    pub fn summarise(&self, snapshot: &DashboardSnapshot) -> DashboardSummary {
        DashboardSummary {
            total_donors: snapshot
                .users
                .iter()
                .filter(|user| user.role == Role::Donor)
                .count(),
            pending_requests: snapshot
                .requests
                .iter()
                .filter(|request| request.status == RequestStatus::Open)
                .count(),
            recent_donations_count: snapshot.recent_donations_count,
            available_units: available_units(&snapshot.stock_levels),
            recent_activity: self.recent_activity(&snapshot.activity),
        }
    }

    fn recent_activity(&self, events: &[ActivityEvent]) -> Vec<ActivityEvent> {
        let mut ordered = events.to_vec();
        // `sort_by` is stable, so same-day events keep their input order.
        ordered.sort_by(|a, b| b.occurred_on.cmp(&a.occurred_on));
        ordered.truncate(self.page_size);
        ordered
    }
}

fn available_units(levels: &[StockLevel]) -> Vec<StockLevel> {
    BloodGroup::ALL
        .into_iter()
        .filter_map(|group| {
            let mut matching = levels.iter().filter(|level| level.group == group).peekable();
            matching.peek()?;
            Some(StockLevel {
                group,
                units: matching.map(|level| level.units).sum(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    //! Regression coverage for dashboard aggregation.
    use super::*;
    use crate::domain::{EmailAddress, RequestId, Urgency, UserId};
    use rstest::{fixture, rstest};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn user(id: i64, role: Role) -> User {
        User {
            id: UserId::new(id),
            full_name: format!("User {id}"),
            email: EmailAddress::new("user@example.com").expect("email"),
            role,
            phone_number: None,
            age: None,
            blood_group: None,
            city: None,
            last_donation_date: None,
        }
    }

    fn request(id: i64, status: RequestStatus) -> BloodRequest {
        BloodRequest {
            id: RequestId::new(id),
            requester_id: UserId::new(1),
            patient_name: None,
            blood_group: BloodGroup::BPositive,
            city: "Lahore".to_owned(),
            urgency: Urgency::Normal,
            status,
            created_at: None,
        }
    }

    fn event(actor: &str, occurred_on: NaiveDate) -> ActivityEvent {
        ActivityEvent {
            kind: ActivityKind::Donation,
            actor: actor.to_owned(),
            blood_group: BloodGroup::OPositive,
            location: "Mayo Hospital".to_owned(),
            occurred_on,
        }
    }

    #[fixture]
    fn snapshot() -> DashboardSnapshot {
        DashboardSnapshot {
            users: vec![
                user(1, Role::Donor),
                user(2, Role::Recipient),
                user(3, Role::Donor),
                user(4, Role::Admin),
            ],
            requests: vec![
                request(1, RequestStatus::Open),
                request(2, RequestStatus::Matched),
                request(3, RequestStatus::Open),
                request(4, RequestStatus::Closed),
            ],
            stock_levels: vec![
                StockLevel { group: BloodGroup::APositive, units: 3 },
                StockLevel { group: BloodGroup::OPositive, units: 2 },
                StockLevel { group: BloodGroup::APositive, units: 4 },
            ],
            activity: vec![
                event("a", date(2024, 1, 1)),
                event("b", date(2024, 1, 3)),
                event("c", date(2024, 1, 2)),
                event("d", date(2024, 1, 3)),
                event("e", date(2024, 1, 4)),
                event("f", date(2023, 12, 30)),
                event("g", date(2024, 1, 2)),
            ],
            recent_donations_count: 6,
        }
    }

    #[rstest]
    fn counts_donors_and_open_requests(snapshot: DashboardSnapshot) {
        let summary = DashboardAggregator::default().summarise(&snapshot);
        assert_eq!(summary.total_donors, 2);
        assert_eq!(summary.pending_requests, 2);
        assert_eq!(summary.recent_donations_count, 6);
    }

    #[rstest]
    fn sums_duplicate_groups_in_canonical_order(snapshot: DashboardSnapshot) {
        let summary = DashboardAggregator::default().summarise(&snapshot);
        assert_eq!(
            summary.available_units,
            vec![
                StockLevel { group: BloodGroup::OPositive, units: 2 },
                StockLevel { group: BloodGroup::APositive, units: 7 },
            ]
        );
    }

    #[rstest]
    fn activity_is_newest_first_stable_and_truncated(snapshot: DashboardSnapshot) {
        let summary = DashboardAggregator::default().summarise(&snapshot);
        let actors: Vec<&str> = summary
            .recent_activity
            .iter()
            .map(|e| e.actor.as_str())
            .collect();
        assert_eq!(actors, vec!["e", "b", "d", "c", "g"]);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(3, 3)]
    #[case(50, 7)]
    fn page_size_bounds_the_feed(
        snapshot: DashboardSnapshot,
        #[case] page_size: usize,
        #[case] expected: usize,
    ) {
        let summary = DashboardAggregator::new(page_size).summarise(&snapshot);
        assert_eq!(summary.recent_activity.len(), expected);
    }

    #[rstest]
    fn summarising_is_idempotent_and_leaves_input_alone(snapshot: DashboardSnapshot) {
        let before = snapshot.clone();
        let aggregator = DashboardAggregator::default();
        let first = aggregator.summarise(&snapshot);
        let second = aggregator.summarise(&snapshot);
        assert_eq!(first, second);
        assert_eq!(snapshot, before);
    }
}
