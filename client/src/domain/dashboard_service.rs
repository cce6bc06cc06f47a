//! Dashboard use-case: fetch the snapshots and hand them to the aggregator.

use std::sync::Arc;

use tracing::debug;

use super::ports::BloodBankGateway;
use super::service_support::map_gateway_error;
use super::{
    ActivityEvent, ActivityKind, BloodRequest, DashboardAggregator, DashboardSnapshot,
    DashboardSummary, Error, Session, User,
};

const UNKNOWN_ACTOR: &str = "Unknown";

fn request_event(request: &BloodRequest) -> Option<ActivityEvent> {
    request.created_at.map(|occurred_on| ActivityEvent {
        kind: ActivityKind::Request,
        actor: request
            .patient_name
            .clone()
            .unwrap_or_else(|| UNKNOWN_ACTOR.to_owned()),
        blood_group: request.blood_group,
        location: request.city.clone(),
        occurred_on,
    })
}

/// Service producing the dashboard summary.
#[derive(Clone)]
pub struct DashboardService<G> {
    gateway: Arc<G>,
    session: Arc<Session>,
    aggregator: DashboardAggregator,
}

impl<G> DashboardService<G> {
    /// Create a new dashboard service.
    #[must_use]
    pub fn new(gateway: Arc<G>, session: Arc<Session>, aggregator: DashboardAggregator) -> Self {
        Self {
            gateway,
            session,
            aggregator,
        }
    }
}

impl<G> DashboardService<G>
where
    G: BloodBankGateway,
{
    /// Fetch donors, requests and statistics concurrently and summarise them.
    ///
    /// # Errors
    ///
    /// Fails fast with `Unauthenticated` when logged out; otherwise the first
    /// backend failure is returned.
    pub async fn summary(&self) -> Result<DashboardSummary, Error> {
        let token = self.session.require_token()?;
        let (donors, requests, stats) = tokio::try_join!(
            self.gateway.list_donors(&token),
            self.gateway.list_requests(&token),
            self.gateway.dashboard_stats(&token),
        )
        .map_err(map_gateway_error)?;

        let mut activity = stats.recent_activity;
        activity.extend(requests.iter().filter_map(request_event));
        let snapshot = DashboardSnapshot {
            users: donors.into_iter().map(User::from).collect(),
            requests,
            stock_levels: stats.stock_levels,
            activity,
            recent_donations_count: stats.recent_donations_count,
        };
        debug!(
            users = snapshot.users.len(),
            requests = snapshot.requests.len(),
            events = snapshot.activity.len(),
            "dashboard snapshot fetched"
        );
        Ok(self.aggregator.summarise(&snapshot))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for dashboard fetching.
    use super::*;
    use crate::domain::ports::{GatewayError, MockBloodBankGateway};
    use crate::domain::test_support::{date, donor, logged_in_session, logged_out_session};
    use crate::domain::{
        BloodGroup, DashboardStats, ErrorCode, RequestId, RequestStatus, StockLevel, Urgency,
        UserId,
    };
    use rstest::rstest;

    fn request(id: i64, status: RequestStatus, day: u32) -> BloodRequest {
        BloodRequest {
            id: RequestId::new(id),
            requester_id: UserId::new(5),
            patient_name: (status == RequestStatus::Closed).then(|| format!("Patient {id}")),
            blood_group: BloodGroup::AbNegative,
            city: "Quetta".to_owned(),
            urgency: Urgency::Critical,
            status,
            created_at: Some(date(2024, 2, day)),
        }
    }

    fn stats() -> DashboardStats {
        DashboardStats {
            total_donors: 2,
            pending_requests: 1,
            recent_donations_count: 3,
            stock_levels: vec![StockLevel {
                group: BloodGroup::OPositive,
                units: 2,
            }],
            recent_activity: vec![ActivityEvent {
                kind: ActivityKind::Donation,
                actor: "Ali Raza".to_owned(),
                blood_group: BloodGroup::OPositive,
                location: "Mayo Hospital".to_owned(),
                occurred_on: date(2024, 2, 20),
            }],
        }
    }

    #[rstest]
    #[tokio::test]
    async fn summary_merges_donations_and_requests() {
        let mut gateway = MockBloodBankGateway::new();
        gateway.expect_list_donors().times(1).return_once(|_| {
            Ok(vec![
                donor(1, "Ali Raza", BloodGroup::OPositive, "Lahore"),
                donor(2, "Sara Khan", BloodGroup::ANegative, "Karachi"),
            ])
        });
        gateway.expect_list_requests().times(1).return_once(|_| {
            Ok(vec![
                request(1, RequestStatus::Open, 25),
                request(2, RequestStatus::Closed, 10),
            ])
        });
        gateway
            .expect_dashboard_stats()
            .times(1)
            .return_once(|_| Ok(stats()));
        let service = DashboardService::new(
            Arc::new(gateway),
            logged_in_session(),
            DashboardAggregator::default(),
        );

        let summary = service.summary().await.expect("summary");

        assert_eq!(summary.total_donors, 2);
        assert_eq!(summary.pending_requests, 1);
        assert_eq!(summary.recent_donations_count, 3);
        let actors: Vec<&str> = summary
            .recent_activity
            .iter()
            .map(|e| e.actor.as_str())
            .collect();
        assert_eq!(actors, vec!["Unknown", "Ali Raza", "Patient 2"]);
    }

    #[rstest]
    #[tokio::test]
    async fn any_failed_fetch_fails_the_summary() {
        let mut gateway = MockBloodBankGateway::new();
        gateway.expect_list_donors().returning(|_| Ok(Vec::new()));
        gateway.expect_list_requests().returning(|_| Ok(Vec::new()));
        gateway
            .expect_dashboard_stats()
            .returning(|_| Err(GatewayError::rejected(500_u16, "request failed")));
        let service = DashboardService::new(
            Arc::new(gateway),
            logged_in_session(),
            DashboardAggregator::default(),
        );

        let err = service.summary().await.expect_err("stats failed");
        assert_eq!(err.code(), ErrorCode::Api);
        assert_eq!(err.status(), Some(500));
    }

    #[rstest]
    #[tokio::test]
    async fn summary_requires_login() {
        let mut gateway = MockBloodBankGateway::new();
        gateway.expect_dashboard_stats().times(0);
        let service = DashboardService::new(
            Arc::new(gateway),
            logged_out_session(),
            DashboardAggregator::default(),
        );

        let err = service.summary().await.expect_err("logged out");
        assert_eq!(err.code(), ErrorCode::Unauthenticated);
    }
}
