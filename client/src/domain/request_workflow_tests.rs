//! Tests for the request workflow.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{GatewayError, MockBloodBankGateway};
use crate::domain::test_support::{
    date, donor, fixture_clock, logged_in_session, logged_out_session, token,
};
use crate::domain::{BloodGroup, ErrorCode, Urgency, UserId};

fn stored(id: i64, request: &NewBloodRequest) -> BloodRequest {
    BloodRequest {
        id: RequestId::new(id),
        requester_id: UserId::new(3),
        patient_name: request.patient_name.clone(),
        blood_group: request.blood_group,
        city: request.city.clone(),
        urgency: request.urgency,
        status: RequestStatus::Open,
        created_at: Some(date(2024, 3, 1)),
    }
}

fn listed(id: i64, patient: &str, urgency: Urgency, created: u32) -> BloodRequest {
    BloodRequest {
        id: RequestId::new(id),
        requester_id: UserId::new(3),
        patient_name: Some(patient.to_owned()),
        blood_group: BloodGroup::BNegative,
        city: "Lahore".to_owned(),
        urgency,
        status: RequestStatus::Open,
        created_at: Some(date(2024, 2, created)),
    }
}

#[fixture]
fn draft() -> RequestDraft {
    RequestDraft {
        blood_group: "A+".to_owned(),
        city: "Lahore".to_owned(),
        urgency: "high".to_owned(),
        patient_name: Some("Ayesha".to_owned()),
    }
}

#[rstest]
#[tokio::test]
async fn create_request_returns_backend_record(draft: RequestDraft) {
    let mut gateway = MockBloodBankGateway::new();
    gateway
        .expect_create_request()
        .withf(|sent, request| *sent == token() && request.urgency == Urgency::High)
        .times(1)
        .return_once(|_, request| Ok(stored(21, request)));
    let workflow = RequestWorkflow::new(Arc::new(gateway), logged_in_session(), fixture_clock());

    let created = workflow.create_request(draft).await.expect("created");

    assert_eq!(created.id, RequestId::new(21));
    assert_eq!(created.status, RequestStatus::Open);
    assert_eq!(created.blood_group, BloodGroup::APositive);
}

#[rstest]
#[case::blank_city(|d: &mut RequestDraft| d.city = "   ".to_owned(), "city")]
#[case::legacy_urgent(|d: &mut RequestDraft| d.urgency = "urgent".to_owned(), "urgency")]
#[case::unknown_group(|d: &mut RequestDraft| d.blood_group = "X+".to_owned(), "blood_group")]
#[tokio::test]
async fn invalid_drafts_fail_before_network(
    mut draft: RequestDraft,
    #[case] mutate: fn(&mut RequestDraft),
    #[case] field: &str,
) {
    mutate(&mut draft);
    let mut gateway = MockBloodBankGateway::new();
    gateway.expect_create_request().times(0);
    let workflow = RequestWorkflow::new(Arc::new(gateway), logged_in_session(), fixture_clock());

    let err = workflow.create_request(draft).await.expect_err("invalid");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.details(), Some(&serde_json::json!({ "field": field })));
}

#[rstest]
#[tokio::test]
async fn logged_out_create_short_circuits(draft: RequestDraft) {
    let mut gateway = MockBloodBankGateway::new();
    gateway.expect_create_request().times(0);
    let workflow = RequestWorkflow::new(Arc::new(gateway), logged_out_session(), fixture_clock());

    let err = workflow.create_request(draft).await.expect_err("logged out");
    assert_eq!(err.code(), ErrorCode::Unauthenticated);
}

#[rstest]
#[tokio::test]
async fn invalid_urgency_is_reported_even_when_logged_out(mut draft: RequestDraft) {
    draft.urgency = "urgent".to_owned();
    let mut gateway = MockBloodBankGateway::new();
    gateway.expect_create_request().times(0);
    let workflow = RequestWorkflow::new(Arc::new(gateway), logged_out_session(), fixture_clock());

    let err = workflow.create_request(draft).await.expect_err("invalid urgency");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.details(), Some(&serde_json::json!({ "field": "urgency" })));
}

#[rstest]
#[tokio::test]
async fn list_filters_and_orders_by_urgency() {
    let mut gateway = MockBloodBankGateway::new();
    gateway.expect_list_requests().times(1).return_once(|_| {
        Ok(vec![
            listed(1, "Ayesha Noor", Urgency::Normal, 1),
            listed(2, "Hamza Ali", Urgency::Critical, 5),
            listed(3, "Ayesha Tariq", Urgency::Critical, 2),
        ])
    });
    let workflow = RequestWorkflow::new(Arc::new(gateway), logged_in_session(), fixture_clock());

    let requests = workflow
        .list_requests(Some(&SearchQuery::new("AYESHA")))
        .await
        .expect("listed");

    let ids: Vec<i64> = requests.iter().map(|r| r.id.get()).collect();
    assert_eq!(ids, vec![3, 1]);
}

#[rstest]
#[tokio::test]
async fn backend_rejection_surfaces_detail(draft: RequestDraft) {
    let mut gateway = MockBloodBankGateway::new();
    gateway
        .expect_create_request()
        .times(1)
        .return_once(|_, _| Err(GatewayError::rejected(422_u16, "field required")));
    let workflow = RequestWorkflow::new(Arc::new(gateway), logged_in_session(), fixture_clock());

    let err = workflow.create_request(draft).await.expect_err("rejected");
    assert_eq!(err.status(), Some(422));
    assert_eq!(err.message(), "field required");
}

#[rstest]
#[tokio::test]
async fn find_matches_forwards_request_id() {
    let mut gateway = MockBloodBankGateway::new();
    gateway
        .expect_request_matches()
        .withf(|_, id| *id == RequestId::new(9))
        .times(1)
        .return_once(|_, _| Ok(vec![donor(1, "Ali Raza", BloodGroup::ONegative, "Lahore")]));
    let workflow = RequestWorkflow::new(Arc::new(gateway), logged_in_session(), fixture_clock());

    let matches = workflow.find_matches(RequestId::new(9)).await.expect("matches");
    assert_eq!(matches.len(), 1);
}

#[rstest]
fn local_matches_use_the_injected_clock() {
    let workflow = RequestWorkflow::new(
        Arc::new(MockBloodBankGateway::new()),
        logged_out_session(),
        fixture_clock(),
    );
    let mut recent = donor(1, "Recent", BloodGroup::ONegative, "Lahore");
    recent.last_donation_date = Some(date(2024, 2, 1));
    let rested = donor(2, "Rested", BloodGroup::ONegative, "lahore");
    let request = listed(5, "Hamza", Urgency::High, 10);

    let matches = workflow.local_matches(&request, &[recent, rested]);
    let names: Vec<&str> = matches.iter().map(|d| d.full_name.as_str()).collect();
    assert_eq!(names, vec!["Rested"]);
}

#[rstest]
fn closed_requests_cannot_reopen() {
    let workflow = RequestWorkflow::new(
        Arc::new(MockBloodBankGateway::new()),
        logged_out_session(),
        fixture_clock(),
    );
    let mut request = listed(5, "Hamza", Urgency::High, 10);
    request = workflow
        .transition(&request, RequestStatus::Closed)
        .expect("open to closed");
    let err = workflow
        .transition(&request, RequestStatus::Open)
        .expect_err("closed is final");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}
