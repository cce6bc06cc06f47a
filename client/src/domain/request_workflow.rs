//! Blood request workflow: validated creation, listing and matching.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use super::ports::BloodBankGateway;
use super::service_support::{map_gateway_error, today};
use super::{
    BloodRequest, Donor, Error, NewBloodRequest, RequestDraft, RequestId, RequestStatus,
    SearchQuery, Session, filter_requests, find_matches, sort_for_display,
};

/// Service driving a recipient's requests through their lifecycle.
#[derive(Clone)]
pub struct RequestWorkflow<G> {
    gateway: Arc<G>,
    session: Arc<Session>,
    clock: Arc<dyn Clock>,
}

impl<G> RequestWorkflow<G> {
    /// Create a new workflow.
    #[must_use]
    pub fn new(gateway: Arc<G>, session: Arc<Session>, clock: Arc<dyn Clock>) -> Self {
        Self {
            gateway,
            session,
            clock,
        }
    }

    /// Donors in `donors` who can serve `request` today.
    #[must_use]
    pub fn local_matches(&self, request: &BloodRequest, donors: &[Donor]) -> Vec<Donor> {
        find_matches(request, donors, today(self.clock.as_ref()))
    }

    /// Move `request` to `next` if the lifecycle allows it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for disallowed transitions.
    pub fn transition(
        &self,
        request: &BloodRequest,
        next: RequestStatus,
    ) -> Result<BloodRequest, Error> {
        request
            .transition(next)
            .map_err(|err| Error::invalid_field(err.field(), err.to_string()))
    }
}

impl<G> RequestWorkflow<G>
where
    G: BloodBankGateway,
{
    /// Validate and post a new request.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` naming the field for invalid drafts, even
    /// when logged out, and `Unauthenticated` for a valid draft without a
    /// session. Neither case reaches the backend.
    pub async fn create_request(&self, draft: RequestDraft) -> Result<BloodRequest, Error> {
        let request = NewBloodRequest::try_from(draft)
            .map_err(|err| Error::invalid_field(err.field(), err.to_string()))?;
        let token = self.session.require_token()?;
        let created = self
            .gateway
            .create_request(&token, &request)
            .await
            .map_err(map_gateway_error)?;
        info!(
            request_id = %created.id,
            group = %created.blood_group,
            urgency = %created.urgency,
            "blood request created"
        );
        Ok(created)
    }

    /// List requests, optionally filtered, in display order.
    ///
    /// # Errors
    ///
    /// Fails fast with `Unauthenticated` when logged out.
    pub async fn list_requests(
        &self,
        query: Option<&SearchQuery>,
    ) -> Result<Vec<BloodRequest>, Error> {
        let token = self.session.require_token()?;
        let all = self
            .gateway
            .list_requests(&token)
            .await
            .map_err(map_gateway_error)?;
        let mut requests = match query {
            Some(query) => filter_requests(&all, query),
            None => all,
        };
        sort_for_display(&mut requests);
        Ok(requests)
    }

    /// Ask the backend for donors matching a request.
    ///
    /// # Errors
    ///
    /// Fails fast with `Unauthenticated` when logged out.
    pub async fn find_matches(&self, request_id: RequestId) -> Result<Vec<Donor>, Error> {
        let token = self.session.require_token()?;
        self.gateway
            .request_matches(&token, request_id)
            .await
            .map_err(map_gateway_error)
    }
}

#[cfg(test)]
#[path = "request_workflow_tests.rs"]
mod tests;
