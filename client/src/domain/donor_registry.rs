//! Donor directory view-model.
//!
//! Holds the last fetched directory snapshot so filtering stays a pure,
//! network-free operation.

use std::sync::{Arc, PoisonError, RwLock};

use mockable::Clock;
use tracing::{debug, info};

use super::ports::BloodBankGateway;
use super::service_support::{map_gateway_error, today};
use super::{
    DonorProfile, DonorProfileDraft, Donor, Error, NewDonorProfile, SearchQuery, Session,
    filter_donors,
};

/// Fetches, caches and filters the donor directory.
pub struct DonorRegistry<G> {
    gateway: Arc<G>,
    session: Arc<Session>,
    clock: Arc<dyn Clock>,
    snapshot: RwLock<Vec<Donor>>,
}

impl<G> DonorRegistry<G> {
    /// Create a registry with an empty snapshot.
    #[must_use]
    pub fn new(gateway: Arc<G>, session: Arc<Session>, clock: Arc<dyn Clock>) -> Self {
        Self {
            gateway,
            session,
            clock,
            snapshot: RwLock::new(Vec::new()),
        }
    }

    /// Donors from the last refresh matching `query`. Blank queries return all.
    #[must_use]
    pub fn filter(&self, query: &SearchQuery) -> Vec<Donor> {
        let snapshot = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        filter_donors(&snapshot, query)
    }

    /// Copy of the last fetched directory.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Donor> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<G> DonorRegistry<G>
where
    G: BloodBankGateway,
{
    /// Fetch the directory and replace the snapshot.
    ///
    /// # Errors
    ///
    /// Fails fast with `Unauthenticated` when logged out; backend failures
    /// leave the previous snapshot in place.
    pub async fn refresh(&self) -> Result<Vec<Donor>, Error> {
        let token = self.session.require_token()?;
        let donors = self
            .gateway
            .list_donors(&token)
            .await
            .map_err(map_gateway_error)?;
        debug!(count = donors.len(), "donor directory refreshed");
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = donors.clone();
        Ok(donors)
    }

    /// Validate and submit the caller's donor profile.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` naming the field for invalid drafts, before
    /// any backend call.
    pub async fn create_profile(&self, draft: DonorProfileDraft) -> Result<DonorProfile, Error> {
        let profile = NewDonorProfile::from_draft(draft, today(self.clock.as_ref()))
            .map_err(|err| Error::invalid_field(err.field(), err.to_string()))?;
        let token = self.session.require_token()?;
        let stored = self
            .gateway
            .upsert_donor_profile(&token, &profile)
            .await
            .map_err(map_gateway_error)?;
        info!(profile_id = stored.id, group = %stored.blood_group, "donor profile saved");
        Ok(stored)
    }
}
