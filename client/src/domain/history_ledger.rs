//! Donation history ledger: log donations and read filtered history.

use std::sync::Arc;

use mockable::Clock;
use tracing::{debug, info};

use super::ports::BloodBankGateway;
use super::service_support::{map_gateway_error, today};
use super::{DonationDraft, DonationRecord, Error, History, HistoryFilter, NewDonation, Session};

/// Service for a user's donation and transfusion history.
#[derive(Clone)]
pub struct HistoryLedger<G> {
    gateway: Arc<G>,
    session: Arc<Session>,
    clock: Arc<dyn Clock>,
}

impl<G> HistoryLedger<G> {
    /// Create a new ledger.
    #[must_use]
    pub fn new(gateway: Arc<G>, session: Arc<Session>, clock: Arc<dyn Clock>) -> Self {
        Self {
            gateway,
            session,
            clock,
        }
    }
}

impl<G> HistoryLedger<G>
where
    G: BloodBankGateway,
{
    /// Validate and append a donation.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` naming the field for invalid drafts, then
    /// `Unauthenticated` when logged out. Neither case reaches the backend.
    pub async fn log_donation(&self, draft: DonationDraft) -> Result<DonationRecord, Error> {
        let donation = NewDonation::from_draft(draft, today(self.clock.as_ref()))
            .map_err(|err| Error::invalid_field(err.field(), err.to_string()))?;
        let token = self.session.require_token()?;
        let record = self
            .gateway
            .log_donation(&token, &donation)
            .await
            .map_err(map_gateway_error)?;
        info!(
            entry_id = record.id,
            units = record.units,
            date = %record.date,
            "donation logged"
        );
        Ok(record)
    }

    /// Fetch history matching `filter`, most recent first.
    ///
    /// The filter is forwarded to the backend and applied again locally, so
    /// the result always satisfies it.
    ///
    /// # Errors
    ///
    /// Fails fast with `Unauthenticated` when logged out.
    pub async fn get_history(&self, filter: &HistoryFilter) -> Result<History, Error> {
        let token = self.session.require_token()?;
        let fetched = self
            .gateway
            .history(&token, filter)
            .await
            .map_err(map_gateway_error)?;
        let fetched_len = fetched.len();
        let history = filter.apply(fetched);
        if history.len() != fetched_len {
            debug!(
                fetched = fetched_len,
                kept = history.len(),
                "dropped history entries outside the filter"
            );
        }
        Ok(history)
    }

    /// Build a filter from raw text and fetch the matching history.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for unknown entry types, malformed dates or
    /// a start date after the end date, before any backend call.
    pub async fn get_history_from_strs(
        &self,
        entry_type: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<History, Error> {
        let filter = HistoryFilter::from_strs(entry_type, start_date, end_date)
            .map_err(|err| Error::invalid_field(err.field(), err.to_string()))?;
        self.get_history(&filter).await
    }
}

#[cfg(test)]
#[path = "history_ledger_tests.rs"]
mod tests;
