//! Shared fixtures for service unit tests.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;

use super::ports::InMemoryTokenStore;
use super::{AccessToken, BloodGroup, Donor, EmailAddress, Session};

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

/// Noon on 2024-03-01 UTC, so the local date agrees in any sane timezone.
pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: Utc
            .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
            .single()
            .expect("valid fixture timestamp"),
    })
}

pub(crate) fn fixture_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid fixture date")
}

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(crate) fn token() -> AccessToken {
    AccessToken::new("fixture-token").expect("fixture token")
}

pub(crate) fn logged_in_session() -> Arc<Session> {
    Arc::new(Session::restore(Arc::new(InMemoryTokenStore::with_token(
        token(),
    ))))
}

pub(crate) fn logged_out_session() -> Arc<Session> {
    Arc::new(Session::new(Arc::new(InMemoryTokenStore::default())))
}

pub(crate) fn donor(id: i64, name: &str, group: BloodGroup, city: &str) -> Donor {
    Donor {
        id,
        full_name: name.to_owned(),
        email: EmailAddress::new(&format!("donor{id}@example.com")).expect("fixture email"),
        blood_group: group,
        city: city.to_owned(),
        age: 30,
        last_donation_date: None,
    }
}
