//! Source of "today" for computing the lookback range.

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;

pub trait MarketClock: Send + Sync {
    /// The current calendar date.
    fn today(&self) -> NaiveDate;
}

/// Wall clock read in the exchange's time zone.
#[derive(Debug, Clone, Copy)]
pub struct ExchangeClock {
    tz: Tz,
}

impl ExchangeClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl MarketClock for ExchangeClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }
}

/// A clock pinned to one date, for reproducible runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl MarketClock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
