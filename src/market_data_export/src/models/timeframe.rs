use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeFrameError {
    #[error("Invalid amount {amount}: {message}")]
    InvalidAmount { amount: u32, message: String },
}

/// Bar interval in whole days.
///
/// Construction is unchecked; the Alpaca bars endpoint only accepts a
/// one-day bar, which `validate` enforces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeFrame {
    pub days: u32,
}

impl TimeFrame {
    /// One calendar day, the only resolution the export pipeline requests.
    pub fn day() -> Self {
        Self { days: 1 }
    }

    pub fn validate(&self) -> Result<(), TimeFrameError> {
        if self.days != 1 {
            return Err(TimeFrameError::InvalidAmount {
                amount: self.days,
                message: "Day units can only be used with amount 1".into(),
            });
        }
        Ok(())
    }
}

/// Renders the interval the way the Alpaca `timeframe` query parameter expects
/// it (`1Day`).
impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Day", self.days)
    }
}
