//! Quote numbers: `{prefix}-{YYYYMMDD}-{NNNNN}`, a per-day sequence.
//!
//! ```text
//! QT-20260101-00001
//! QT-20260101-00002
//! QT-20260102-00001   ◄── first number after the date changes
//! ```
//!
//! The date check, optional reset and increment happen under one lock, so
//! concurrent callers never share a number and never see a sequence value
//! paired with the wrong date.

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::{Arc, Mutex, PoisonError};

// =============================================================================
// Clock
// =============================================================================

/// Source of "now" for numbering and expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        ManualClock {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// Generator
// =============================================================================

struct Sequence {
    date: Option<NaiveDate>,
    last: u32,
}

pub struct QuoteNumberGenerator {
    prefix: String,
    clock: Arc<dyn Clock>,
    sequence: Mutex<Sequence>,
}

impl QuoteNumberGenerator {
    pub fn new(prefix: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        QuoteNumberGenerator {
            prefix: prefix.into(),
            clock,
            sequence: Mutex::new(Sequence {
                date: None,
                last: 0,
            }),
        }
    }

    /// Issues the next number for today.
    pub fn next_number(&self) -> String {
        let mut seq = self.sequence.lock().unwrap_or_else(PoisonError::into_inner);
        let today = self.clock.today();
        if seq.date != Some(today) {
            seq.date = Some(today);
            seq.last = 0;
        }
        seq.last += 1;
        format!("{}-{}-{:05}", self.prefix, today.format("%Y%m%d"), seq.last)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for QuoteNumberGenerator {
    fn default() -> Self {
        Self::new("QT", Arc::new(SystemClock))
    }
}
