use std::sync::{Mutex, MutexGuard};

use anyhow::Result;
use chrono::{DateTime, Duration, Local};

use crate::model::alert::AlertRecord;
use crate::model::signal::SignalKind;

pub const DEFAULT_CAPACITY: usize = 100;
pub const DEFAULT_DEDUP_LOOKBACK: usize = 5;
pub const DEFAULT_DEDUP_WINDOW_SECS: i64 = 300;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryLimits {
    /// Maximum records kept; the oldest are dropped first.
    pub capacity: usize,
    /// How many of the newest records are scanned for duplicates.
    pub dedup_lookback: usize,
    /// Same symbol and kind closer than this are duplicates.
    pub dedup_window: Duration,
}

impl Default for HistoryLimits {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            dedup_lookback: DEFAULT_DEDUP_LOOKBACK,
            dedup_window: Duration::seconds(DEFAULT_DEDUP_WINDOW_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Accepted(AlertRecord),
    /// Suppressed as a repeat of a recent alert.
    Rejected,
}

impl RecordOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

#[derive(Debug, Default)]
struct HistoryInner {
    /// Newest first.
    records: Vec<AlertRecord>,
    alerts_today: usize,
}

/// Bounded, deduplicating alert log shared between the monitor and readers.
///
/// All mutation happens under one lock, so a reader never sees a record
/// inserted but not yet truncated, or a count that disagrees with the list.
#[derive(Debug, Default)]
pub struct AlertHistory {
    limits: HistoryLimits,
    inner: Mutex<HistoryInner>,
}

impl AlertHistory {
    pub fn new(limits: HistoryLimits) -> Self {
        assert!(limits.capacity > 0, "alert history capacity must be > 0");
        Self {
            limits,
            inner: Mutex::new(HistoryInner::default()),
        }
    }

    pub fn limits(&self) -> HistoryLimits {
        self.limits
    }

    fn lock(&self) -> Result<MutexGuard<'_, HistoryInner>> {
        self.inner
            .lock()
            .map_err(|_| anyhow::anyhow!("alert history lock poisoned"))
    }

    pub fn record(
        &self,
        symbol: &str,
        kind: SignalKind,
        price: f64,
        now: DateTime<Local>,
    ) -> Result<RecordOutcome> {
        let mut guard = self.lock()?;

        let duplicate = guard
            .records
            .iter()
            .take(self.limits.dedup_lookback)
            .any(|existing| {
                existing.symbol == symbol
                    && existing.kind == kind
                    && (now - existing.timestamp).abs() < self.limits.dedup_window
            });
        if duplicate {
            tracing::debug!(symbol, signal = %kind, "Duplicate alert suppressed");
            return Ok(RecordOutcome::Rejected);
        }

        let record = AlertRecord::new(symbol, kind, price, now);
        guard.records.insert(0, record.clone());
        guard.records.truncate(self.limits.capacity);
        guard.alerts_today = count_on_date(&guard.records, now);
        Ok(RecordOutcome::Accepted(record))
    }

    /// Newest-first copy of the history.
    pub fn snapshot(&self) -> Result<Vec<AlertRecord>> {
        Ok(self.lock()?.records.clone())
    }

    pub fn alerts_today(&self) -> Result<usize> {
        Ok(self.lock()?.alerts_today)
    }

    /// Records newer than `now - window`, newest first, at most `limit`.
    pub fn recent(
        &self,
        now: DateTime<Local>,
        window: Duration,
        limit: usize,
    ) -> Result<Vec<AlertRecord>> {
        let cutoff = now - window;
        let guard = self.lock()?;
        Ok(guard
            .records
            .iter()
            .filter(|r| r.timestamp > cutoff)
            .take(limit)
            .cloned()
            .collect())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.records.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn clear(&self) -> Result<()> {
        let mut guard = self.lock()?;
        guard.records.clear();
        guard.alerts_today = 0;
        Ok(())
    }
}

fn count_on_date(records: &[AlertRecord], now: DateTime<Local>) -> usize {
    let today = now.date_naive();
    records
        .iter()
        .filter(|r| r.timestamp.date_naive() == today)
        .count()
}
