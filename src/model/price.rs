use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::SeriesError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self { timestamp, close }
    }

    /// A close is usable when it is finite and not negative.
    pub fn usable_close(&self) -> Option<f64> {
        (self.close.is_finite() && self.close >= 0.0).then_some(self.close)
    }
}

/// Closes ordered by strictly increasing timestamp. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        for (index, pair) in points.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(SeriesError::NonMonotonicTimestamp { index: index + 1 });
            }
        }
        Ok(Self { points })
    }

    /// Build from parallel columns, dropping rows whose close is missing.
    pub fn from_columns(
        timestamps: &[DateTime<Utc>],
        closes: &[Option<f64>],
    ) -> Result<Self, SeriesError> {
        if timestamps.len() != closes.len() {
            return Err(SeriesError::LengthMismatch {
                timestamps: timestamps.len(),
                closes: closes.len(),
            });
        }
        let points = timestamps
            .iter()
            .zip(closes)
            .filter_map(|(ts, close)| close.map(|c| PricePoint::new(*ts, c)))
            .collect();
        Self::new(points)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    /// Closes as an indicator input; unusable closes become `None`.
    pub fn closes(&self) -> Vec<Option<f64>> {
        self.points.iter().map(PricePoint::usable_close).collect()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}
