use crate::error::IndicatorError;

use super::rolling_sum::RollingSum;
use super::IndicatorSeries;

/// Samples in the momentum window feeding the CMO.
pub const CMO_WINDOW: usize = 9;

/// Variable Index Dynamic Average: an EMA whose smoothing factor is scaled by
/// the absolute Chande momentum of the last `CMO_WINDOW` price changes.
#[derive(Debug, Clone)]
pub struct Var {
    length: usize,
    alpha: f64,
    up_sum: RollingSum,
    down_sum: RollingSum,
    last_price: Option<f64>,
    value: Option<f64>,
}

impl Var {
    pub fn new(length: usize) -> Self {
        assert!(length > 0, "VAR length must be > 0");
        Self {
            length,
            alpha: 2.0 / (length as f64 + 1.0),
            up_sum: RollingSum::new(CMO_WINDOW),
            down_sum: RollingSum::new(CMO_WINDOW),
            last_price: None,
            value: None,
        }
    }

    /// Push the next close. Returns `None` for an undefined close; the last
    /// defined VAR is carried across the gap and seeds the next defined push.
    pub fn push(&mut self, price: Option<f64>) -> Option<f64> {
        let Some(price) = price.filter(|p| p.is_finite()) else {
            self.up_sum.push(0.0);
            self.down_sum.push(0.0);
            return None;
        };

        let delta = self.last_price.map(|last| price - last).unwrap_or(0.0);
        let up = self.up_sum.push(delta.max(0.0));
        let down = self.down_sum.push((-delta).max(0.0));
        let cmo = chande_momentum(up, down);

        let next = match self.value {
            Some(prev) => {
                let k = self.alpha * cmo.abs();
                k * price + (1.0 - k) * prev
            }
            None => price,
        };

        self.last_price = Some(price);
        self.value = Some(next);
        self.value
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

fn chande_momentum(up: f64, down: f64) -> f64 {
    let denom = up + down;
    if denom == 0.0 {
        0.0
    } else {
        (up - down) / denom
    }
}

/// Smooth a close series into VAR, index-aligned with the input.
///
/// Fails with `InsufficientData` when fewer than `length` closes are usable.
pub fn smooth(prices: &[Option<f64>], length: usize) -> Result<IndicatorSeries, IndicatorError> {
    if length == 0 {
        return Err(IndicatorError::InvalidParameter(
            "length must be > 0".to_string(),
        ));
    }
    let usable = prices
        .iter()
        .filter(|p| p.is_some_and(f64::is_finite))
        .count();
    if usable < length {
        return Err(IndicatorError::InsufficientData {
            needed: length,
            got: usable,
        });
    }

    let mut var = Var::new(length);
    let mut out = Vec::with_capacity(prices.len());
    for (i, price) in prices.iter().enumerate() {
        let value = var.push(*price);
        if value.is_some_and(|v| !v.is_finite()) {
            return Err(IndicatorError::Computation(format!(
                "VAR diverged at index {}",
                i
            )));
        }
        out.push(value);
    }
    Ok(out)
}
