use crate::model::signal::SignalKind;

/// Bars by which OTT is delayed before comparing against MAvg.
pub const OTT_LAG: usize = 2;

/// Per-bar crossover flags, index-aligned with the inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Crossovers {
    pub buy: Vec<bool>,
    pub sell: Vec<bool>,
}

impl Crossovers {
    /// Signal within the last `lookback` bars; buy takes precedence over a
    /// sell anywhere in the same window.
    pub fn latest_within(&self, lookback: usize) -> Option<SignalKind> {
        let start = self.buy.len().saturating_sub(lookback);
        if self.buy[start..].iter().any(|b| *b) {
            Some(SignalKind::Buy)
        } else if self.sell[start..].iter().any(|s| *s) {
            Some(SignalKind::Sell)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.buy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buy.is_empty()
    }
}

/// Detect MAvg crossings of OTT delayed by `OTT_LAG` bars.
///
/// Comparisons with an undefined operand are false. Inputs of different
/// lengths are truncated to the shorter one.
pub fn detect(mavg: &[Option<f64>], ott: &[Option<f64>]) -> Crossovers {
    let n = mavg.len().min(ott.len());
    let lagged = |i: usize| -> Option<f64> {
        if i >= OTT_LAG {
            ott[i - OTT_LAG]
        } else {
            None
        }
    };

    let mut out = Crossovers {
        buy: vec![false; n],
        sell: vec![false; n],
    };
    for i in 1..n {
        let (Some(m), Some(lag), Some(prev_m), Some(prev_lag)) =
            (mavg[i], lagged(i), mavg[i - 1], lagged(i - 1))
        else {
            continue;
        };
        out.buy[i] = m > lag && prev_m <= prev_lag;
        out.sell[i] = m < lag && prev_m >= prev_lag;
    }
    out
}
