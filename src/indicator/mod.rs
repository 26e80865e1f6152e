//! OTT indicator pipeline: VAR smoothing, trailing-stop tracking and
//! crossover detection.

pub mod crossover;
pub mod ott;
pub mod rolling_sum;
pub mod var;

use crate::error::IndicatorError;

pub use crossover::{detect, Crossovers};
pub use ott::{track, Direction, OttOutput, OttTracker};
pub use var::{smooth, Var};

/// Index-aligned indicator values; `None` marks an undefined element.
pub type IndicatorSeries = Vec<Option<f64>>;

/// Smooth `closes` into VAR and run the trailing-stop tracker over it.
pub fn compute_indicators(
    closes: &[Option<f64>],
    length: usize,
    percent: f64,
) -> Result<OttOutput, IndicatorError> {
    let var = smooth(closes, length)?;
    track(&var, percent)
}

pub fn detect_signals(mavg: &[Option<f64>], ott: &[Option<f64>]) -> Crossovers {
    detect(mavg, ott)
}
