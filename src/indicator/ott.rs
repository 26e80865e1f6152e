use serde::Serialize;

use crate::error::IndicatorError;

use super::IndicatorSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Long,
    Short,
}

/// One bar of tracker output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackStep {
    pub long_stop: Option<f64>,
    pub short_stop: Option<f64>,
    pub long_stop_adj: Option<f64>,
    pub short_stop_adj: Option<f64>,
    pub direction: Direction,
    pub mt: Option<f64>,
    pub ott: Option<f64>,
}

#[derive(Debug, Clone, Copy)]
struct TrackerState {
    long_stop_adj: Option<f64>,
    short_stop_adj: Option<f64>,
    direction: Direction,
}

/// Trailing-stop state machine behind OTT.
///
/// Each push depends only on the incoming MAvg and the state left by the
/// previous push. Direction flips are tested against the previous bar's
/// adjusted stops, not the ones computed for the current bar.
#[derive(Debug, Clone)]
pub struct OttTracker {
    percent: f64,
    state: Option<TrackerState>,
}

impl OttTracker {
    pub fn new(percent: f64) -> Self {
        assert!(
            percent.is_finite() && percent > 0.0,
            "OTT percent must be finite and > 0"
        );
        Self {
            percent,
            state: None,
        }
    }

    pub fn push(&mut self, mavg: Option<f64>) -> TrackStep {
        let band = mavg.map(|m| m * self.percent * 0.01);
        let long_stop = mavg.zip(band).map(|(m, b)| m - b);
        let short_stop = mavg.zip(band).map(|(m, b)| m + b);

        let next = match self.state {
            None => TrackerState {
                long_stop_adj: long_stop,
                short_stop_adj: short_stop,
                direction: Direction::Long,
            },
            Some(prev) => {
                let long_stop_adj = match (mavg, prev.long_stop_adj) {
                    (Some(m), Some(prev_long)) if m > prev_long => {
                        long_stop.map(|ls| ls.max(prev_long))
                    }
                    _ => long_stop,
                };
                let short_stop_adj = match (mavg, prev.short_stop_adj) {
                    (Some(m), Some(prev_short)) if m < prev_short => {
                        short_stop.map(|ss| ss.min(prev_short))
                    }
                    _ => short_stop,
                };
                let direction = match (prev.direction, mavg) {
                    (Direction::Short, Some(m))
                        if prev.short_stop_adj.is_some_and(|ss| m > ss) =>
                    {
                        Direction::Long
                    }
                    (Direction::Long, Some(m)) if prev.long_stop_adj.is_some_and(|ls| m < ls) => {
                        Direction::Short
                    }
                    (carried, _) => carried,
                };
                TrackerState {
                    long_stop_adj,
                    short_stop_adj,
                    direction,
                }
            }
        };
        self.state = Some(next);

        let mt = match next.direction {
            Direction::Long => next.long_stop_adj,
            Direction::Short => next.short_stop_adj,
        };
        let ott = mavg.zip(mt).map(|(m, mt)| {
            if m > mt {
                mt * (200.0 + self.percent) / 200.0
            } else {
                mt * (200.0 - self.percent) / 200.0
            }
        });

        TrackStep {
            long_stop,
            short_stop,
            long_stop_adj: next.long_stop_adj,
            short_stop_adj: next.short_stop_adj,
            direction: next.direction,
            mt,
            ott,
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        self.state.map(|s| s.direction)
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }
}

/// Full tracker output, index-aligned with the smoothed input.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OttOutput {
    pub mavg: IndicatorSeries,
    pub long_stop: IndicatorSeries,
    pub short_stop: IndicatorSeries,
    pub mt: IndicatorSeries,
    pub ott: IndicatorSeries,
    pub direction: Vec<Direction>,
}

impl OttOutput {
    /// All-undefined output of length `len`, used when a stage fails.
    pub fn undefined(len: usize) -> Self {
        Self {
            mavg: vec![None; len],
            long_stop: vec![None; len],
            short_stop: vec![None; len],
            mt: vec![None; len],
            ott: vec![None; len],
            direction: vec![Direction::Long; len],
        }
    }

    pub fn len(&self) -> usize {
        self.mavg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mavg.is_empty()
    }

    pub fn last_direction(&self) -> Option<Direction> {
        self.direction.last().copied()
    }
}

/// Run the tracker over a VAR series in one sequential pass.
pub fn track(var: &[Option<f64>], percent: f64) -> Result<OttOutput, IndicatorError> {
    if !(percent.is_finite() && percent > 0.0) {
        return Err(IndicatorError::InvalidParameter(format!(
            "percent must be finite and > 0, got {}",
            percent
        )));
    }

    let n = var.len();
    let mut out = OttOutput {
        mavg: var.to_vec(),
        long_stop: Vec::with_capacity(n),
        short_stop: Vec::with_capacity(n),
        mt: Vec::with_capacity(n),
        ott: Vec::with_capacity(n),
        direction: Vec::with_capacity(n),
    };

    let mut tracker = OttTracker::new(percent);
    for mavg in var {
        let step = tracker.push(*mavg);
        out.long_stop.push(step.long_stop);
        out.short_stop.push(step.short_stop);
        out.mt.push(step.mt);
        out.ott.push(step.ott);
        out.direction.push(step.direction);
    }
    Ok(out)
}
