use chrono::{DateTime, Local};
use serde::Serialize;
use uuid::Uuid;

use super::signal::SignalKind;

/// An accepted signal as kept in the alert history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Local>,
    pub symbol: String,
    #[serde(rename = "signal")]
    pub kind: SignalKind,
    pub price: f64,
}

impl AlertRecord {
    pub fn new(symbol: &str, kind: SignalKind, price: f64, timestamp: DateTime<Local>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            symbol: symbol.to_string(),
            kind,
            price,
        }
    }
}
