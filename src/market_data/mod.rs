pub mod yahoo;

use anyhow::Result;
use async_trait::async_trait;

use crate::model::price::PriceSeries;

pub use yahoo::YahooClient;

/// Supplier of close series for the monitor and the dashboard.
///
/// `Ok(None)` means the source had nothing for the request; callers treat it
/// like insufficient data rather than a failure.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self, symbol: &str, range: &str, interval: &str)
        -> Result<Option<PriceSeries>>;
}
