pub mod alert_history;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod indicator;
pub mod market_data;
pub mod model;
pub mod monitor;
pub mod notify;
pub mod pipeline;
pub mod state;
