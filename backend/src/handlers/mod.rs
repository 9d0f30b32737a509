//! HTTP request handlers

pub mod health;
pub mod reports;
pub mod snapshot;

pub use health::health_check;
pub use reports::list_reports;
pub use snapshot::run_snapshot;
