//! Contains the contract the tracker uses to talk to a health-data service.
//! [HealthProvider] is the main artifact of this module, [file::FileHealthProvider] is the
//! implementation shipped with the application.

pub mod file;

use std::fmt::Display;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Kind of data requested from a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HealthMetric {
    StepCount,
}

impl Display for HealthMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthMetric::StepCount => write!(f, "step count"),
        }
    }
}

/// Intended to serve as a contract every health-data source must implement.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthProvider: Send + Sync {
    /// Whether this device or platform has a health-data service at all.
    fn is_data_source_available(&self) -> bool;

    /// Asks for read access to `metric`. `Ok(true)` means access was granted.
    async fn authorize_read(&self, metric: HealthMetric) -> Result<bool>;

    /// Sum of `metric` for samples starting inside `[start, end)`. `None` when nothing was
    /// recorded in the range.
    async fn query_cumulative_sum(
        &self,
        metric: HealthMetric,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<f64>>;
}
