use std::{io::ErrorKind, path::PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fs4::tokio::AsyncFileExt;
use serde::{Deserialize, Serialize};
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
};
use tracing::{debug, instrument, warn};

use super::{HealthMetric, HealthProvider};

pub const SAMPLES_FILE_NAME: &str = "steps.jsonl";

/// A single recording of steps. Stored as one json object per line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSample {
    #[serde(with = "chrono::serde::ts_seconds")]
    pub start: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub end: DateTime<Utc>,
    pub count: f64,
}

/// Provider backed by a json lines file of [StepSample]s. The data source is considered available
/// only when the file exists.
pub struct FileHealthProvider {
    path: PathBuf,
}

impl FileHealthProvider {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Appends a sample to the end of the file, creating it if needed.
    pub async fn append_sample(&self, sample: &StepSample) -> Result<()> {
        let mut line = serde_json::to_string(sample)?;
        line.push('\n');

        let mut file = File::options()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let result = async {
            file.write_all(line.as_bytes()).await?;
            file.flush().await
        }
        .await;
        file.unlock_async().await?;
        result?;
        debug!("Appended {sample:?} to {:?}", self.path);
        Ok(())
    }

    async fn read_samples(&self) -> std::result::Result<Vec<StepSample>, std::io::Error> {
        let file = File::open(&self.path).await?;
        file.lock_shared()?;
        let mut lines = BufReader::new(file).lines();
        let mut samples = vec![];
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<StepSample>(&line) {
                Ok(v) => samples.push(v),
                Err(e) => {
                    // ignore illegal values. Might happen after an interrupted write
                    warn!(
                        "During parsing in path {:?} found illegal json string {}: {e}",
                        self.path, &line
                    )
                }
            }
        }

        lines.into_inner().into_inner().unlock_async().await?;

        Ok(samples)
    }
}

#[async_trait]
impl HealthProvider for FileHealthProvider {
    fn is_data_source_available(&self) -> bool {
        self.path.is_file()
    }

    async fn authorize_read(&self, metric: HealthMetric) -> Result<bool> {
        debug!("Authorizing read of {metric} from {:?}", self.path);
        match File::open(&self.path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::PermissionDenied => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn query_cumulative_sum(
        &self,
        metric: HealthMetric,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<f64>> {
        let samples = match self.read_samples().await {
            Ok(samples) => samples,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => Err(e)?,
        };

        let sum = samples
            .into_iter()
            .filter(|sample| sample.start >= start && sample.start < end)
            .fold(None, |sum: Option<f64>, sample| {
                Some(sum.unwrap_or(0.) + sample.count)
            });
        debug!("Cumulative {metric} between {start} and {end} is {sum:?}");
        Ok(sum)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use tempfile::tempdir;

    use crate::{
        health::{HealthMetric, HealthProvider},
        utils::logging::TEST_LOGGING,
    };

    use super::{FileHealthProvider, StepSample, SAMPLES_FILE_NAME};

    fn day_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 23, 0, 0, 0).unwrap()
    }

    fn sample(offset_minutes: i64, count: f64) -> StepSample {
        let start = day_start() + Duration::minutes(offset_minutes);
        StepSample {
            start,
            end: start + Duration::minutes(5),
            count,
        }
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let provider = FileHealthProvider::new(dir.path().join(SAMPLES_FILE_NAME));

        assert!(!provider.is_data_source_available());
        assert_eq!(
            provider
                .query_cumulative_sum(HealthMetric::StepCount, day_start(), Utc::now())
                .await?,
            None
        );
        Ok(())
    }

    #[tokio::test]
    async fn sums_samples_starting_inside_range() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let provider = FileHealthProvider::new(dir.path().join(SAMPLES_FILE_NAME));
        provider.append_sample(&sample(-10, 900.)).await?;
        provider.append_sample(&sample(0, 120.)).await?;
        provider.append_sample(&sample(60, 3000.5)).await?;
        provider.append_sample(&sample(120, 77.)).await?;

        assert!(provider.is_data_source_available());
        assert!(provider.authorize_read(HealthMetric::StepCount).await?);

        let sum = provider
            .query_cumulative_sum(
                HealthMetric::StepCount,
                day_start(),
                day_start() + Duration::minutes(120),
            )
            .await?;

        assert_eq!(sum, Some(3120.5));
        Ok(())
    }

    #[tokio::test]
    async fn empty_range_has_no_data() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let provider = FileHealthProvider::new(dir.path().join(SAMPLES_FILE_NAME));
        provider.append_sample(&sample(-30, 400.)).await?;

        let sum = provider
            .query_cumulative_sum(
                HealthMetric::StepCount,
                day_start(),
                day_start() + Duration::hours(12),
            )
            .await?;

        assert_eq!(sum, None);
        Ok(())
    }

    #[tokio::test]
    async fn malformed_lines_are_skipped() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let path = dir.path().join(SAMPLES_FILE_NAME);
        let valid = serde_json::to_string(&sample(5, 250.))?;
        std::fs::write(&path, format!("{{\"start\": \n\n{valid}\nnot json\n"))?;
        let provider = FileHealthProvider::new(path);

        let sum = provider
            .query_cumulative_sum(
                HealthMetric::StepCount,
                day_start(),
                day_start() + Duration::days(1),
            )
            .await?;

        assert_eq!(sum, Some(250.));
        Ok(())
    }
}
