use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Local, Utc};
use tokio::time::Instant;

use super::time::start_of_today_in;

/// Represents an entity responsible for providing dates across application. Step queries are
/// bounded by "now" and the local start of day, so tests swap this for a fixed clock.
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    fn time(&self) -> DateTime<Utc>;

    /// Current time in the device's timezone. Only good for reading the date, the offset is the
    /// current one.
    fn local_time(&self) -> DateTime<FixedOffset> {
        self.time().with_timezone(&Local).fixed_offset()
    }

    /// Local midnight of today, resolved with the device's timezone rules.
    fn start_of_today(&self) -> DateTime<Utc> {
        start_of_today_in(self.time(), &Local)
    }

    fn instant(&self) -> Instant;

    async fn sleep_until(&self, instant: Instant);
}

pub struct DefaultClock;

#[async_trait]
impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: Instant) {
        tokio::time::sleep_until(instant).await;
    }
}

