use std::{io::Write, sync::Arc, time::Duration};

use anyhow::Result;
use tokio_stream::{wrappers::WatchStream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{tracker::StepGoalTracker, utils::clock::Clock};

use super::dashboard::render_dashboard;

/// Prints the dashboard every time the tracker publishes a change and refreshes it every
/// `interval`, until `shutdown` is cancelled.
pub async fn watch_dashboard(
    tracker: Arc<StepGoalTracker>,
    clock: &dyn Clock,
    interval: Duration,
    shutdown: CancellationToken,
    mut output: impl Write,
    colored: bool,
) -> Result<()> {
    let mut updates = WatchStream::new(tracker.subscribe());

    tokio::select! {
        _ = shutdown.cancelled() => return Ok(()),
        _ = tracker.request_authorization() => (),
    }

    let mut refresh_point = clock.instant() + interval;
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Stopping dashboard");
                tracker.shutdown();
                return Ok(());
            }
            update = updates.next() => {
                let Some(state) = update else {
                    return Ok(());
                };
                let today = clock.local_time().date_naive();
                writeln!(output, "{}\n", render_dashboard(&state, today, colored))?;
                output.flush()?;
            }
            _ = clock.sleep_until(refresh_point) => {
                debug!("Scheduled refresh");
                refresh_point += interval;
                tracker.spawn_refresh();
            }
        }
    }
}
