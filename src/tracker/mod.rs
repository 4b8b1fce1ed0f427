//! Mediates between a [HealthProvider] and whatever displays the step count.
//!
//! The tracker owns a single [StepGoalState] and publishes every change of it through a
//! [watch] channel. It starts unauthorized, where [StepGoalTracker::refresh] does nothing, and
//! becomes authorized once the provider grants read access. There is no way back.

pub mod goal;
pub mod state;

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use anyhow::Result;
use chrono::{DateTime, Utc};
use rand::Rng;
use state::{StepGoalState, StepSource, DEFAULT_DAILY_GOAL, MIN_DAILY_GOAL};
use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    health::{HealthMetric, HealthProvider},
    utils::clock::Clock,
};

const PLACEHOLDER_MIN_STEPS: u64 = 2000;
const PLACEHOLDER_MAX_STEPS: u64 = 8000;

/// What to show when the provider has no steps for today, or the query failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoDataPolicy {
    /// Show a random count in `[2000, 8000]` marked as [StepSource::Synthetic].
    #[default]
    Placeholder,
    /// Show zero steps marked as [StepSource::NoData].
    Empty,
}

#[derive(Debug, Clone, Copy)]
pub struct TrackerConfig {
    pub daily_goal: u64,
    pub no_data_policy: NoDataPolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            daily_goal: DEFAULT_DAILY_GOAL,
            no_data_policy: NoDataPolicy::default(),
        }
    }
}

pub struct StepGoalTracker {
    state: watch::Sender<StepGoalState>,
    provider: Arc<dyn HealthProvider>,
    clock: Box<dyn Clock>,
    no_data_policy: NoDataPolicy,
    /// Ticket of the most recently issued refresh. Only its result is applied.
    latest_refresh: AtomicU64,
    shutdown: CancellationToken,
}

/// A step query that has been issued but not awaited yet. Holds no reference to the tracker, so
/// the tracker can be dropped while it runs.
struct PendingQuery {
    ticket: u64,
    provider: Arc<dyn HealthProvider>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    shutdown: CancellationToken,
}

impl PendingQuery {
    /// Returns `None` when cancelled by [StepGoalTracker::shutdown].
    async fn run(self) -> Option<(u64, Result<Option<f64>>)> {
        debug!(
            "Querying steps between {} and {} (refresh {})",
            self.start, self.end, self.ticket
        );
        tokio::select! {
            _ = self.shutdown.cancelled() => None,
            result = self.provider.query_cumulative_sum(HealthMetric::StepCount, self.start, self.end) => {
                Some((self.ticket, result))
            }
        }
    }
}

impl StepGoalTracker {
    pub fn new(
        provider: Arc<dyn HealthProvider>,
        clock: Box<dyn Clock>,
        config: TrackerConfig,
    ) -> Self {
        let (state, _) = watch::channel(StepGoalState {
            daily_goal: config.daily_goal.max(MIN_DAILY_GOAL),
            ..Default::default()
        });
        Self {
            state,
            provider,
            clock,
            no_data_policy: config.no_data_policy,
            latest_refresh: AtomicU64::new(0),
            shutdown: CancellationToken::new(),
        }
    }

    /// Asks the provider for read access to step counts and loads today's steps if granted.
    /// Failures leave the tracker unauthorized and are only logged.
    pub async fn request_authorization(&self) {
        if !self.provider.is_data_source_available() {
            warn!("Health data is not available on this device");
            return;
        }

        let granted = tokio::select! {
            _ = self.shutdown.cancelled() => return,
            granted = self.provider.authorize_read(HealthMetric::StepCount) => granted,
        };

        match granted {
            Ok(true) => {
                info!("Read access to step count granted");
                self.state.send_modify(|state| state.is_authorized = true);
                self.refresh().await;
            }
            Ok(false) => {
                info!("Read access to step count denied");
            }
            Err(e) => {
                error!("Failed to request read access to step count {e:?}");
            }
        }
    }

    /// Loads today's cumulative step count. Does nothing until authorized.
    pub async fn refresh(&self) {
        let Some(query) = self.issue_query() else {
            return;
        };
        if let Some((ticket, result)) = query.run().await {
            self.apply(ticket, result);
        }
    }

    /// Same as [StepGoalTracker::refresh] but runs on a background task. The task keeps only a weak
    /// reference, so results arriving after the tracker is dropped are discarded.
    pub fn spawn_refresh(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let query = self.issue_query()?;
        let tracker = Arc::downgrade(self);
        Some(tokio::spawn(async move {
            let Some((ticket, result)) = query.run().await else {
                return;
            };
            match tracker.upgrade() {
                Some(tracker) => tracker.apply(ticket, result),
                None => debug!("Tracker dropped before refresh {ticket} completed"),
            }
        }))
    }

    /// Stores `max(1000, goal)` as the new daily goal.
    pub fn set_daily_goal(&self, goal: i64) {
        let goal = goal.max(MIN_DAILY_GOAL as i64) as u64;
        debug!("Setting daily goal to {goal}");
        self.state.send_modify(|state| state.daily_goal = goal);
    }

    /// Cancels in-flight provider calls. Results that still arrive are discarded.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn subscribe(&self) -> watch::Receiver<StepGoalState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> StepGoalState {
        *self.state.borrow()
    }

    pub fn current_steps(&self) -> u64 {
        self.state.borrow().current_steps
    }

    pub fn daily_goal(&self) -> u64 {
        self.state.borrow().daily_goal
    }

    pub fn is_authorized(&self) -> bool {
        self.state.borrow().is_authorized
    }

    pub fn progress_percentage(&self) -> f64 {
        self.state.borrow().progress_percentage()
    }

    pub fn is_goal_achieved(&self) -> bool {
        self.state.borrow().is_goal_achieved()
    }

    pub fn remaining_steps(&self) -> u64 {
        self.state.borrow().remaining_steps()
    }

    fn issue_query(&self) -> Option<PendingQuery> {
        if !self.is_authorized() {
            debug!("Skipping refresh, step count access is not authorized");
            return None;
        }
        let ticket = self.latest_refresh.fetch_add(1, Ordering::SeqCst) + 1;
        Some(PendingQuery {
            ticket,
            provider: self.provider.clone(),
            start: self.clock.start_of_today(),
            end: self.clock.time(),
            shutdown: self.shutdown.clone(),
        })
    }

    fn apply(&self, ticket: u64, result: Result<Option<f64>>) {
        if self.shutdown.is_cancelled() {
            debug!("Discarding refresh {ticket}, tracker is shut down");
            return;
        }
        let latest = self.latest_refresh.load(Ordering::SeqCst);
        if ticket != latest {
            debug!("Discarding stale refresh {ticket}, latest is {latest}");
            return;
        }

        let (steps, source) = match result {
            // `as` saturates, so negative or NaN sums end up as 0.
            Ok(Some(sum)) => (sum as u64, StepSource::Recorded),
            Ok(None) => {
                info!("No steps recorded today");
                self.no_data_fallback()
            }
            Err(e) => {
                warn!("Step count query failed {e:?}");
                self.no_data_fallback()
            }
        };

        info!("Current steps {steps} ({source:?})");
        self.state.send_modify(|state| {
            state.current_steps = steps;
            state.source = source;
        });
    }

    fn no_data_fallback(&self) -> (u64, StepSource) {
        match self.no_data_policy {
            NoDataPolicy::Placeholder => (
                rand::thread_rng().gen_range(PLACEHOLDER_MIN_STEPS..=PLACEHOLDER_MAX_STEPS),
                StepSource::Synthetic,
            ),
            NoDataPolicy::Empty => (0, StepSource::NoData),
        }
    }
}
