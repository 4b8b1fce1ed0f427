/// Lowest goal the tracker accepts. Smaller goals are raised to this value.
pub const MIN_DAILY_GOAL: u64 = 1000;
pub const DEFAULT_DAILY_GOAL: u64 = 10000;

/// Where [StepGoalState::current_steps] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepSource {
    /// Nothing has been fetched yet.
    #[default]
    Pending,
    /// Reported by the health-data provider.
    Recorded,
    /// Placeholder made up because the provider returned nothing. Not a real reading.
    Synthetic,
    /// Provider returned nothing and the tracker is configured to show that as-is.
    NoData,
}

/// State published by the tracker. Derived values are always computed from the stored fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepGoalState {
    pub current_steps: u64,
    pub daily_goal: u64,
    pub is_authorized: bool,
    pub source: StepSource,
}

impl Default for StepGoalState {
    fn default() -> Self {
        Self {
            current_steps: 0,
            daily_goal: DEFAULT_DAILY_GOAL,
            is_authorized: false,
            source: StepSource::Pending,
        }
    }
}

impl StepGoalState {
    /// Share of the goal walked so far, in `[0, 1]`.
    pub fn progress_percentage(&self) -> f64 {
        if self.daily_goal == 0 {
            return 0.;
        }
        (self.current_steps as f64 / self.daily_goal as f64).clamp(0., 1.)
    }

    pub fn is_goal_achieved(&self) -> bool {
        self.current_steps >= self.daily_goal
    }

    pub fn remaining_steps(&self) -> u64 {
        self.daily_goal.saturating_sub(self.current_steps)
    }
}
