use super::{state::MIN_DAILY_GOAL, StepGoalTracker};

/// Goals offered as one-tap choices when editing.
pub const QUICK_GOALS: [u64; 5] = [5000, 7500, 10000, 12000, 15000];

/// Text being edited as a new goal. Nothing reaches the tracker until [GoalDraft::save].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalDraft {
    text: String,
}

impl GoalDraft {
    /// Starts editing from the goal currently in use.
    pub fn from_current(goal: u64) -> Self {
        Self {
            text: goal.to_string(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn select_quick(&mut self, goal: u64) {
        self.text = goal.to_string();
    }

    pub fn is_selected(&self, goal: u64) -> bool {
        self.text == goal.to_string()
    }

    /// The goal the draft would save, if it is a whole number at or above the minimum.
    pub fn parse(&self) -> Option<u64> {
        self.text
            .parse::<u64>()
            .ok()
            .filter(|goal| *goal >= MIN_DAILY_GOAL)
    }

    /// Applies the draft. An invalid draft is dropped and the tracker keeps its goal.
    pub fn save(self, tracker: &StepGoalTracker) -> bool {
        match self.parse() {
            Some(goal) => {
                tracker.set_daily_goal(goal.try_into().unwrap_or(i64::MAX));
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        health::MockHealthProvider,
        tracker::{StepGoalTracker, TrackerConfig},
        utils::clock::DefaultClock,
    };

    use super::{GoalDraft, QUICK_GOALS};

    fn tracker() -> StepGoalTracker {
        StepGoalTracker::new(
            Arc::new(MockHealthProvider::new()),
            Box::new(DefaultClock),
            TrackerConfig::default(),
        )
    }

    #[test]
    fn quick_goal_selection() {
        let mut draft = GoalDraft::from_current(10000);
        assert!(draft.is_selected(10000));

        draft.select_quick(QUICK_GOALS[1]);
        assert_eq!(draft.text(), "7500");
        assert!(draft.is_selected(7500));
        assert!(!draft.is_selected(10000));
        assert_eq!(draft.parse(), Some(7500));
    }

    #[test]
    fn rejects_small_or_malformed() {
        let mut draft = GoalDraft::from_current(10000);
        for text in ["999", "", "abc", "-5000", "12.5", " 5000"] {
            draft.set_text(text);
            assert_eq!(draft.parse(), None, "{text:?} should not parse");
        }
        draft.set_text("1000");
        assert_eq!(draft.parse(), Some(1000));
    }

    #[test]
    fn saving_quick_goal_updates_tracker() {
        let tracker = tracker();
        let mut draft = GoalDraft::from_current(tracker.daily_goal());
        draft.select_quick(7500);

        assert!(draft.save(&tracker));
        assert_eq!(tracker.daily_goal(), 7500);
    }

    #[test]
    fn invalid_draft_leaves_tracker_untouched() {
        let tracker = tracker();
        tracker.set_daily_goal(12000);
        let updates = tracker.subscribe();

        for text in ["999", "abc", "", "-1"] {
            let mut draft = GoalDraft::from_current(tracker.daily_goal());
            draft.set_text(text);

            assert!(!draft.save(&tracker), "{text:?} should not be saved");
            assert_eq!(tracker.daily_goal(), 12000);
        }
        assert!(!updates.has_changed().unwrap());
    }
}
