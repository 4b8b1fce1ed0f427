use ansi_term::{Colour, Style};
use chrono::NaiveDate;

use crate::{
    tracker::{
        goal::{GoalDraft, QUICK_GOALS},
        state::{StepGoalState, StepSource},
    },
    utils::{percentage::Percentage, time::date_to_display_name},
};

const RING_WIDTH: usize = 20;

/// Renders the single screen of the application: today's steps, the progress ring and the goal.
pub fn render_dashboard(state: &StepGoalState, today: NaiveDate, colored: bool) -> String {
    let paint = |style: Style, text: String| {
        if colored {
            style.paint(text).to_string()
        } else {
            text
        }
    };

    let achieved = state.is_goal_achieved();
    let ring_colour = if achieved { Colour::Green } else { Colour::Blue };
    let progress = state.progress_percentage();

    let mut lines = vec![format!(
        "{}    {}",
        paint(Style::new().bold(), "Today's Steps".into()),
        paint(Style::new().dimmed(), date_to_display_name(today)),
    )];

    if !state.is_authorized {
        lines.push(paint(
            Colour::Yellow.normal(),
            "No access to step data, showing defaults".into(),
        ));
    }

    let steps_note = match state.source {
        StepSource::Synthetic => " (sample value, no recorded steps today)",
        StepSource::NoData => " (no recorded steps today)",
        StepSource::Pending | StepSource::Recorded => "",
    };
    lines.push(format!(
        "{} steps{}",
        paint(Style::new().bold(), state.current_steps.to_string()),
        paint(Style::new().dimmed(), steps_note.into()),
    ));

    lines.push(format!(
        "{} {} of goal",
        paint(ring_colour.normal(), progress_ring(progress)),
        paint(Style::new().bold(), Percentage::from_fraction(progress).to_string()),
    ));

    lines.push(format!("Daily Goal: {}", state.daily_goal));
    if achieved {
        lines.push(paint(Colour::Green.bold(), "Goal achieved!".into()));
    } else {
        lines.push(format!(
            "Remaining: {}",
            paint(Colour::Fixed(208).normal(), state.remaining_steps().to_string())
        ));
    }

    lines.join("\n")
}

/// Progress rendered as a fixed width bar. Partially filled cells are not drawn.
fn progress_ring(progress: f64) -> String {
    let filled = ((progress.clamp(0., 1.) * RING_WIDTH as f64) as usize).min(RING_WIDTH);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(RING_WIDTH - filled))
}

/// Lists quick goals, marking the one the draft currently holds.
pub fn render_quick_goals(draft: &GoalDraft) -> String {
    QUICK_GOALS
        .iter()
        .map(|goal| {
            let marker = if draft.is_selected(*goal) { "*" } else { " " };
            format!("{marker} {goal}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
