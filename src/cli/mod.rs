pub mod dashboard;
pub mod shutdown;
pub mod watch;

use std::{io::IsTerminal, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use chrono::{Duration as ChronoDuration, Local, Utc};
use clap::{Parser, Subcommand};
use dashboard::{render_dashboard, render_quick_goals};
use shutdown::detect_shutdown;
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter, warn};
use watch::watch_dashboard;

use crate::{
    health::file::{FileHealthProvider, StepSample, SAMPLES_FILE_NAME},
    tracker::{
        goal::GoalDraft,
        state::{DEFAULT_DAILY_GOAL, MIN_DAILY_GOAL},
        NoDataPolicy, StepGoalTracker, TrackerConfig,
    },
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, create_dir},
        logging::{enable_logging, CLI_PREFIX},
    },
};

const MAX_REFRESH_INTERVAL_SECS: u64 = 24 * 60 * 60;

#[derive(Parser, Debug)]
#[command(name = "Stepgoal", version, long_about = None)]
#[command(about = "Daily step counter with a goal-progress ring", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, global = true, help = "Print logs to the console")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default uses $XDG_STATE_HOME/stepgoal or $HOME/.local/state/stepgoal"
    )]
    dir: Option<PathBuf>,
}

#[derive(Debug, Clone, clap::Args)]
struct TrackingArgs {
    #[arg(long, help = "Daily goal for this session. Must be a whole number of at least 1000")]
    goal: Option<String>,
    #[arg(
        long = "empty-on-missing",
        help = "Show 0 steps when nothing was recorded today instead of a sample value"
    )]
    empty_on_missing: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Show today's steps and progress towards the goal")]
    Show {
        #[command(flatten)]
        tracking: TrackingArgs,
    },
    #[command(about = "Keep showing today's steps, refreshing periodically. Stop with Ctrl-C")]
    Watch {
        #[command(flatten)]
        tracking: TrackingArgs,
        #[arg(
            long,
            default_value_t = 60,
            value_parser = clap::value_parser!(u64).range(1..=MAX_REFRESH_INTERVAL_SECS),
            help = "Seconds between refreshes, at most one day"
        )]
        interval: u64,
    },
    #[command(about = "Record steps walked during the last few minutes")]
    Log {
        #[arg(long)]
        steps: u64,
        #[arg(long, default_value_t = 1, help = "How many minutes the steps were walked over")]
        minutes: u32,
    },
    #[command(about = "List quick goals")]
    Goals {},
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = args
        .dir
        .map_or_else(create_application_default_path, create_dir)?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &app_dir.join("logs"), logging_level, args.log)?;

    let samples = app_dir.join(SAMPLES_FILE_NAME);
    let colored = std::io::stdout().is_terminal();

    match args.commands {
        Commands::Show { tracking } => {
            let tracker = create_tracker(samples, &tracking);
            tracker.request_authorization().await;
            let today = Local::now().date_naive();
            println!("{}", render_dashboard(&tracker.state(), today, colored));
            Ok(())
        }
        Commands::Watch { tracking, interval } => {
            let tracker = Arc::new(create_tracker(samples, &tracking));
            let shutdown = CancellationToken::new();
            let (_, result) = tokio::join!(detect_shutdown(shutdown.clone()), async {
                let result = watch_dashboard(
                    tracker,
                    &DefaultClock,
                    Duration::from_secs(interval),
                    shutdown.clone(),
                    std::io::stdout(),
                    colored,
                )
                .await;
                // Lets detect_shutdown return when watching stops on its own.
                shutdown.cancel();
                result
            });
            result
        }
        Commands::Log { steps, minutes } => {
            let end = Utc::now();
            let sample = StepSample {
                start: end - ChronoDuration::minutes(minutes.into()),
                end,
                count: steps as f64,
            };
            FileHealthProvider::new(samples).append_sample(&sample).await?;
            info!("Logged {steps} steps");
            println!("Logged {steps} steps");
            Ok(())
        }
        Commands::Goals {} => {
            println!("{}", render_quick_goals(&GoalDraft::from_current(DEFAULT_DAILY_GOAL)));
            Ok(())
        }
    }
}

fn create_tracker(samples: PathBuf, tracking: &TrackingArgs) -> StepGoalTracker {
    let no_data_policy = if tracking.empty_on_missing {
        NoDataPolicy::Empty
    } else {
        NoDataPolicy::Placeholder
    };
    let tracker = StepGoalTracker::new(
        Arc::new(FileHealthProvider::new(samples)),
        Box::new(DefaultClock),
        TrackerConfig {
            no_data_policy,
            ..Default::default()
        },
    );

    if let Some(text) = &tracking.goal {
        let mut draft = GoalDraft::from_current(tracker.daily_goal());
        draft.set_text(text.as_str());
        if !draft.save(&tracker) {
            warn!("Ignoring goal {text:?}");
            eprintln!(
                "Ignoring goal {text:?}, it must be a whole number of at least {MIN_DAILY_GOAL}"
            );
        }
    }
    tracker
}
