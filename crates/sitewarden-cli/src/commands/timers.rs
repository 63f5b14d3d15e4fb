use chrono::Local;
use clap::Args;
use sitewarden_core::{JsonFileStore, TimerCoordinator, TimerService};

use super::zoned_now;

#[derive(Args)]
pub struct TimersArgs {
    /// Local time to compute from, "YYYY-MM-DD HH:MM" (default: now)
    #[arg(long)]
    at: Option<String>,
}

/// Arms nothing. The coordinator keeps its own record of each firing.
struct DryRun;

impl TimerService for DryRun {
    fn register_one_shot(&mut self, _id: &str, _at_ms: i64) {}

    fn cancel_all(&mut self) {}
}

pub fn run(args: TimersArgs) -> Result<(), Box<dyn std::error::Error>> {
    let now = zoned_now(args.at.as_deref())?;
    let store = JsonFileStore::open()?;
    let mut coordinator = TimerCoordinator::new(DryRun);
    if coordinator.rebuild_from_store(&store, &now) == 0 {
        println!("no timers");
        return Ok(());
    }

    let mut timers: Vec<_> = coordinator.registered().iter().collect();
    timers.sort_by_key(|(_, at)| **at);
    for (key, at) in timers {
        println!("{}  {key}", at.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
    }
    Ok(())
}
