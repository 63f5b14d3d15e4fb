use clap::Subcommand;
use sitewarden_core::{Blocklist, ClockTime, DayFilter, JsonFileStore, Schedule};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Show global schedules
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a global schedule
    Add {
        /// Start time, HH:MM
        start: String,
        /// End time, HH:MM
        end: String,
        /// all, weekdays or weekends
        #[arg(long, default_value = "all")]
        days: DayFilter,
    },
    /// Remove a global schedule by id
    Remove {
        id: String,
    },
    /// Remove every global schedule with this exact window
    RemoveWindow {
        start: String,
        end: String,
        #[arg(long, default_value = "all")]
        days: DayFilter,
    },
}

pub fn run(action: ScheduleAction) -> Result<(), Box<dyn std::error::Error>> {
    let blocklist = Blocklist::new(JsonFileStore::open()?);
    match action {
        ScheduleAction::List { json } => {
            let schedules = blocklist.schedules()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&schedules)?);
            } else if schedules.is_empty() {
                println!("no global schedules");
            } else {
                for schedule in &schedules {
                    println!("{}  {}", schedule.id, schedule.label());
                }
            }
        }
        ScheduleAction::Add { start, end, days } => {
            let schedule = Schedule::parse(&start, &end, days)?;
            let label = schedule.label();
            let id = blocklist.add_schedule(schedule)?;
            println!("schedule added: {id}  {label}");
        }
        ScheduleAction::Remove { id } => {
            let removed = blocklist.remove_schedule(&id)?;
            println!("schedule removed: {}  {}", removed.id, removed.label());
        }
        ScheduleAction::RemoveWindow { start, end, days } => {
            let start: ClockTime = start.parse()?;
            let end: ClockTime = end.parse()?;
            let removed = blocklist.remove_schedule_matching(start, end, days)?;
            println!("{removed} schedule(s) removed");
        }
    }
    Ok(())
}
