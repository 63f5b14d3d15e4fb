use clap::Subcommand;
use serde::Serialize;
use sitewarden_core::{Blocklist, Config, DayFilter, JsonFileStore, Notifier, Schedule, SilentNotifier};

use super::ConsoleNotifier;

#[derive(Subcommand)]
pub enum SiteAction {
    /// Block a site (scheme, "www." and path are dropped)
    Add {
        /// Host or URL, e.g. "example.com"
        host: String,
    },
    /// Block the host of a full URL, as "Block this site" does
    BlockUrl {
        url: String,
    },
    /// Unblock a site
    Remove {
        host: String,
    },
    /// List blocked sites with their status
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Give a site its own schedule
    Schedule {
        host: String,
        /// Start time, HH:MM
        start: String,
        /// End time, HH:MM
        end: String,
        /// all, weekdays or weekends
        #[arg(long, default_value = "all")]
        days: DayFilter,
    },
    /// Return a site to the global schedules
    ClearSchedule {
        host: String,
    },
}

#[derive(Serialize)]
struct SiteRow {
    url: String,
    schedule: Option<Schedule>,
    status: String,
}

pub fn run(action: SiteAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let blocklist = Blocklist::new(JsonFileStore::open()?);
    match action {
        SiteAction::Add { host } => {
            let outcome = blocklist.add_site(&host)?;
            if outcome.added {
                println!("blocked: {}", outcome.url);
            } else {
                println!("already blocked: {}", outcome.url);
            }
        }
        SiteAction::BlockUrl { url } => {
            let notifier: &dyn Notifier = if config.notifications.enabled {
                &ConsoleNotifier
            } else {
                &SilentNotifier
            };
            let outcome = blocklist.block_this_site(&url, notifier)?;
            if !outcome.added {
                println!("already blocked: {}", outcome.url);
            }
        }
        SiteAction::Remove { host } => {
            blocklist.remove_site(&host)?;
            println!("unblocked: {host}");
        }
        SiteAction::List { json } => {
            let rows: Vec<SiteRow> = blocklist
                .statuses()?
                .into_iter()
                .map(|(site, status)| SiteRow {
                    url: site.url,
                    schedule: site.schedule,
                    status: status.to_string(),
                })
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if rows.is_empty() {
                println!("no blocked sites");
            } else {
                for row in rows {
                    println!("{}: {}", row.url, row.status);
                }
            }
        }
        SiteAction::Schedule { host, start, end, days } => {
            let schedule = Schedule::parse(&start, &end, days)?;
            let label = schedule.label();
            blocklist.set_site_schedule(&host, schedule)?;
            println!("{host}: Custom schedule: {label}");
        }
        SiteAction::ClearSchedule { host } => {
            blocklist.clear_site_schedule(&host)?;
            println!("{host}: schedule cleared");
        }
    }
    Ok(())
}
