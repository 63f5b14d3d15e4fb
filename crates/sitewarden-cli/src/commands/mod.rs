pub mod check;
pub mod config;
pub mod schedule;
pub mod site;
pub mod timers;
pub mod watch;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use sitewarden_core::Notifier;

const AT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Local wall-clock time for `--at "YYYY-MM-DD HH:MM"`, or now.
pub fn local_now(at: Option<&str>) -> Result<NaiveDateTime, Box<dyn std::error::Error>> {
    match at {
        Some(at) => Ok(NaiveDateTime::parse_from_str(at, AT_FORMAT)
            .map_err(|e| format!("invalid --at '{at}' (expected YYYY-MM-DD HH:MM): {e}"))?),
        None => Ok(Local::now().naive_local()),
    }
}

/// Same as [`local_now`], placed in the system time zone.
pub fn zoned_now(at: Option<&str>) -> Result<DateTime<Local>, Box<dyn std::error::Error>> {
    if at.is_none() {
        return Ok(Local::now());
    }
    let naive = local_now(at)?;
    Ok(Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| format!("{naive} does not exist in the local time zone"))?)
}

/// Prints notifications to stdout.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, title: &str, message: &str) {
        println!("[{title}] {message}");
    }
}
