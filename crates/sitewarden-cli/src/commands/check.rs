use clap::Args;
use sitewarden_core::{BlockEngine, Config, JsonFileStore, Snapshot};

use super::local_now;

#[derive(Args)]
pub struct CheckArgs {
    /// URL to decide for
    url: String,
    /// Local time to decide at, "YYYY-MM-DD HH:MM" (default: now)
    #[arg(long)]
    at: Option<String>,
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: CheckArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let now = local_now(args.at.as_deref())?;
    let snapshot = Snapshot::read(&JsonFileStore::open()?)?;
    let engine = BlockEngine::new(config.blocking.match_policy);
    let decision = engine.decide(&args.url, &snapshot.blocked_sites, &snapshot.schedules, now);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&decision)?);
    } else {
        println!("{decision}");
    }
    Ok(())
}
