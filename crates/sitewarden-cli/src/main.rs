use clap::{Parser, Subcommand};
use sitewarden_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "sitewarden-cli", version, about = "Sitewarden CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Blocked site management
    Site {
        #[command(subcommand)]
        action: commands::site::SiteAction,
    },
    /// Global schedule management
    Schedule {
        #[command(subcommand)]
        action: commands::schedule::ScheduleAction,
    },
    /// Decide whether a URL would be blocked
    Check(commands::check::CheckArgs),
    /// Show the next firing of every schedule boundary
    Timers(commands::timers::TimersArgs),
    /// Keep boundary timers armed and report each crossing
    Watch,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    init_logging(&config);

    let result = match cli.command {
        Commands::Site { action } => commands::site::run(action, &config),
        Commands::Schedule { action } => commands::schedule::run(action),
        Commands::Check(args) => commands::check::run(args, &config),
        Commands::Timers(args) => commands::timers::run(args),
        Commands::Watch => commands::watch::run(&config),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
