//! Long-running host: keeps boundary timers armed and reports what is
//! blocked each time a window opens or closes. The store is polled so edits
//! made by other invocations re-arm the timers.

use chrono::Local;
use sitewarden_core::{
    BlockEngine, Config, JsonFileStore, KeyValueStore, Snapshot, TimerCoordinator, TimerService, TokioTimerService,
};
use std::time::Duration;
use tokio::time::MissedTickBehavior;

pub fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(watch(config))
}

async fn watch(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = JsonFileStore::open()?;
    let engine = BlockEngine::new(config.blocking.match_policy);
    let (service, mut fired) = TokioTimerService::new();
    let mut coordinator = TimerCoordinator::new(service);

    let armed = coordinator.rebuild_from_store(&store, &Local::now());
    println!("watching {} ({armed} timers armed)", store.path().display());
    report(&store, &engine, &coordinator);

    let mut poll = tokio::time::interval(Duration::from_secs(config.watch.poll_secs.max(1)));
    poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            Some(id) = fired.recv() => {
                println!("{id} reached");
                let armed = coordinator.on_fire(&id, &store, &Local::now());
                tracing::debug!(armed, "timers rebuilt");
                report(&store, &engine, &coordinator);
            }
            _ = poll.tick() => {
                if let Some(armed) = coordinator.sync_with_store(&store, &Local::now()) {
                    println!("settings changed ({armed} timers armed)");
                    report(&store, &engine, &coordinator);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted, stopping watch");
                println!("stopped");
                break;
            }
        }
    }
    Ok(())
}

fn report<T: TimerService>(store: &impl KeyValueStore, engine: &BlockEngine, coordinator: &TimerCoordinator<T>) {
    let snapshot = Snapshot::read(store).unwrap_or_default();
    let now = Local::now().naive_local();
    let blocked: Vec<&str> = snapshot
        .blocked_sites
        .iter()
        .filter(|site| {
            engine
                .decide(&site.url, &snapshot.blocked_sites, &snapshot.schedules, now)
                .is_block()
        })
        .map(|site| site.url.as_str())
        .collect();

    if blocked.is_empty() {
        println!("blocking: nothing");
    } else {
        println!("blocking: {}", blocked.join(", "));
    }
    if let Some((key, at)) = coordinator.next_wake() {
        println!("next: {key} at {}", at.with_timezone(&Local).format("%Y-%m-%d %H:%M"));
    }
}
