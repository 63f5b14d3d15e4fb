//! # Sitewarden Core Library
//!
//! Schedule-aware site blocking. Given a navigation target, the blocked-site
//! list and the schedule set, decide whether to allow the page or send the
//! tab to an interstitial, and keep wake timers armed at every schedule
//! boundary.
//!
//! ## Architecture
//!
//! - **Schedules**: `HH:MM` windows with a day filter, evaluated against
//!   local wall-clock time, plus next-occurrence calculation for boundaries
//! - **Engine**: host matching and the per-site-over-global precedence rules,
//!   and the navigation handler that redirects blocked tabs
//! - **Timers**: one start/end timer pair per schedule, rebuilt on every wake
//! - **Store**: the key-value store seam, JSON-file and in-memory stores,
//!   and TOML configuration
//!
//! ## Key Components
//!
//! - [`is_active`]: schedule evaluation
//! - [`next_trigger`]: next boundary occurrence
//! - [`BlockEngine`]: allow/block decisions
//! - [`NavigationGuard`]: navigation event handler
//! - [`TimerCoordinator`]: wake timer bookkeeping
//! - [`Blocklist`]: CRUD over blocked sites and global schedules

pub mod blocklist;
pub mod browser;
pub mod engine;
pub mod error;
pub mod schedule;
pub mod store;
pub mod timers;

pub use blocklist::{BlockedSite, Blocklist, MatchPolicy, SiteAdded, SiteStatus};
pub use browser::{NavigationEvent, Navigator, Notifier, SilentNotifier, TabId};
pub use engine::{decide, BlockEngine, BlockReason, Decision, NavigationGuard};
pub use error::{ConfigError, CoreError, StoreError, UrlError, ValidationError};
pub use schedule::{is_active, next_trigger, Boundary, ClockTime, DayFilter, Schedule, ScheduleId};
pub use store::{Config, JsonFileStore, KeyValueStore, MemoryStore, Snapshot};
pub use timers::{TimerCoordinator, TimerKey, TimerService, TokioTimerService};
