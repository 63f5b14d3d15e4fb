//! Allow/block decisions for a single navigation.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

use crate::blocklist::{host_of, BlockedSite, MatchPolicy};
use crate::error::UrlError;
use crate::schedule::{active_schedule, Schedule, ScheduleId};

/// Why a navigation was blocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockReason {
    /// No site schedule and no global schedules.
    AlwaysBlocked,
    /// The site's own schedule is active.
    SiteSchedule { schedule_id: ScheduleId },
    /// A global schedule is active.
    GlobalSchedule { schedule_id: ScheduleId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Decision {
    Allow,
    Block {
        /// Stored url of the matching site.
        site: String,
        reason: BlockReason,
    },
}

impl Decision {
    pub fn is_block(&self) -> bool {
        matches!(self, Decision::Block { .. })
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allow => f.write_str("allow"),
            Decision::Block { site, reason } => match reason {
                BlockReason::AlwaysBlocked => write!(f, "block ({site}: blocked at all times)"),
                BlockReason::SiteSchedule { schedule_id } => {
                    write!(f, "block ({site}: site schedule {schedule_id})")
                }
                BlockReason::GlobalSchedule { schedule_id } => {
                    write!(f, "block ({site}: global schedule {schedule_id})")
                }
            },
        }
    }
}

/// Decides whether a navigation target is blocked right now.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockEngine {
    policy: MatchPolicy,
}

impl BlockEngine {
    pub fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// First site matching `host`, in list order.
    pub fn find_site<'a>(&self, host: &str, sites: &'a [BlockedSite]) -> Option<&'a BlockedSite> {
        sites.iter().find(|site| self.policy.matches(host, &site.url))
    }

    /// Decide for `target_url` at local time `now`.
    ///
    /// # Errors
    ///
    /// Fails only when the target has no parseable host.
    pub fn evaluate(
        &self,
        target_url: &str,
        sites: &[BlockedSite],
        global_schedules: &[Schedule],
        now: NaiveDateTime,
    ) -> Result<Decision, UrlError> {
        let host = host_of(target_url)?;
        let Some(site) = self.find_site(&host, sites) else {
            return Ok(Decision::Allow);
        };

        let reason = match &site.schedule {
            None if global_schedules.is_empty() => Some(BlockReason::AlwaysBlocked),
            Some(own) => active_schedule(now, Some(own)).map(|s| BlockReason::SiteSchedule {
                schedule_id: s.id.clone(),
            }),
            None => active_schedule(now, global_schedules).map(|s| BlockReason::GlobalSchedule {
                schedule_id: s.id.clone(),
            }),
        };

        let decision = match reason {
            Some(reason) => Decision::Block {
                site: site.url.clone(),
                reason,
            },
            None => Decision::Allow,
        };
        tracing::debug!(%host, site = %site.url, %decision, "navigation evaluated");
        Ok(decision)
    }

    /// Like [`evaluate`](Self::evaluate), but a malformed target is allowed.
    pub fn decide(
        &self,
        target_url: &str,
        sites: &[BlockedSite],
        global_schedules: &[Schedule],
        now: NaiveDateTime,
    ) -> Decision {
        self.evaluate(target_url, sites, global_schedules, now)
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "cannot evaluate navigation target, allowing");
                Decision::Allow
            })
    }
}

/// [`BlockEngine::decide`] with the default match policy.
pub fn decide(target_url: &str, sites: &[BlockedSite], global_schedules: &[Schedule], now: NaiveDateTime) -> Decision {
    BlockEngine::default().decide(target_url, sites, global_schedules, now)
}
