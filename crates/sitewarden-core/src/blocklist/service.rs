//! CRUD over the persisted blocked-site list and global schedule set.
//!
//! Every operation reads the current collection, edits it and writes it back
//! under its own key. Nothing is cached between calls.

use super::{normalize_site_input, site_from_url, BlockedSite, SiteStatus};
use crate::browser::Notifier;
use crate::error::{CoreError, Result};
use crate::schedule::{ClockTime, DayFilter, Schedule, ScheduleId};
use crate::store::{self, KeyValueStore, Snapshot};

/// Outcome of adding a site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteAdded {
    /// Normalized url as stored.
    pub url: String,
    /// False when the site was already on the list.
    pub added: bool,
}

pub struct Blocklist<S> {
    store: S,
}

impl<S: KeyValueStore> Blocklist<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sites(&self) -> Result<Vec<BlockedSite>> {
        Ok(store::read_blocked_sites(&self.store)?)
    }

    pub fn schedules(&self) -> Result<Vec<Schedule>> {
        Ok(store::read_schedules(&self.store)?)
    }

    pub fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot::read(&self.store)?)
    }

    /// Add a site typed by the user. Scheme, `www.` and path are dropped.
    pub fn add_site(&self, input: &str) -> Result<SiteAdded> {
        let url = normalize_site_input(input)?;
        self.add_normalized(url)
    }

    /// Add the host of a full URL, e.g. the page in the active tab. The host
    /// is stored the same way [`add_site`](Self::add_site) stores it.
    pub fn add_site_from_url(&self, url: &str) -> Result<SiteAdded> {
        let site = site_from_url(url)?;
        self.add_normalized(site)
    }

    /// "Block this site" from a page or link context menu.
    ///
    /// Sends a notification only when the host was not already blocked.
    pub fn block_this_site(&self, url: &str, notifier: &dyn Notifier) -> Result<SiteAdded> {
        let outcome = self.add_site_from_url(url)?;
        if outcome.added {
            notifier.notify(
                "Site Blocked",
                &format!("{} has been added to your blocked sites list.", outcome.url),
            );
        }
        Ok(outcome)
    }

    fn add_normalized(&self, url: String) -> Result<SiteAdded> {
        let mut sites = self.sites()?;
        if sites.iter().any(|site| site.is(&url)) {
            tracing::debug!(%url, "site already blocked");
            return Ok(SiteAdded { url, added: false });
        }
        sites.push(BlockedSite::new(&url));
        store::write_blocked_sites(&self.store, &sites)?;
        tracing::info!(%url, "site blocked");
        Ok(SiteAdded { url, added: true })
    }

    pub fn remove_site(&self, url: &str) -> Result<()> {
        let mut sites = self.sites()?;
        let before = sites.len();
        sites.retain(|site| !site.is(url));
        if sites.len() == before {
            return Err(CoreError::site_not_found(url));
        }
        store::write_blocked_sites(&self.store, &sites)?;
        tracing::info!(url, "site unblocked");
        Ok(())
    }

    /// Give a site its own schedule, overriding the global set.
    pub fn set_site_schedule(&self, url: &str, schedule: Schedule) -> Result<()> {
        self.update_site(url, |site| site.schedule = Some(schedule))?;
        tracing::info!(url, "site schedule set");
        Ok(())
    }

    /// Return a site to the global schedule set.
    pub fn clear_site_schedule(&self, url: &str) -> Result<()> {
        self.update_site(url, |site| site.schedule = None)?;
        tracing::info!(url, "site schedule cleared");
        Ok(())
    }

    fn update_site(&self, url: &str, edit: impl FnOnce(&mut BlockedSite)) -> Result<()> {
        let mut sites = self.sites()?;
        let site = sites
            .iter_mut()
            .find(|site| site.is(url))
            .ok_or_else(|| CoreError::site_not_found(url))?;
        edit(site);
        store::write_blocked_sites(&self.store, &sites)?;
        Ok(())
    }

    /// Append to the global schedule set. Returns the new schedule's id.
    pub fn add_schedule(&self, schedule: Schedule) -> Result<ScheduleId> {
        let mut schedules = self.schedules()?;
        let id = schedule.id.clone();
        tracing::info!(id = %id, window = %schedule.label(), "global schedule added");
        schedules.push(schedule);
        store::write_schedules(&self.store, &schedules)?;
        Ok(id)
    }

    pub fn remove_schedule(&self, id: &str) -> Result<Schedule> {
        let mut schedules = self.schedules()?;
        let index = schedules
            .iter()
            .position(|schedule| schedule.id == id)
            .ok_or_else(|| CoreError::schedule_not_found(id))?;
        let removed = schedules.remove(index);
        store::write_schedules(&self.store, &schedules)?;
        tracing::info!(id, "global schedule removed");
        Ok(removed)
    }

    /// Remove every global schedule with exactly this window. Returns how many
    /// were removed.
    pub fn remove_schedule_matching(&self, start_time: ClockTime, end_time: ClockTime, days: DayFilter) -> Result<usize> {
        let mut schedules = self.schedules()?;
        let before = schedules.len();
        schedules.retain(|schedule| !schedule.same_window(start_time, end_time, days));
        let removed = before - schedules.len();
        if removed > 0 {
            store::write_schedules(&self.store, &schedules)?;
            tracing::info!(removed, "global schedules removed");
        }
        Ok(removed)
    }

    /// Every site with the text describing how it is governed.
    pub fn statuses(&self) -> Result<Vec<(BlockedSite, SiteStatus)>> {
        let snapshot = self.snapshot()?;
        Ok(snapshot
            .blocked_sites
            .iter()
            .map(|site| (site.clone(), SiteStatus::of(site, &snapshot.schedules)))
            .collect())
    }
}
