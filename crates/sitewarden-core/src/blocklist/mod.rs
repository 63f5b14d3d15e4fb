//! Blocked sites: records, host normalization and host matching.
//!
//! [`Blocklist`] is the CRUD layer the settings page and the CLI use to edit
//! the persisted collections.

mod service;

pub use service::{Blocklist, SiteAdded};

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::error::{UrlError, ValidationError};
use crate::schedule::Schedule;

/// A blocked hostname, optionally with its own schedule.
///
/// `schedule: None` means the site follows the global schedule set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedSite {
    pub url: String,
    #[serde(default)]
    pub schedule: Option<Schedule>,
}

impl BlockedSite {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.trim().to_ascii_lowercase(),
            schedule: None,
        }
    }

    /// Identity comparison: urls are compared case-insensitively.
    pub fn is(&self, url: &str) -> bool {
        self.url.trim().eq_ignore_ascii_case(url.trim())
    }
}

/// How a navigation host is compared with a stored site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Either string contains the other. Loose: `example.com` also matches
    /// `notexample.com`.
    Containment,
    /// Host equals the site or is a subdomain of it.
    #[default]
    Suffix,
    /// Host equals the site.
    Exact,
}

impl MatchPolicy {
    pub fn matches(self, host: &str, site: &str) -> bool {
        let host = host.trim().to_ascii_lowercase();
        let site = site.trim().to_ascii_lowercase();
        if host.is_empty() || site.is_empty() {
            return false;
        }
        match self {
            MatchPolicy::Containment => host.contains(&site) || site.contains(&host),
            MatchPolicy::Suffix => {
                let (host, site) = (strip_www(&host), strip_www(&site));
                host == site
                    || host
                        .strip_suffix(site)
                        .is_some_and(|prefix| prefix.ends_with('.'))
            }
            MatchPolicy::Exact => strip_www(&host) == strip_www(&site),
        }
    }
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchPolicy::Containment => f.write_str("containment"),
            MatchPolicy::Suffix => f.write_str("suffix"),
            MatchPolicy::Exact => f.write_str("exact"),
        }
    }
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// Lowercase hostname of a navigation target.
///
/// Inputs without a scheme (`example.com/path`, `localhost:3000`) are read
/// as `http://` URLs.
pub fn host_of(input: &str) -> Result<String, UrlError> {
    let trimmed = input.trim();
    let parsed = match Url::parse(trimmed) {
        Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) => url,
        Ok(_) if !trimmed.contains("://") => match Url::parse(&format!("http://{trimmed}")) {
            Ok(url) => url,
            Err(_) => return Err(UrlError::MissingHost(trimmed.to_string())),
        },
        Ok(_) => return Err(UrlError::MissingHost(trimmed.to_string())),
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("http://{trimmed}"))
            .map_err(|source| UrlError::Malformed {
                input: trimmed.to_string(),
                source,
            })?,
        Err(source) => {
            return Err(UrlError::Malformed {
                input: trimmed.to_string(),
                source,
            })
        }
    };
    parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| UrlError::MissingHost(trimmed.to_string()))
}

/// Stored site form of a URL: its host, lowercase, without a leading `www.`.
pub fn site_from_url(input: &str) -> Result<String, UrlError> {
    let host = host_of(input)?;
    let site = strip_www(&host);
    if site.is_empty() {
        return Err(UrlError::MissingHost(input.trim().to_string()));
    }
    Ok(site.to_string())
}

/// Reduce user input to the stored site form. Anything [`host_of`] accepts
/// works: bare hosts, full URLs of any scheme, inputs with a port or
/// userinfo.
pub fn normalize_site_input(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyHost(input.to_string()));
    }
    let host = host_of(trimmed).map_err(|e| ValidationError::InvalidHost {
        input: input.to_string(),
        reason: e.to_string(),
    })?;
    let site = strip_www(&host);
    if site.is_empty() {
        return Err(ValidationError::EmptyHost(input.to_string()));
    }
    Ok(site.to_string())
}

/// How a blocked site is currently governed, as shown in the settings list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteStatus {
    Custom(Schedule),
    AlwaysBlocked,
    GlobalSchedule,
}

impl SiteStatus {
    pub fn of(site: &BlockedSite, global_schedules: &[Schedule]) -> Self {
        match &site.schedule {
            Some(schedule) => SiteStatus::Custom(schedule.clone()),
            None if global_schedules.is_empty() => SiteStatus::AlwaysBlocked,
            None => SiteStatus::GlobalSchedule,
        }
    }
}

impl fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteStatus::Custom(schedule) => write!(f, "Custom schedule: {}", schedule.label()),
            SiteStatus::AlwaysBlocked => f.write_str("Blocked at all times"),
            SiteStatus::GlobalSchedule => f.write_str("Using global schedule"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::DayFilter;

    #[test]
    fn host_of_full_urls() {
        assert_eq!(host_of("https://Sub.Example.com/a?b=c").unwrap(), "sub.example.com");
        assert_eq!(host_of("http://example.com:8080/").unwrap(), "example.com");
    }

    #[test]
    fn host_of_scheme_less_inputs() {
        assert_eq!(host_of("example.com/path").unwrap(), "example.com");
        assert_eq!(host_of("sub.example.com").unwrap(), "sub.example.com");
        assert_eq!(host_of("localhost:3000/x").unwrap(), "localhost");
    }

    #[test]
    fn host_of_rejects_hostless_and_garbage() {
        assert!(matches!(host_of("about:blank"), Err(UrlError::MissingHost(_))));
        assert!(matches!(host_of("file:///etc/hosts"), Err(UrlError::MissingHost(_))));
        assert!(host_of("http://").is_err());
        assert!(host_of("").is_err());
    }

    #[test]
    fn containment_matches_either_direction() {
        let p = MatchPolicy::Containment;
        assert!(p.matches("sub.example.com", "example.com"));
        assert!(p.matches("example.com", "www.example.com"));
        assert!(p.matches("notexample.com", "example.com"));
        assert!(!p.matches("other.org", "example.com"));
    }

    #[test]
    fn suffix_matches_subdomains_only() {
        let p = MatchPolicy::Suffix;
        assert!(p.matches("example.com", "example.com"));
        assert!(p.matches("sub.example.com", "example.com"));
        assert!(p.matches("www.example.com", "example.com"));
        assert!(p.matches("example.com", "www.example.com"));
        assert!(!p.matches("notexample.com", "example.com"));
        assert!(!p.matches("example.com", "sub.example.com"));
    }

    #[test]
    fn exact_ignores_case_and_www() {
        let p = MatchPolicy::Exact;
        assert!(p.matches("WWW.Example.com", "example.com"));
        assert!(!p.matches("sub.example.com", "example.com"));
    }

    #[test]
    fn empty_site_never_matches() {
        for p in [MatchPolicy::Containment, MatchPolicy::Suffix, MatchPolicy::Exact] {
            assert!(!p.matches("example.com", ""), "{p}");
        }
    }

    #[test]
    fn normalize_strips_scheme_www_and_path() {
        assert_eq!(normalize_site_input("  HTTPS://www.Example.com/a/b ").unwrap(), "example.com");
        assert_eq!(normalize_site_input("news.site?x=1").unwrap(), "news.site");
        assert_eq!(normalize_site_input("http://example.com").unwrap(), "example.com");
        assert!(matches!(normalize_site_input("   "), Err(ValidationError::EmptyHost(_))));
    }

    #[test]
    fn normalize_drops_port_userinfo_and_other_schemes() {
        assert_eq!(normalize_site_input("example.com:8080").unwrap(), "example.com");
        assert_eq!(normalize_site_input("ftp://files.example.org/x").unwrap(), "files.example.org");
        assert_eq!(normalize_site_input("user@mail.example.net").unwrap(), "mail.example.net");
    }

    #[test]
    fn normalized_sites_match_their_navigations() {
        let cases = [
            ("example.com:8080", "http://example.com:8080/"),
            ("ftp://files.example.org/x", "ftp://files.example.org/x"),
            ("user@mail.example.net", "https://mail.example.net/"),
        ];
        for (input, navigation) in cases {
            let site = normalize_site_input(input).unwrap();
            let host = host_of(navigation).unwrap();
            assert!(MatchPolicy::default().matches(&host, &site), "{input} vs {navigation}");
        }
    }

    #[test]
    fn normalize_rejects_inputs_without_a_host() {
        assert!(matches!(normalize_site_input("about:blank"), Err(ValidationError::InvalidHost { .. })));
        assert!(matches!(normalize_site_input("file:///etc/hosts"), Err(ValidationError::InvalidHost { .. })));
        assert!(normalize_site_input("https://www.").is_err());
    }

    #[test]
    fn site_from_url_strips_www() {
        assert_eq!(site_from_url("https://www.news.site/article/1").unwrap(), "news.site");
        assert_eq!(site_from_url("https://news.site/").unwrap(), normalize_site_input("news.site").unwrap());
    }

    #[test]
    fn status_text() {
        let mut site = BlockedSite::new("example.com");
        let global = vec![Schedule::parse("09:00", "17:00", DayFilter::All).unwrap()];
        assert_eq!(SiteStatus::of(&site, &[]).to_string(), "Blocked at all times");
        assert_eq!(SiteStatus::of(&site, &global).to_string(), "Using global schedule");
        site.schedule = Some(Schedule::parse("10:00", "11:00", DayFilter::Weekends).unwrap());
        assert_eq!(
            SiteStatus::of(&site, &global).to_string(),
            "Custom schedule: 10:00 - 11:00 (weekends)"
        );
    }
}
