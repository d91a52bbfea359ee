//! Two-phase scan orchestration
//!
//! Phase 1 fans out over the target list and scrapes each page for plugin
//! references. Phase 2 starts only after every scrape has finished, then
//! fans out over the deduplicated slug set so each slug is probed exactly
//! once no matter how many sites reference it. Results are folded back on
//! the caller's task as workers complete.

use crate::error::{Error, Result};
use crate::extract::extract_slugs;
use crate::fetch::FetchClient;
use crate::registry::{ClaimChecker, ClaimStatus};
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::{Host, Url};

/// Default number of concurrent workers per phase
pub const DEFAULT_WORKERS: usize = 10;

/// Allowed URL schemes
const ALLOWED_SCHEMES: &[&str] = &["http", "https"];

/// Progress notification emitted while a scan runs
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// Phase 1 is starting
    ExtractionStarted { targets: usize },
    /// A target finished scraping; `index` counts completions, 1-based
    TargetScraped {
        index: usize,
        total: usize,
        target: String,
        slugs_found: usize,
        error: Option<String>,
    },
    /// Phase 2 is starting
    VerificationStarted { slugs: usize },
    /// A slug finished its registry check
    SlugChecked {
        index: usize,
        total: usize,
        slug: String,
        status: ClaimStatus,
    },
}

/// Everything a finished scan knows
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Final site URL mapped to the slugs that site references. Targets that
    /// could not be fetched keep an entry with an empty set, keyed by the
    /// target string they were given as.
    pub findings: HashMap<String, HashSet<String>>,
    /// Slug mapped to its registry claim status, shared across all sites
    pub verdicts: HashMap<String, ClaimStatus>,
}

impl ScanOutcome {
    /// Number of distinct slugs seen across all targets
    pub fn unique_slugs(&self) -> usize {
        self.verdicts.len()
    }
}

/// Result of scraping one target
struct TargetScrape {
    target: String,
    site: String,
    slugs: HashSet<String>,
    error: Option<Error>,
}

impl TargetScrape {
    fn failed(target: String, error: Error) -> Self {
        Self {
            site: target.clone(),
            target,
            slugs: HashSet::new(),
            error: Some(error),
        }
    }
}

/// Builder for configuring a scan
#[derive(Debug)]
pub struct ScanBuilder {
    targets: Vec<String>,
    workers: usize,
    allow_private: bool,
    registry: Option<String>,
}

impl ScanBuilder {
    /// Create a new builder over the given targets
    pub fn new(targets: Vec<String>) -> Self {
        Self {
            targets,
            workers: DEFAULT_WORKERS,
            allow_private: false,
            registry: None,
        }
    }

    /// Concurrent workers per phase, clamped to at least 1
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Allow scanning private/internal IP addresses (localhost, 192.168.x.x, etc.)
    ///
    /// By default, SSRF protection blocks requests to internal networks.
    /// Enable this to scan local WordPress installations.
    pub fn allow_private(mut self, allow: bool) -> Self {
        self.allow_private = allow;
        self
    }

    /// Override the registry base used for claim probes
    pub fn registry(mut self, base: impl Into<String>) -> Self {
        self.registry = Some(base.into());
        self
    }

    /// Build the scan, trimming and deduplicating targets
    pub fn build(self) -> Result<Scan> {
        let mut targets: Vec<String> = self
            .targets
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        targets.sort();
        targets.dedup();

        if targets.is_empty() {
            return Err(Error::NoTargets);
        }

        let fetch = FetchClient::new()?;
        let checker = match self.registry {
            Some(base) => ClaimChecker::with_registry(fetch.clone(), base),
            None => ClaimChecker::new(fetch.clone()),
        };

        Ok(Scan {
            fetch,
            checker,
            targets,
            workers: self.workers,
            allow_private: self.allow_private,
        })
    }
}

/// A configured batch scan over a list of targets
#[derive(Debug)]
pub struct Scan {
    fetch: FetchClient,
    checker: ClaimChecker,
    targets: Vec<String>,
    workers: usize,
    allow_private: bool,
}

impl Scan {
    /// Create a builder for configuring a scan
    ///
    /// # Example
    ///
    /// ```no_run
    /// use wp_unclaimed::Scan;
    ///
    /// let scan = Scan::builder(vec!["https://example.com".to_string()])
    ///     .workers(20)
    ///     .build()?;
    /// # Ok::<(), wp_unclaimed::Error>(())
    /// ```
    pub fn builder(targets: Vec<String>) -> ScanBuilder {
        ScanBuilder::new(targets)
    }

    /// Number of deduplicated targets this scan will visit
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Run the scan without progress reporting
    pub async fn run(&self) -> ScanOutcome {
        self.run_with_progress(|_| {}).await
    }

    /// Run the scan, reporting progress through `progress`.
    ///
    /// A failed target never aborts the batch; it keeps an empty findings
    /// entry and its error rides along on the progress event. Phase 2 is
    /// skipped entirely when no target referenced any plugin.
    pub async fn run_with_progress<F>(&self, mut progress: F) -> ScanOutcome
    where
        F: FnMut(ScanEvent),
    {
        let semaphore = Arc::new(Semaphore::new(self.workers));

        // Phase 1: scrape every target, folding slugs into one global set
        progress(ScanEvent::ExtractionStarted {
            targets: self.targets.len(),
        });

        let mut findings: HashMap<String, HashSet<String>> = HashMap::new();
        let mut all_slugs: HashSet<String> = HashSet::new();

        let mut scrapes: JoinSet<TargetScrape> = JoinSet::new();
        for target in &self.targets {
            let fetch = self.fetch.clone();
            let target = target.clone();
            let allow_private = self.allow_private;
            let semaphore = Arc::clone(&semaphore);
            scrapes.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return TargetScrape::failed(
                            target,
                            Error::Transport("worker pool closed".to_string()),
                        );
                    }
                };
                scrape_target(&fetch, target, allow_private).await
            });
        }

        let total = self.targets.len();
        let mut completed = 0;
        while let Some(joined) = scrapes.join_next().await {
            let Ok(scrape) = joined else { continue };
            completed += 1;

            let TargetScrape {
                target,
                site,
                slugs,
                error,
            } = scrape;
            let slugs_found = slugs.len();
            all_slugs.extend(slugs.iter().cloned());
            findings.entry(site).or_default().extend(slugs);

            progress(ScanEvent::TargetScraped {
                index: completed,
                total,
                target,
                slugs_found,
                error: error.map(|e| e.to_string()),
            });
        }

        // Phase 2: one claim check per unique slug
        let mut verdicts: HashMap<String, ClaimStatus> = HashMap::new();
        if !all_slugs.is_empty() {
            progress(ScanEvent::VerificationStarted {
                slugs: all_slugs.len(),
            });

            let mut checks: JoinSet<(String, ClaimStatus)> = JoinSet::new();
            for slug in &all_slugs {
                let checker = self.checker.clone();
                let slug = slug.clone();
                let semaphore = Arc::clone(&semaphore);
                checks.spawn(async move {
                    let _permit = match semaphore.acquire_owned().await {
                        Ok(permit) => permit,
                        Err(_) => return (slug, ClaimStatus::Error),
                    };
                    let status = checker.check(&slug).await;
                    (slug, status)
                });
            }

            let total = all_slugs.len();
            let mut completed = 0;
            while let Some(joined) = checks.join_next().await {
                let Ok((slug, status)) = joined else { continue };
                completed += 1;
                verdicts.insert(slug.clone(), status);

                progress(ScanEvent::SlugChecked {
                    index: completed,
                    total,
                    slug,
                    status,
                });
            }
        }

        ScanOutcome { findings, verdicts }
    }
}

/// Scrape one target: validate, fetch, extract.
///
/// Failures degrade to an empty slug set keyed by the original target
/// string, with the error attached as a diagnostic.
async fn scrape_target(fetch: &FetchClient, target: String, allow_private: bool) -> TargetScrape {
    let url = match normalize_target(&target, allow_private) {
        Ok(url) => url,
        Err(e) => return TargetScrape::failed(target, e),
    };

    match fetch.fetch_body(url.as_str()).await {
        Ok(page) => TargetScrape {
            target,
            site: page.final_url,
            slugs: extract_slugs(&page.body),
            error: None,
        },
        Err(e) => TargetScrape::failed(target, e),
    }
}

/// Parse and validate a target URL
fn normalize_target(target: &str, allow_private: bool) -> Result<Url> {
    // Auto-add https:// if no scheme provided
    let with_scheme = if target.contains("://") {
        target.to_string()
    } else {
        format!("https://{}", target)
    };

    let url = Url::parse(&with_scheme).map_err(|e| Error::InvalidUrl(e.to_string()))?;

    // Validate URL scheme (SSRF protection)
    if !ALLOWED_SCHEMES.contains(&url.scheme()) {
        return Err(Error::InvalidUrl(format!(
            "scheme '{}' not allowed (use http or https)",
            url.scheme()
        )));
    }

    // Validate host is not internal/private (SSRF protection). Only literal
    // addresses are checked; hostnames are not resolved here.
    if !allow_private {
        match url.host() {
            None => return Err(Error::InvalidUrl("missing host".to_string())),
            Some(Host::Domain(domain)) => {
                // Block localhost variants
                if domain == "localhost" || domain.ends_with(".localhost") {
                    return Err(Error::InvalidUrl("localhost not allowed".to_string()));
                }
            }
            Some(Host::Ipv4(ip)) => {
                if is_internal_ip(IpAddr::V4(ip)) {
                    return Err(Error::InvalidUrl(format!(
                        "internal/private IP address not allowed: {}",
                        ip
                    )));
                }
            }
            Some(Host::Ipv6(ip)) => {
                if is_internal_ip(IpAddr::V6(ip)) {
                    return Err(Error::InvalidUrl(format!(
                        "internal/private IP address not allowed: {}",
                        ip
                    )));
                }
            }
        }
    }

    Ok(url)
}

/// Check if an IP address is internal/private (RFC 1918, link-local, loopback, etc.)
fn is_internal_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(ipv4) => {
            ipv4.is_loopback()                      // 127.0.0.0/8
                || ipv4.is_private()                // 10.0.0.0/8, 172.16.0.0/12, 192.168.0.0/16
                || ipv4.is_link_local()             // 169.254.0.0/16
                || ipv4.is_broadcast()              // 255.255.255.255
                || ipv4.is_unspecified()            // 0.0.0.0
                // Shared address space 100.64.0.0/10
                || (ipv4.octets()[0] == 100 && (64..=127).contains(&ipv4.octets()[1]))
                // Documentation/test ranges
                || ipv4.octets()[..2] == [192, 0]
        }
        IpAddr::V6(ipv6) => {
            ipv6.is_loopback()                      // ::1
                || ipv6.is_unspecified()            // ::
                // Unique local addresses (fc00::/7)
                || (ipv6.segments()[0] & 0xfe00) == 0xfc00
                // Link-local (fe80::/10)
                || (ipv6.segments()[0] & 0xffc0) == 0xfe80
        }
    }
}
