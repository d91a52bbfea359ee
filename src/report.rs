//! Correlation of scan findings into report views

use crate::registry::ClaimStatus;
use crate::scan::ScanOutcome;
use serde::Serialize;

/// One vulnerable site and its unclaimed plugin slugs
#[derive(Debug, Clone, Serialize)]
pub struct SiteReport {
    /// Final site URL
    pub site: String,
    /// Unclaimed slugs the site references, sorted ascending
    pub unclaimed_plugins: Vec<String>,
}

/// Vulnerability report across all scanned sites
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Report {
    /// Entries for sites with at least one unclaimed slug, sorted by site
    pub sites: Vec<SiteReport>,
}

impl Report {
    /// Correlate findings with verdicts.
    ///
    /// A site earns an entry iff at least one of its slugs is `Unclaimed`.
    /// `Error` verdicts never contribute; an unverified slug is not a
    /// vulnerability.
    pub fn build(outcome: &ScanOutcome) -> Self {
        let mut sites = Vec::new();

        for (site, slugs) in &outcome.findings {
            let mut unclaimed: Vec<String> = slugs
                .iter()
                .filter(|slug| outcome.verdicts.get(*slug) == Some(&ClaimStatus::Unclaimed))
                .cloned()
                .collect();
            if unclaimed.is_empty() {
                continue;
            }
            unclaimed.sort();
            sites.push(SiteReport {
                site: site.clone(),
                unclaimed_plugins: unclaimed,
            });
        }

        sites.sort_by(|a, b| a.site.cmp(&b.site));
        Self { sites }
    }

    /// True when no site references an unclaimed slug
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

/// A slug and its verdict, for the verbose listing
#[derive(Debug, Clone)]
pub struct PluginVerdict {
    pub slug: String,
    pub status: ClaimStatus,
}

/// Every slug one site references, with statuses
#[derive(Debug, Clone)]
pub struct SiteInventory {
    pub site: String,
    pub plugins: Vec<PluginVerdict>,
}

impl SiteInventory {
    /// Build the per-site inventory for every scanned site, including sites
    /// where nothing was found. Slugs missing a verdict surface as `Error`.
    pub fn build_all(outcome: &ScanOutcome) -> Vec<SiteInventory> {
        let mut inventories: Vec<SiteInventory> = outcome
            .findings
            .iter()
            .map(|(site, slugs)| {
                let mut plugins: Vec<PluginVerdict> = slugs
                    .iter()
                    .map(|slug| PluginVerdict {
                        slug: slug.clone(),
                        status: outcome
                            .verdicts
                            .get(slug)
                            .copied()
                            .unwrap_or(ClaimStatus::Error),
                    })
                    .collect();
                plugins.sort_by(|a, b| a.slug.cmp(&b.slug));
                SiteInventory {
                    site: site.clone(),
                    plugins,
                }
            })
            .collect();

        inventories.sort_by(|a, b| a.site.cmp(&b.site));
        inventories
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    fn outcome_with(
        findings: &[(&str, &[&str])],
        verdicts: &[(&str, ClaimStatus)],
    ) -> ScanOutcome {
        ScanOutcome {
            findings: findings
                .iter()
                .map(|(site, slugs)| {
                    (
                        site.to_string(),
                        slugs.iter().map(|s| s.to_string()).collect::<HashSet<_>>(),
                    )
                })
                .collect::<HashMap<_, _>>(),
            verdicts: verdicts
                .iter()
                .map(|(slug, status)| (slug.to_string(), *status))
                .collect(),
        }
    }

    #[test]
    fn site_appears_only_with_an_unclaimed_slug() {
        let outcome = outcome_with(
            &[
                ("https://safe.example/", &["akismet"]),
                ("https://exposed.example/", &["akismet", "ghost-seo"]),
            ],
            &[
                ("akismet", ClaimStatus::Claimed),
                ("ghost-seo", ClaimStatus::Unclaimed),
            ],
        );

        let report = Report::build(&outcome);

        assert_eq!(report.sites.len(), 1);
        assert_eq!(report.sites[0].site, "https://exposed.example/");
        assert_eq!(report.sites[0].unclaimed_plugins, vec!["ghost-seo"]);
    }

    #[test]
    fn error_verdicts_never_trigger_a_report() {
        let outcome = outcome_with(
            &[("https://flaky.example/", &["mystery-plugin"])],
            &[("mystery-plugin", ClaimStatus::Error)],
        );

        let report = Report::build(&outcome);

        assert!(report.is_empty());
    }

    #[test]
    fn entries_are_sorted_for_stable_output() {
        let outcome = outcome_with(
            &[
                ("https://z.example/", &["zeta", "alpha"]),
                ("https://a.example/", &["alpha"]),
            ],
            &[
                ("alpha", ClaimStatus::Unclaimed),
                ("zeta", ClaimStatus::Unclaimed),
            ],
        );

        let report = Report::build(&outcome);

        assert_eq!(report.sites[0].site, "https://a.example/");
        assert_eq!(report.sites[1].site, "https://z.example/");
        assert_eq!(report.sites[1].unclaimed_plugins, vec!["alpha", "zeta"]);
    }

    #[test]
    fn empty_outcome_builds_an_empty_report() {
        let report = Report::build(&ScanOutcome::default());
        assert!(report.is_empty());
    }

    #[test]
    fn report_serializes_as_a_bare_array() {
        let outcome = outcome_with(
            &[("https://exposed.example/", &["ghost-seo"])],
            &[("ghost-seo", ClaimStatus::Unclaimed)],
        );

        let value = serde_json::to_value(Report::build(&outcome)).unwrap();

        assert_eq!(
            value,
            serde_json::json!([{
                "site": "https://exposed.example/",
                "unclaimed_plugins": ["ghost-seo"],
            }])
        );
    }

    #[test]
    fn inventory_keeps_sites_without_plugins() {
        let outcome = outcome_with(
            &[
                ("https://bare.example/", &[]),
                ("https://busy.example/", &["akismet"]),
            ],
            &[("akismet", ClaimStatus::Claimed)],
        );

        let inventories = SiteInventory::build_all(&outcome);

        assert_eq!(inventories.len(), 2);
        assert_eq!(inventories[0].site, "https://bare.example/");
        assert!(inventories[0].plugins.is_empty());
        assert_eq!(inventories[1].plugins[0].slug, "akismet");
        assert_eq!(inventories[1].plugins[0].status, ClaimStatus::Claimed);
    }

    #[test]
    fn inventory_defaults_missing_verdicts_to_error() {
        let outcome = outcome_with(&[("https://odd.example/", &["unchecked"])], &[]);

        let inventories = SiteInventory::build_all(&outcome);

        assert_eq!(inventories[0].plugins[0].status, ClaimStatus::Error);
    }
}
