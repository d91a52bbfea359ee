//! Claim checks against the official WordPress plugin registry

use crate::fetch::FetchClient;
use reqwest::StatusCode;
use serde::Serialize;
use std::fmt;

/// Registry base probed for slug existence
const REGISTRY_BASE: &str = "https://plugins.svn.wordpress.org";

/// Public page where an unclaimed slug can be registered
const CLAIM_BASE: &str = "https://wordpress.org/plugins";

/// Registry-verified state of a plugin slug
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    /// The registry answered anything but 404; the slug is taken
    Claimed,
    /// The registry answered 404; anyone can register the slug
    Unclaimed,
    /// The probe failed in transit; existence is indeterminate
    Error,
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Claimed => write!(f, "claimed"),
            Self::Unclaimed => write!(f, "unclaimed"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Where an unclaimed slug can be registered
pub fn claim_url(slug: &str) -> String {
    format!("{}/{}/", CLAIM_BASE, slug)
}

/// Checks whether plugin slugs are claimed on the registry
#[derive(Debug, Clone)]
pub struct ClaimChecker {
    fetch: FetchClient,
    registry_base: String,
}

impl ClaimChecker {
    /// Create a checker against the official registry
    pub fn new(fetch: FetchClient) -> Self {
        Self::with_registry(fetch, REGISTRY_BASE)
    }

    /// Create a checker against a different registry base
    pub fn with_registry(fetch: FetchClient, base: impl Into<String>) -> Self {
        let registry_base = base.into().trim_end_matches('/').to_string();
        Self {
            fetch,
            registry_base,
        }
    }

    /// Existence-probe URL for a slug
    pub fn probe_url(&self, slug: &str) -> String {
        format!("{}/{}/", self.registry_base, slug)
    }

    /// Determine whether `slug` is claimed on the registry.
    ///
    /// 404 is the only unclaimed signal. Every other terminal status counts
    /// as claimed, and a failed probe is `Error`; an inconclusive check must
    /// never mark a slug registrable.
    pub async fn check(&self, slug: &str) -> ClaimStatus {
        match self.fetch.probe_exists(&self.probe_url(slug)).await {
            Ok(status) if status == StatusCode::NOT_FOUND => ClaimStatus::Unclaimed,
            Ok(_) => ClaimStatus::Claimed,
            Err(_) => ClaimStatus::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn checker_for(server: &MockServer) -> ClaimChecker {
        ClaimChecker::with_registry(FetchClient::new().unwrap(), server.uri())
    }

    #[tokio::test]
    async fn not_found_means_unclaimed() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/ghost-plugin/"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let status = checker_for(&server).check("ghost-plugin").await;
        assert_eq!(status, ClaimStatus::Unclaimed);
    }

    #[tokio::test]
    async fn success_means_claimed() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/akismet/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let status = checker_for(&server).check("akismet").await;
        assert_eq!(status, ClaimStatus::Claimed);
    }

    #[tokio::test]
    async fn ambiguous_statuses_stay_claimed() {
        let server = MockServer::start().await;
        for (slug, code) in [("forbidden", 403), ("throttled", 429), ("broken", 500)] {
            Mock::given(method("HEAD"))
                .and(path(format!("/{}/", slug)))
                .respond_with(ResponseTemplate::new(code))
                .mount(&server)
                .await;
        }

        let checker = checker_for(&server);
        assert_eq!(checker.check("forbidden").await, ClaimStatus::Claimed);
        assert_eq!(checker.check("throttled").await, ClaimStatus::Claimed);
        assert_eq!(checker.check("broken").await, ClaimStatus::Claimed);
    }

    #[tokio::test]
    async fn redirect_means_claimed() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/renamed-plugin/"))
            .respond_with(ResponseTemplate::new(301).insert_header("location", "/new-name/"))
            .mount(&server)
            .await;

        let status = checker_for(&server).check("renamed-plugin").await;
        assert_eq!(status, ClaimStatus::Claimed);
    }

    #[tokio::test]
    async fn transport_failure_is_indeterminate() {
        let checker =
            ClaimChecker::with_registry(FetchClient::new().unwrap(), "http://127.0.0.1:1");
        let status = checker.check("whatever").await;
        assert_eq!(status, ClaimStatus::Error);
    }

    #[test]
    fn probe_url_has_trailing_slash() {
        let checker = ClaimChecker::new(FetchClient::new().unwrap());
        assert_eq!(
            checker.probe_url("my-plugin"),
            "https://plugins.svn.wordpress.org/my-plugin/"
        );
    }

    #[test]
    fn registry_base_is_normalized() {
        let checker =
            ClaimChecker::with_registry(FetchClient::new().unwrap(), "http://mirror.test/");
        assert_eq!(checker.probe_url("my-plugin"), "http://mirror.test/my-plugin/");
    }

    #[test]
    fn claim_url_points_at_the_public_registry() {
        assert_eq!(
            claim_url("ghost-plugin"),
            "https://wordpress.org/plugins/ghost-plugin/"
        );
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ClaimStatus::Unclaimed).unwrap(),
            "\"unclaimed\""
        );
        assert_eq!(
            serde_json::to_string(&ClaimStatus::Claimed).unwrap(),
            "\"claimed\""
        );
    }

    #[test]
    fn status_displays_lowercase() {
        assert_eq!(ClaimStatus::Claimed.to_string(), "claimed");
        assert_eq!(ClaimStatus::Unclaimed.to_string(), "unclaimed");
        assert_eq!(ClaimStatus::Error.to_string(), "error");
    }
}
