//! URL construction for the Ranger Admin public v2 policy API.

use reqwest::Url;

use ranger_contracts::error::{RangerError, RangerResult};

/// Path segments between the endpoint and the policy resources.
pub const API_BASE_SEGMENTS: [&str; 4] = ["service", "public", "v2", "api"];

/// Builds request URLs relative to a configured endpoint.
///
/// The endpoint may carry a path prefix (e.g. a reverse-proxy mount point);
/// the API path is appended after it. Service names are percent-encoded as a
/// single path segment.
#[derive(Debug, Clone)]
pub struct PolicyRoutes {
    endpoint: Url,
}

impl PolicyRoutes {
    /// Parse `endpoint` (e.g. `http://ranger-admin:6080`).
    pub fn new(endpoint: &str) -> RangerResult<Self> {
        let endpoint = Url::parse(endpoint.trim_end_matches('/')).map_err(|e| {
            RangerError::ConfigError {
                reason: format!("invalid Ranger endpoint '{endpoint}': {e}"),
            }
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(RangerError::ConfigError {
                reason: format!("Ranger endpoint '{endpoint}' cannot carry a path"),
            });
        }
        Ok(Self { endpoint })
    }

    /// `/service/public/v2/api/policy`
    pub fn policies(&self) -> Url {
        self.api(&["policy"])
    }

    /// `/service/public/v2/api/policy/{id}`
    pub fn policy(&self, id: i64) -> Url {
        self.api(&["policy", &id.to_string()])
    }

    /// `/service/public/v2/api/service/{service}/policy?policyName={name}`
    pub fn policy_search(&self, service: &str, name: &str) -> Url {
        let mut url = self.api(&["service", service, "policy"]);
        url.query_pairs_mut().append_pair("policyName", name);
        url
    }

    fn api(&self, tail: &[&str]) -> Url {
        let mut url = self.endpoint.clone();
        // Checked in `new`.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            segments.extend(API_BASE_SEGMENTS);
            segments.extend(tail);
        }
        url
    }
}
