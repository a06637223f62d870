//! Present/CleanUp of ACME DNS-01 TXT records.
//!
//! Each call is one read-modify-write: fetch the zone, compute the new TXT list for a
//! single label, and send a merge patch that names only that label. Sibling labels and
//! other record types are never part of the patch body, so the API leaves them alone.
//!
//! There is no locking between calls. Two Present calls for the same label that read
//! the zone at the same time each write a list without the other's token, and the
//! later write wins. The ACME flow retries failed validations, so this window is
//! accepted rather than hidden behind a lock.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::abion::ZoneApi;
use crate::abion::client::AbionClient;
use crate::abion::types::{Record, Zone, ZoneRequest};
use crate::error::SolverError;
use crate::validation::split_challenge_name;

pub const TXT: &str = "TXT";
pub const CHALLENGE_TTL: u32 = 60;
pub const CHALLENGE_COMMENT: &str = "acme_challenge";

/// A challenge as handed over by the ACME webhook host, names still fully qualified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    pub resolved_zone: String, // "example.com."
    #[serde(rename = "resolvedFQDN")]
    pub resolved_fqdn: String, // "_acme-challenge.example.com."
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_namespace: Option<String>,
}

pub struct ChallengeSolver<A = AbionClient> {
    api: A,
}

impl<A: ZoneApi> ChallengeSolver<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Adds `token` to the TXT records at `subdomain`.
    ///
    /// Safe to repeat. A repeated token is appended again rather than skipped.
    pub async fn present(&self, domain: &str, subdomain: &str, token: &str) -> Result<(), SolverError> {
        let zone = self.api.get_zone(domain).await.map_err(SolverError::Fetch)?;
        let existing = zone.records(subdomain, TXT);
        debug!(domain = %domain, subdomain = %subdomain, existing = existing.len(), "presenting challenge");

        let records = with_token(existing, token);
        self.patch(domain, subdomain, Some(records)).await?;

        info!(domain = %domain, subdomain = %subdomain, "challenge record presented");
        Ok(())
    }

    /// Removes every TXT record at `subdomain` whose value is exactly `token`.
    ///
    /// Other tokens survive in their original order. Nothing to remove is still a success.
    pub async fn clean_up(&self, domain: &str, subdomain: &str, token: &str) -> Result<(), SolverError> {
        let zone = self.api.get_zone(domain).await.map_err(SolverError::Fetch)?;
        let existing = zone.records(subdomain, TXT);

        let records = without_token(existing, token);
        debug!(
            domain = %domain,
            subdomain = %subdomain,
            existing = existing.len(),
            remaining = records.as_ref().map_or(0, Vec::len),
            "cleaning up challenge"
        );
        self.patch(domain, subdomain, records).await?;

        info!(domain = %domain, subdomain = %subdomain, "challenge record cleaned up");
        Ok(())
    }

    pub async fn present_challenge(&self, ch: &ChallengeRequest) -> Result<(), SolverError> {
        debug!(
            namespace = ch.resource_namespace.as_deref().unwrap_or_default(),
            zone = %ch.resolved_zone,
            fqdn = %ch.resolved_fqdn,
            "present"
        );
        let (domain, subdomain) = split_challenge_name(&ch.resolved_zone, &ch.resolved_fqdn)?;
        self.present(&domain, &subdomain, &ch.key).await
    }

    pub async fn clean_up_challenge(&self, ch: &ChallengeRequest) -> Result<(), SolverError> {
        debug!(
            namespace = ch.resource_namespace.as_deref().unwrap_or_default(),
            zone = %ch.resolved_zone,
            fqdn = %ch.resolved_fqdn,
            "clean up"
        );
        let (domain, subdomain) = split_challenge_name(&ch.resolved_zone, &ch.resolved_fqdn)?;
        self.clean_up(&domain, &subdomain, &ch.key).await
    }

    async fn patch(
        &self,
        domain: &str,
        subdomain: &str,
        records: Option<Vec<Record>>,
    ) -> Result<(), SolverError> {
        let patch = ZoneRequest {
            data: Zone::partial(domain, subdomain, TXT, records),
        };
        self.api
            .patch_zone(domain, &patch)
            .await
            .map_err(SolverError::Update)?;
        Ok(())
    }
}

/// Existing records followed by a fresh challenge record.
pub fn with_token(existing: &[Record], token: &str) -> Vec<Record> {
    let mut records = existing.to_vec();
    records.push(Record {
        ttl: CHALLENGE_TTL,
        data: token.to_string(),
        comments: CHALLENGE_COMMENT.to_string(),
    });
    records
}

/// Existing records minus `token`; `None` when nothing is left, which clears the type.
pub fn without_token(existing: &[Record], token: &str) -> Option<Vec<Record>> {
    let records: Vec<Record> = existing
        .iter()
        .filter(|record| record.data != token)
        .cloned()
        .collect();
    if records.is_empty() { None } else { Some(records) }
}
