//! Abion zone API: wire types, HTTP client, and the trait the solver talks through.

pub mod client;
pub mod types;

use async_trait::async_trait;

use crate::error::ClientError;
use types::{Zone, ZoneRequest};

/// The two zone calls a reconciliation needs.
///
/// Writes are unconditional; a conditional-update variant would be added here if the
/// API ever grows an ETag/If-Match contract.
#[async_trait]
pub trait ZoneApi: Send + Sync {
    async fn get_zone(&self, domain: &str) -> Result<Zone, ClientError>;

    async fn patch_zone(&self, domain: &str, patch: &ZoneRequest) -> Result<Zone, ClientError>;
}
