use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use tracing::{debug, warn};

use crate::abion::ZoneApi;
use crate::abion::types::*;
use crate::config::{ClientConfig, ConfigError};
use crate::error::{ClientError, ErrorKind, ZoneOperation};

const API_KEY_HEADER: &str = "X-API-KEY";
const JSON: &str = "application/json";

/// Client for the Abion zone API. Holds no state beyond endpoint and credential,
/// so clones can be shared freely between concurrent calls.
#[derive(Clone)]
pub struct AbionClient {
    http: Client,
    base_url: Url,
    api_key: HeaderValue,
}

impl AbionClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let base_url = config.endpoint()?;
        let api_key = config.api_key_header()?;
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    fn zone_url(&self, domain: &str) -> Url {
        let mut url = self.base_url.clone();
        // endpoint() already rejected URLs that cannot carry a path
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["v1", "zones", domain]);
        }
        url
    }

    fn request(&self, method: Method, domain: &str) -> RequestBuilder {
        self.http
            .request(method, self.zone_url(domain))
            .header(API_KEY_HEADER, self.api_key.clone())
            .header(ACCEPT, JSON)
    }

    /// Returns the full information on a single zone.
    pub async fn get_zone(&self, domain: &str) -> Result<Zone, ClientError> {
        debug!(domain = %domain, "fetching zone");
        let req = self.request(Method::GET, domain);
        self.execute(ZoneOperation::Get, domain, req).await
    }

    /// Updates a zone by patching it according to JSON Merge Patch (RFC 7396).
    pub async fn patch_zone(&self, domain: &str, patch: &ZoneRequest) -> Result<Zone, ClientError> {
        debug!(domain = %domain, "patching zone");
        let req = self
            .request(Method::PATCH, domain)
            .header(CONTENT_TYPE, JSON)
            .json(patch);
        self.execute(ZoneOperation::Patch, domain, req).await
    }

    async fn execute(
        &self,
        operation: ZoneOperation,
        domain: &str,
        req: RequestBuilder,
    ) -> Result<Zone, ClientError> {
        let fail = |kind| ClientError::new(operation, domain, kind);

        let res = req.send().await.map_err(|err| fail(ErrorKind::Transport(err)))?;
        let status = res.status();
        let body = res
            .bytes()
            .await
            .map_err(|err| fail(ErrorKind::Transport(err)))?;

        if !status.is_success() {
            let kind = classify_failure(status, &body);
            warn!(
                domain = %domain,
                operation = %operation,
                status = status.as_u16(),
                error = %kind,
                "zone API call failed"
            );
            return Err(fail(kind));
        }

        let envelope: ZoneResponse = serde_json::from_slice(&body)
            .map_err(|source| fail(ErrorKind::Decode { status, source }))?;

        debug!(
            domain = %domain,
            operation = %operation,
            status = status.as_u16(),
            invocation_id = envelope.meta.as_ref().and_then(|m| m.invocation_id.as_deref()),
            "zone API call succeeded"
        );
        Ok(envelope.data)
    }
}

/// Maps the body of a non-success response onto the error taxonomy.
pub(crate) fn classify_failure(status: StatusCode, body: &[u8]) -> ErrorKind {
    match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(ErrorResponse {
            meta,
            error: Some(error),
        }) => ErrorKind::Api {
            http_status: status,
            status: error.status,
            message: error.message,
            invocation_id: meta.and_then(|m| m.invocation_id),
        },
        Ok(ErrorResponse { error: None, .. }) => {
            ErrorKind::MalformedErrorBody { status, source: None }
        }
        Err(source) => ErrorKind::MalformedErrorBody {
            status,
            source: Some(source),
        },
    }
}

#[async_trait]
impl ZoneApi for AbionClient {
    async fn get_zone(&self, domain: &str) -> Result<Zone, ClientError> {
        AbionClient::get_zone(self, domain).await
    }

    async fn patch_zone(&self, domain: &str, patch: &ZoneRequest) -> Result<Zone, ClientError> {
        AbionClient::patch_zone(self, domain, patch).await
    }
}
