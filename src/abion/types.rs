use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Discriminator the zone API expects on every zone object.
pub const ZONE_TYPE: &str = "zone";

/// subdomain label -> record type -> records.
///
/// A `None` list serializes as `null`, which removes that record type under
/// merge-patch semantics.
pub type RecordSets = BTreeMap<String, BTreeMap<String, Option<Vec<Record>>>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub zone_type: String, // "zone"
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String, // "example.com"
    #[serde(default)]
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub records: RecordSets,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub ttl: u32,
    #[serde(rename = "rdata", default, skip_serializing_if = "String::is_empty")]
    pub data: String, // the TXT value for ACME challenges
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comments: String,
}

fn is_zero(ttl: &u32) -> bool {
    *ttl == 0
}

impl Zone {
    /// Builds a partial zone that touches exactly one subdomain/type pair.
    ///
    /// Passing `None` produces an explicit `null` for the type, which clears it.
    pub fn partial(
        domain: &str,
        subdomain: &str,
        record_type: &str,
        records: Option<Vec<Record>>,
    ) -> Self {
        let mut types = BTreeMap::new();
        types.insert(record_type.to_string(), records);

        let mut sets = RecordSets::new();
        sets.insert(subdomain.to_string(), types);

        Self {
            zone_type: ZONE_TYPE.to_string(),
            id: domain.to_string(),
            attributes: Attributes { records: sets },
        }
    }

    /// Records of `record_type` at `subdomain`; a missing label or type is empty.
    pub fn records(&self, subdomain: &str, record_type: &str) -> &[Record] {
        self.attributes
            .records
            .get(subdomain)
            .and_then(|types| types.get(record_type))
            .and_then(|records| records.as_deref())
            .unwrap_or_default()
    }
}

/// Body of a `PATCH /v1/zones/{domain}` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneRequest {
    pub data: Zone,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(rename = "invocationId", default, skip_serializing_if = "Option::is_none")]
    pub invocation_id: Option<String>,
}

/// Envelope of a successful zone response. `data` is mandatory here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneResponse {
    #[serde(default)]
    pub meta: Option<Metadata>,
    pub data: Zone,
}

/// Envelope of a failed call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub meta: Option<Metadata>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_zone_with_missing_optional_fields() {
        let body = json!({
            "data": {
                "type": "zone",
                "id": "example.com",
                "attributes": {
                    "records": {
                        "_acme-challenge": {
                            "TXT": [{ "rdata": "tok1" }, { "ttl": 60, "rdata": "tok2", "comments": "acme_challenge" }]
                        },
                        "": { "A": [{ "ttl": 3600, "rdata": "192.0.2.1" }] }
                    }
                }
            }
        });

        let resp: ZoneResponse = serde_json::from_value(body).unwrap();
        assert!(resp.meta.is_none());

        let txt = resp.data.records("_acme-challenge", "TXT");
        assert_eq!(txt.len(), 2);
        assert_eq!(txt[0], Record { ttl: 0, data: "tok1".into(), comments: String::new() });
        assert_eq!(txt[1].comments, "acme_challenge");
        assert_eq!(resp.data.records("", "A")[0].data, "192.0.2.1");
    }

    #[test]
    fn success_envelope_requires_data() {
        let err = serde_json::from_value::<ZoneResponse>(json!({ "meta": {} })).unwrap_err();
        assert!(err.to_string().contains("data"));
    }

    #[test]
    fn records_lookup_treats_missing_and_null_as_empty() {
        let zone: Zone = serde_json::from_value(json!({
            "attributes": { "records": { "www": { "A": [{ "rdata": "192.0.2.1" }], "TXT": null } } }
        }))
        .unwrap();

        assert!(zone.records("_acme-challenge", "TXT").is_empty());
        assert!(zone.records("www", "TXT").is_empty());
        assert!(zone.records("www", "AAAA").is_empty());
        assert_eq!(zone.records("www", "A").len(), 1);
    }

    #[test]
    fn partial_zone_encodes_only_the_touched_key() {
        let records = vec![Record { ttl: 60, data: "tok1".into(), comments: "acme_challenge".into() }];
        let req = ZoneRequest {
            data: Zone::partial("example.com", "_acme-challenge", "TXT", Some(records)),
        };

        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "data": {
                    "type": "zone",
                    "id": "example.com",
                    "attributes": {
                        "records": {
                            "_acme-challenge": {
                                "TXT": [{ "ttl": 60, "rdata": "tok1", "comments": "acme_challenge" }]
                            }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn partial_zone_keeps_explicit_null_marker() {
        let req = ZoneRequest {
            data: Zone::partial("example.com", "_acme-challenge", "TXT", None),
        };
        let value = serde_json::to_value(&req).unwrap();

        let types = &value["data"]["attributes"]["records"]["_acme-challenge"];
        assert!(types.as_object().unwrap().contains_key("TXT"));
        assert!(types["TXT"].is_null());
    }

    #[test]
    fn error_envelope_tolerates_partial_bodies() {
        let resp: ErrorResponse =
            serde_json::from_value(json!({ "meta": { "invocationId": "abc" }, "error": { "message": "boom" } }))
                .unwrap();
        assert_eq!(resp.meta.unwrap().invocation_id.as_deref(), Some("abc"));
        assert_eq!(resp.error.unwrap(), ApiErrorBody { status: 0, message: "boom".into() });

        let resp: ErrorResponse = serde_json::from_value(json!({})).unwrap();
        assert!(resp.error.is_none());
    }
}
