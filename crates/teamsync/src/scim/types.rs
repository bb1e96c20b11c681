//! SCIM wire types.
//!
//! SCIM servers disagree on property casing (`displayName`, `DisplayName`,
//! `Resources`, `resources`), so payloads go through [`lowercase_keys`]
//! before being decoded into these structs, which use lowercase names.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde::de::DeserializeOwned;

/// Core SCIM group schema URN.
pub const GROUP_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:Group";

/// Paged list envelope returned by SCIM list endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScimListResponse<T> {
    #[serde(rename = "resources")]
    pub resources: Vec<T>,
    #[serde(rename = "totalresults")]
    pub total_results: u64,
    #[serde(rename = "itemsperpage")]
    pub items_per_page: u64,
    #[serde(rename = "startindex")]
    pub start_index: u64,
}

impl<T> Default for ScimListResponse<T> {
    fn default() -> Self {
        Self {
            resources: Vec::new(),
            total_results: 0,
            items_per_page: 0,
            start_index: 0,
        }
    }
}

impl<T: DeserializeOwned> ScimListResponse<T> {
    /// Decode a list body, matching property names case-insensitively.
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(body)?;
        serde_json::from_value(lowercase_keys(value))
    }
}

/// A SCIM group resource.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScimGroup {
    pub schemas: Vec<String>,
    pub id: String,
    #[serde(rename = "displayname")]
    pub display_name: String,
    pub members: Vec<ScimGroupMember>,
    pub meta: ScimMeta,
}

/// A member reference inside a SCIM group.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScimGroupMember {
    pub value: String,
    #[serde(rename = "$ref")]
    pub reference: String,
    pub display: String,
}

/// Resource metadata.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScimMeta {
    #[serde(rename = "resourcetype")]
    pub resource_type: String,
    #[serde(deserialize_with = "lenient_datetime")]
    pub created: Option<DateTime<Utc>>,
    #[serde(rename = "lastmodified", deserialize_with = "lenient_datetime")]
    pub last_modified: Option<DateTime<Utc>>,
    pub location: String,
}

/// Parse a SCIM `dateTime`.
///
/// Offset-less values are taken as UTC. Anything unparseable becomes `None`;
/// metadata never fails a listing.
pub fn parse_scim_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(parse_scim_datetime))
}

/// Recursively lowercase every object key.
///
/// When two keys collide after lowercasing, the later one wins.
pub fn lowercase_keys(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let lowered: serde_json::Map<String, serde_json::Value> = map
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), lowercase_keys(v)))
                .collect();
            serde_json::Value::Object(lowered)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(lowercase_keys).collect())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_keys_is_recursive() {
        let value = serde_json::json!({
            "Resources": [{"DisplayName": "Ops", "Meta": {"ResourceType": "Group"}}],
            "TotalResults": 1
        });
        let lowered = lowercase_keys(value);
        assert_eq!(
            lowered,
            serde_json::json!({
                "resources": [{"displayname": "Ops", "meta": {"resourcetype": "Group"}}],
                "totalresults": 1
            })
        );
    }

    #[test]
    fn test_lowercase_keys_leaves_values_alone() {
        let value = serde_json::json!({"Id": "ABC-def"});
        assert_eq!(lowercase_keys(value), serde_json::json!({"id": "ABC-def"}));
    }

    #[test]
    fn test_decode_camel_case_scim_body() {
        let body = serde_json::json!({
            "schemas": ["urn:ietf:params:scim:api:messages:2.0:ListResponse"],
            "totalResults": 1,
            "itemsPerPage": 1,
            "startIndex": 1,
            "Resources": [{
                "schemas": [GROUP_SCHEMA],
                "id": "8f9a3c1e",
                "displayName": "Platform",
                "members": [{"value": "u1", "$ref": "https://example.com/Users/u1", "display": "Ada"}],
                "meta": {
                    "resourceType": "Group",
                    "created": "2024-01-01T00:00:00Z",
                    "lastModified": "2024-02-01T12:30:00Z",
                    "location": "https://example.com/Groups/8f9a3c1e"
                }
            }]
        })
        .to_string();

        let list = ScimListResponse::<ScimGroup>::from_slice(body.as_bytes()).unwrap();
        assert_eq!(list.total_results, 1);
        assert_eq!(list.items_per_page, 1);
        assert_eq!(list.start_index, 1);
        let group = &list.resources[0];
        assert_eq!(group.id, "8f9a3c1e");
        assert_eq!(group.display_name, "Platform");
        assert_eq!(group.schemas, vec![GROUP_SCHEMA.to_string()]);
        assert_eq!(group.members[0].reference, "https://example.com/Users/u1");
        assert_eq!(group.members[0].display, "Ada");
        assert_eq!(group.meta.resource_type, "Group");
        assert!(group.meta.created.is_some());
        assert!(group.meta.last_modified.is_some());
    }

    #[test]
    fn test_decode_pascal_case_scim_body() {
        let body = br#"{"Resources":[{"Id":"g1","DisplayName":"Security","Members":[]}],"TotalResults":1}"#;
        let list = ScimListResponse::<ScimGroup>::from_slice(body).unwrap();
        assert_eq!(list.resources[0].id, "g1");
        assert_eq!(list.resources[0].display_name, "Security");
        assert!(list.resources[0].meta.created.is_none());
    }

    #[test]
    fn test_decode_accepts_timestamps_without_offset() {
        let body = br#"{"Resources":[{"id":"g1","displayName":"Platform","meta":{"created":"2024-01-01T00:00:00","lastModified":"2024-02-01T12:30:00.125"}}]}"#;
        let list = ScimListResponse::<ScimGroup>::from_slice(body).unwrap();
        let meta = &list.resources[0].meta;
        assert_eq!(
            meta.created.map(|d| d.to_rfc3339()),
            Some("2024-01-01T00:00:00+00:00".to_string())
        );
        assert!(meta.last_modified.is_some());
    }

    #[test]
    fn test_decode_tolerates_unparseable_metadata() {
        let body = br#"{"Resources":[{"id":"g1","displayName":"Platform","meta":{"created":"last tuesday","lastModified":42}}]}"#;
        let list = ScimListResponse::<ScimGroup>::from_slice(body).unwrap();
        assert_eq!(list.resources[0].display_name, "Platform");
        assert!(list.resources[0].meta.created.is_none());
        assert!(list.resources[0].meta.last_modified.is_none());
    }

    #[test]
    fn test_parse_scim_datetime_with_offset() {
        let dt = parse_scim_datetime("2024-01-01T02:00:00+02:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert!(parse_scim_datetime("").is_none());
    }

    #[test]
    fn test_decode_missing_resources_is_empty() {
        let list = ScimListResponse::<ScimGroup>::from_slice(br#"{"totalResults":0}"#).unwrap();
        assert!(list.resources.is_empty());
    }

    #[test]
    fn test_decode_rejects_non_json() {
        assert!(ScimListResponse::<ScimGroup>::from_slice(b"<html>").is_err());
    }
}
