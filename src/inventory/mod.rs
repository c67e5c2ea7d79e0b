//! Instance inventory: data model and cached snapshot handling

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

pub mod cache;
pub mod view;

pub use cache::InstanceCache;
pub use view::Inventory;

/// Provider-assigned unique instance identifier
pub type InstanceId = String;

/// The whole known instance population of one VPC at one point in time.
///
/// Keyed by instance id; the provider guarantees id uniqueness, and if a
/// response ever repeats an id the last occurrence wins.
pub type Snapshot = BTreeMap<InstanceId, Instance>;

/// One `{Key, Value}` tag pair as the provider returns it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value")]
    pub value: String,
}

/// One instance record.
///
/// `tags` is the collapsed key->value view; the provider's original tag
/// sequence is kept verbatim under `raw_tags`. An instance that came back
/// without a `Tags` field gets neither. All other provider fields pass
/// through untouched in `attributes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    #[serde(rename = "InstanceId")]
    pub instance_id: InstanceId,

    #[serde(rename = "Tags", default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,

    #[serde(rename = "RawTags", default, skip_serializing_if = "Option::is_none")]
    pub raw_tags: Option<Vec<Tag>>,

    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl Instance {
    /// Collapse a provider tag list into the queryable mapping.
    ///
    /// Duplicate keys silently overwrite, last occurrence wins; this is the
    /// intended behavior, the raw sequence stays available for traceability.
    fn from_wire(wire: WireInstance) -> Self {
        let (tags, raw_tags) = match wire.tags {
            Some(raw) => {
                let mut tags = BTreeMap::new();
                for tag in &raw {
                    tags.insert(tag.key.clone(), tag.value.clone());
                }
                (Some(tags), Some(raw))
            }
            None => (None, None),
        };

        Self {
            instance_id: wire.instance_id,
            tags,
            raw_tags,
            attributes: wire.attributes,
        }
    }

    /// Tag value lookup against the collapsed mapping
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.as_ref()?.get(key).map(String::as_str)
    }

    /// String-valued provider attribute, e.g. `InstanceType`
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)?.as_str()
    }
}

/// Instance record in the wire shape of a describe-instances response
#[derive(Debug, Deserialize)]
struct WireInstance {
    #[serde(rename = "InstanceId")]
    instance_id: InstanceId,

    #[serde(rename = "Tags", default)]
    tags: Option<Vec<Tag>>,

    #[serde(flatten)]
    attributes: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct WireReservation {
    #[serde(rename = "Instances", default)]
    instances: Vec<WireInstance>,
}

#[derive(Debug, Deserialize)]
struct DescribeInstancesResponse {
    #[serde(rename = "Reservations", default)]
    reservations: Vec<WireReservation>,
}

/// Walk the reservation->instance nesting of a describe-instances response
/// and build a normalized snapshot.
pub fn parse_describe_response(json: &str) -> std::result::Result<Snapshot, CacheError> {
    let response: DescribeInstancesResponse =
        serde_json::from_str(json).map_err(|e| CacheError::BadResponse(e.to_string()))?;

    let mut snapshot = Snapshot::new();
    for reservation in response.reservations {
        for wire in reservation.instances {
            log::info!("found instance {}", wire.instance_id);
            let instance = Instance::from_wire(wire);
            snapshot.insert(instance.instance_id.clone(), instance);
        }
    }
    Ok(snapshot)
}
