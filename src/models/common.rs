use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hypermedia link attached to every resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    pub rel: String,
}

/// Pagination and sorting for list calls
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Zero means "server default"
    pub limit: Option<u32>,
    pub marker: Option<String>,
    pub sort_key: Option<String>,
    pub sort_dir: Option<String>,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    pub fn with_sort(mut self, key: impl Into<String>, dir: impl Into<String>) -> Self {
        self.sort_key = Some(key.into());
        self.sort_dir = Some(dir.into());
        self
    }

    /// Encode as `?key=value&...` with keys in sorted order, or `""` when nothing is set
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();

        if let Some(limit) = self.limit.filter(|l| *l > 0) {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(marker) = non_empty(&self.marker) {
            pairs.push(("marker", marker.to_string()));
        }
        if let Some(dir) = non_empty(&self.sort_dir) {
            pairs.push(("sort_dir", dir.to_string()));
        }
        if let Some(key) = non_empty(&self.sort_key) {
            pairs.push(("sort_key", key.to_string()));
        }

        query_string(&pairs)
    }
}

/// Encode pairs as a query string with a leading `?`, or `""` when empty
pub(crate) fn query_string(pairs: &[(&str, String)]) -> String {
    if pairs.is_empty() {
        return String::new();
    }

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    format!("?{}", serializer.finish())
}

/// Percent-encode one path segment so `/`, `?` and `#` stay inside it
pub(crate) fn path_segment(segment: &str) -> String {
    // byte_serialize writes a literal '+' as %2B, so '+' only ever stands for a space
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Single JSON Patch (RFC 6902) operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl PatchOperation {
    pub fn replace(field: &str, value: serde_json::Value) -> Self {
        Self {
            op: "replace".to_string(),
            path: format!("/{}", field.trim_start_matches('/')),
            value: Some(value),
        }
    }

    /// One `replace` per field, ordered by field name
    pub fn replace_all<I, K>(updates: I) -> Vec<Self>
    where
        I: IntoIterator<Item = (K, serde_json::Value)>,
        K: Into<String>,
    {
        updates
            .into_iter()
            .map(|(k, v)| (k.into(), v))
            .collect::<BTreeMap<String, serde_json::Value>>()
            .into_iter()
            .map(|(field, value)| Self::replace(&field, value))
            .collect()
    }
}

/// Compute, storage or baremetal model as reported by the decision engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataModel {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
    #[serde(default)]
    pub context: Vec<serde_json::Value>,
    /// Anything else the service returns
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
