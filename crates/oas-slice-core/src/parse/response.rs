use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::media_type::{JSON_CONTENT_TYPE, MediaType};

/// Status code whose response body takes part in schema resolution.
pub const SUCCESS_STATUS: &str = "200";

/// A response definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, serde_json::Value>,
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl Response {
    /// The `application/json` media type, if the response declares one.
    pub fn json(&self) -> Option<&MediaType> {
        self.content.get(JSON_CONTENT_TYPE)
    }
}

/// A reference or inline response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseOrRef {
    Ref {
        #[serde(rename = "$ref")]
        ref_path: String,
    },
    Response(Response),
}
