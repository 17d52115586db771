use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::schema::SchemaOrRef;

/// Security scheme table, referenced by name from `security` requirements.
pub const SECURITY_SCHEMES: &str = "securitySchemes";

/// Components object. Only the schema table takes part in resolution.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, SchemaOrRef>,

    /// Every other component table, kept verbatim.
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}
