pub mod components;
pub mod media_type;
pub mod operation;
pub mod parameter;
pub mod request_body;
pub mod response;
pub mod schema;
pub mod spec;

use serde::Deserialize;

use crate::error::ParseError;
use spec::OpenApiSpec;

/// The only OpenAPI major version this crate understands.
pub const SUPPORTED_MAJOR_VERSION: &str = "3";

/// Just the `openapi` field, read before the full model so that documents
/// of another major version fail on their version rather than on whatever
/// structure the 3.x model cannot represent.
#[derive(Deserialize)]
struct VersionHeader {
    #[serde(default)]
    openapi: Option<serde_json::Value>,
}

impl VersionHeader {
    fn version(&self) -> String {
        match &self.openapi {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => String::new(),
        }
    }
}

/// Parse an OpenAPI spec from YAML.
pub fn from_yaml(input: &str) -> Result<OpenApiSpec, ParseError> {
    let header: VersionHeader = serde_yaml_ng::from_str(input)?;
    check_version(&header.version())?;
    Ok(serde_yaml_ng::from_str(input)?)
}

/// Parse an OpenAPI spec from JSON.
pub fn from_json(input: &str) -> Result<OpenApiSpec, ParseError> {
    let header: VersionHeader = serde_json::from_str(input)?;
    check_version(&header.version())?;
    Ok(serde_json::from_str(input)?)
}

/// Check that the major component of the `openapi` field is `3`.
///
/// The major component is everything before the first `.`; no other part of
/// the document is validated.
pub fn validate_version(spec: &OpenApiSpec) -> Result<(), ParseError> {
    check_version(&spec.openapi)
}

fn check_version(version: &str) -> Result<(), ParseError> {
    let version = version.trim();
    if version.is_empty() {
        return Err(ParseError::MissingVersion);
    }
    let major = version.split('.').next().unwrap_or_default();
    if major != SUPPORTED_MAJOR_VERSION {
        return Err(ParseError::UnsupportedVersion(version.to_string()));
    }
    Ok(())
}
