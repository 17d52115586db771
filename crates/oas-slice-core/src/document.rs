//! Read-only queries over a loaded OpenAPI document.

use log::debug;

use crate::error::ParseError;
use crate::parse::{
    self,
    operation::{HttpMethod, Operation, PathItem},
    schema::SchemaOrRef,
    spec::OpenApiSpec,
};

/// An endpoint resolved to its representative operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndpointOperation<'a> {
    /// The registered path key that matched.
    pub path: &'a str,
    pub method: HttpMethod,
    pub operation: &'a Operation,
    /// The path item the operation belongs to.
    pub item: &'a PathItem,
}

/// A loaded OpenAPI 3.x document.
///
/// Never mutated after construction, so it can be shared between threads
/// and queried in any order.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    spec: OpenApiSpec,
}

impl Document {
    /// Parse and validate raw document text. JSON is accepted as YAML.
    pub fn load(raw: &str) -> Result<Self, ParseError> {
        parse::from_yaml(raw).map(|spec| Self { spec })
    }

    /// Parse and validate a JSON document.
    pub fn load_json(raw: &str) -> Result<Self, ParseError> {
        parse::from_json(raw).map(|spec| Self { spec })
    }

    /// Wrap an already-parsed spec, checking its version.
    pub fn from_spec(spec: OpenApiSpec) -> Result<Self, ParseError> {
        parse::validate_version(&spec)?;
        Ok(Self { spec })
    }

    pub fn spec(&self) -> &OpenApiSpec {
        &self.spec
    }

    /// The declared `openapi` version string.
    pub fn version(&self) -> &str {
        &self.spec.openapi
    }

    /// Every path key, sorted ascending.
    pub fn list_endpoints(&self) -> Vec<&str> {
        let mut endpoints: Vec<&str> = self.spec.paths.keys().map(String::as_str).collect();
        endpoints.sort_unstable();
        endpoints
    }

    /// Tags of the endpoint's operation; empty when the endpoint does not
    /// resolve or the operation is untagged.
    pub fn tags_for_endpoint(&self, endpoint: &str) -> &[String] {
        self.operation_for_endpoint(endpoint)
            .map(|op| op.tags.as_slice())
            .unwrap_or_default()
    }

    /// The representative operation for `endpoint`. See
    /// [`Document::resolve_endpoint`] for the matching rules.
    pub fn operation_for_endpoint(&self, endpoint: &str) -> Option<&Operation> {
        self.resolve_endpoint(endpoint).map(|r| r.operation)
    }

    /// Resolve `endpoint` to an operation.
    ///
    /// Matches the first path key, in document order, that ends with
    /// `endpoint`, so `/users` matches a registered `/api/users`. Within
    /// that path item the first of GET, POST, PUT, DELETE wins. Returns
    /// `None` when no key matches or the matched item has none of those
    /// methods; later keys are not tried.
    pub fn resolve_endpoint(&self, endpoint: &str) -> Option<EndpointOperation<'_>> {
        let (path, item) = self.matching_path(endpoint)?;
        match item.primary_operation() {
            Some((method, operation)) => Some(EndpointOperation {
                path,
                method,
                operation,
                item,
            }),
            None => {
                debug!("path {path} matched {endpoint} but has no GET/POST/PUT/DELETE operation");
                None
            }
        }
    }

    fn matching_path(&self, endpoint: &str) -> Option<(&str, &PathItem)> {
        let found = self
            .spec
            .paths
            .iter()
            .find(|(path, _)| path.ends_with(endpoint))
            .map(|(path, item)| (path.as_str(), item));
        if found.is_none() {
            debug!("no path matches endpoint {endpoint}");
        }
        found
    }

    /// A schema from `components.schemas` by name.
    pub fn schema(&self, name: &str) -> Option<&SchemaOrRef> {
        self.spec
            .components
            .as_ref()
            .and_then(|c| c.schemas.get(name))
    }
}
