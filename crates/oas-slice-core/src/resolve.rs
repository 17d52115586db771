use indexmap::IndexMap;
use log::{debug, trace};

use crate::classify::{
    as_reference, collection_item_reference, composition_members, object_properties,
    schema_name_from_ref,
};
use crate::document::{Document, EndpointOperation};
use crate::error::ResolveError;
use crate::parse::media_type::MediaType;
use crate::parse::operation::{Operation, PathItem};
use crate::parse::parameter::ParameterOrRef;
use crate::parse::request_body::RequestBodyOrRef;
use crate::parse::response::{ResponseOrRef, SUCCESS_STATUS};
use crate::parse::schema::SchemaOrRef;

/// Options controlling reference discovery.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Fail on `allOf` members that are inline schemas instead of skipping
    /// them.
    pub strict_composition: bool,
}

/// Computes the component schemas reachable from a set of endpoints.
pub struct SchemaResolver<'a> {
    document: &'a Document,
    options: ResolveOptions,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self::with_options(document, ResolveOptions::default())
    }

    pub fn with_options(document: &'a Document, options: ResolveOptions) -> Self {
        Self { document, options }
    }

    /// Every schema reachable from the operations of `endpoints`, keyed by
    /// component name.
    ///
    /// Endpoints that do not resolve to an operation are skipped. A
    /// referenced name missing from `components.schemas`, or a resolved
    /// operation without a `200` response, fails the whole call.
    pub fn schemas_for_endpoints<I, S>(
        &self,
        endpoints: I,
    ) -> Result<IndexMap<String, &'a SchemaOrRef>, ResolveError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut closure = Closure::new(self.document, self.options);
        for endpoint in endpoints {
            let endpoint = endpoint.as_ref();
            let Some(resolved) = self.document.resolve_endpoint(endpoint) else {
                debug!("skipping unresolvable endpoint {endpoint}");
                continue;
            };
            closure.expand(direct_references(&resolved)?)?;
        }
        Ok(closure.schemas)
    }

    /// Schemas reachable from a single already-resolved operation.
    pub fn schemas_for_operation(
        &self,
        resolved: &EndpointOperation<'a>,
    ) -> Result<IndexMap<String, &'a SchemaOrRef>, ResolveError> {
        let mut closure = Closure::new(self.document, self.options);
        closure.expand(direct_references(resolved)?)?;
        Ok(closure.schemas)
    }

    /// Schemas reachable from an explicit list of `$ref` pointers.
    pub fn schemas_for_references(
        &self,
        roots: Vec<&'a str>,
    ) -> Result<IndexMap<String, &'a SchemaOrRef>, ResolveError> {
        let mut closure = Closure::new(self.document, self.options);
        closure.expand(roots)?;
        Ok(closure.schemas)
    }

    /// Map each resolvable endpoint to its operation. No schema expansion
    /// happens here.
    pub fn operations_for_endpoints<I, S>(&self, endpoints: I) -> IndexMap<String, &'a Operation>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        endpoints
            .into_iter()
            .filter_map(|endpoint| {
                let endpoint = endpoint.as_ref();
                let operation = self.document.operation_for_endpoint(endpoint);
                if operation.is_none() {
                    debug!("skipping unresolvable endpoint {endpoint}");
                }
                operation.map(|op| (endpoint.to_string(), op))
            })
            .collect()
    }
}

/// References an operation points at directly, in scan order: parameter
/// schemas, the JSON request body, then the JSON `200` response body.
///
/// Parameters, request bodies and responses given as `$ref` are not
/// followed; only schema references are in scope.
pub fn direct_references<'a>(
    resolved: &EndpointOperation<'a>,
) -> Result<Vec<&'a str>, ResolveError> {
    let op = resolved.operation;
    let mut refs = parameter_references(&op.parameters);

    if let Some(RequestBodyOrRef::RequestBody(body)) = &op.request_body {
        refs.extend(body.json().and_then(body_reference));
    }

    match op.responses.get(SUCCESS_STATUS) {
        Some(ResponseOrRef::Response(resp)) => refs.extend(resp.json().and_then(body_reference)),
        Some(ResponseOrRef::Ref { ref_path }) => {
            debug!(
                "{SUCCESS_STATUS} response of {} is a reference ({ref_path}), not followed",
                resolved.path
            );
        }
        None => {
            return Err(ResolveError::MissingSuccessResponse {
                path: resolved.path.to_string(),
            });
        }
    }

    Ok(refs)
}

/// Schema references of path-level parameters. Operations on the path
/// inherit these, so a standalone copy of the path needs their schemas.
pub fn path_parameter_references(item: &PathItem) -> Vec<&str> {
    parameter_references(&item.parameters)
}

/// Inline parameters whose schema is a `$ref`.
fn parameter_references(params: &[ParameterOrRef]) -> Vec<&str> {
    params
        .iter()
        .filter_map(|param| match param {
            ParameterOrRef::Parameter(p) => p.schema.as_ref().and_then(as_reference),
            ParameterOrRef::Ref { .. } => None,
        })
        .collect()
}

/// A body contributes its schema's reference, or its array items' reference.
fn body_reference(media: &MediaType) -> Option<&str> {
    let schema = media.schema.as_ref()?;
    collection_item_reference(schema).or_else(|| as_reference(schema))
}

/// Transitive closure over schema references, keyed by name. The map
/// doubles as the visited set, so cyclic graphs terminate.
struct Closure<'a> {
    document: &'a Document,
    options: ResolveOptions,
    schemas: IndexMap<String, &'a SchemaOrRef>,
}

impl<'a> Closure<'a> {
    fn new(document: &'a Document, options: ResolveOptions) -> Self {
        Self {
            document,
            options,
            schemas: IndexMap::new(),
        }
    }

    /// Depth-first walk from `roots`, adding every reached schema.
    fn expand(&mut self, roots: Vec<&'a str>) -> Result<(), ResolveError> {
        let mut stack: Vec<&'a str> = roots.into_iter().rev().collect();
        while let Some(ref_path) = stack.pop() {
            let name = schema_name_from_ref(ref_path)?;
            if self.schemas.contains_key(name) {
                trace!("{name} already in closure");
                continue;
            }
            let schema = self
                .document
                .schema(name)
                .ok_or_else(|| ResolveError::SchemaNotFound(name.to_string()))?;
            trace!("adding {name} to closure");
            self.schemas.insert(name.to_string(), schema);

            let children = self.references_of(name, schema)?;
            stack.extend(children.into_iter().rev());
        }
        Ok(())
    }

    /// References a named component points at. An alias points at its
    /// target, an array at its `$ref` items, an object at what its
    /// properties reference. Other shapes contribute nothing.
    fn references_of(
        &self,
        name: &str,
        schema: &'a SchemaOrRef,
    ) -> Result<Vec<&'a str>, ResolveError> {
        if let Some(target) = as_reference(schema).or_else(|| collection_item_reference(schema)) {
            return Ok(vec![target]);
        }
        let Some(properties) = object_properties(schema) else {
            return Ok(Vec::new());
        };

        let mut refs = Vec::new();
        for (prop_name, prop) in properties {
            if let Some(item_ref) = collection_item_reference(prop) {
                refs.push(item_ref);
            } else if let Some(ref_path) = as_reference(prop) {
                refs.push(ref_path);
            } else if let Some(members) = composition_members(prop) {
                for member in members {
                    match as_reference(member) {
                        Some(ref_path) => refs.push(ref_path),
                        None if self.options.strict_composition => {
                            return Err(ResolveError::InlineComposition {
                                schema: name.to_string(),
                                property: prop_name.clone(),
                            });
                        }
                        None => debug!("ignoring inline allOf member of {name}.{prop_name}"),
                    }
                }
            }
        }
        Ok(refs)
    }
}
