use indexmap::IndexMap;
use log::debug;

use crate::document::Document;
use crate::error::ResolveError;
use crate::parse::components::{Components, SECURITY_SCHEMES};
use crate::parse::operation::PathItem;
use crate::parse::spec::OpenApiSpec;
use crate::resolve::{
    ResolveOptions, SchemaResolver, direct_references, path_parameter_references,
};

/// Build a standalone document holding only the operations behind
/// `endpoints` and the schemas they reach.
///
/// Each resolved endpoint contributes its matched path with just the
/// selected operation, keeping the path-level parameters and whatever else
/// the path item declares. The schemas are the closure of the operation
/// plus those path-level parameters. Top-level fields other than `webhooks`
/// and the `securitySchemes` table are carried over so security
/// requirements still resolve. Unresolvable endpoints are skipped.
pub fn extract_subset<I, S>(
    document: &Document,
    endpoints: I,
    options: ResolveOptions,
) -> Result<OpenApiSpec, ResolveError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let resolver = SchemaResolver::with_options(document, options);
    let mut paths: IndexMap<String, PathItem> = IndexMap::new();
    let mut schemas = IndexMap::new();

    for endpoint in endpoints {
        let endpoint = endpoint.as_ref();
        let Some(resolved) = document.resolve_endpoint(endpoint) else {
            debug!("skipping unresolvable endpoint {endpoint}");
            continue;
        };
        let mut roots = path_parameter_references(resolved.item);
        roots.extend(direct_references(&resolved)?);
        for (name, schema) in resolver.schemas_for_references(roots)? {
            schemas.entry(name).or_insert_with(|| schema.clone());
        }
        let item = paths
            .entry(resolved.path.to_string())
            .or_insert_with(|| resolved.item.without_operations());
        *item.operation_slot(resolved.method) = Some(resolved.operation.clone());
    }

    let source = document.spec();
    let mut component_extra = IndexMap::new();
    if let Some(security) = source
        .components
        .as_ref()
        .and_then(|c| c.extra.get(SECURITY_SCHEMES))
    {
        component_extra.insert(SECURITY_SCHEMES.to_string(), security.clone());
    }
    let components = (!schemas.is_empty() || !component_extra.is_empty()).then(|| Components {
        schemas,
        extra: component_extra,
    });

    let mut extra = source.extra.clone();
    extra.shift_remove("webhooks");

    Ok(OpenApiSpec {
        openapi: source.openapi.clone(),
        info: source.info.clone(),
        paths,
        components,
        tags: source.tags.clone(),
        extra,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::operation::HttpMethod;

    const DOC: &str = r##"
openapi: 3.1.0
info:
  title: Shop
  version: "2.0"
paths:
  /api/carts:
    get:
      operationId: listCarts
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: "#/components/schemas/Cart"
    delete:
      operationId: clearCarts
      responses:
        "200":
          description: ok
  /api/users:
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/User"
components:
  schemas:
    Cart:
      type: object
      properties:
        total:
          $ref: "#/components/schemas/Money"
    Money:
      type: number
    User:
      type: object
      properties:
        name:
          type: string
"##;

    #[test]
    fn keeps_only_selected_operation_and_reached_schemas() {
        let doc = Document::load(DOC).unwrap();
        let subset = extract_subset(&doc, ["/carts", "/nope"], ResolveOptions::default()).unwrap();

        assert_eq!(subset.openapi, "3.1.0");
        assert_eq!(subset.info.as_ref().map(|i| i.title.as_str()), Some("Shop"));
        assert_eq!(subset.paths.len(), 1);

        let item = &subset.paths["/api/carts"];
        assert!(item.operation(HttpMethod::Get).is_some());
        assert!(item.operation(HttpMethod::Delete).is_none());

        let schemas = &subset.components.as_ref().unwrap().schemas;
        assert_eq!(schemas.keys().collect::<Vec<_>>(), ["Cart", "Money"]);
    }

    #[test]
    fn subset_is_itself_loadable() {
        let doc = Document::load(DOC).unwrap();
        let subset = extract_subset(&doc, ["/api/users"], ResolveOptions::default()).unwrap();
        let yaml = serde_yaml_ng::to_string(&subset).unwrap();

        let reloaded = Document::load(&yaml).unwrap();
        assert_eq!(reloaded.list_endpoints(), vec!["/api/users"]);
        assert!(reloaded.schema("User").is_some());
        assert!(reloaded.schema("Cart").is_none());
    }

    #[test]
    fn empty_selection_has_no_components() {
        let doc = Document::load(DOC).unwrap();
        let subset = extract_subset(&doc, Vec::<String>::new(), ResolveOptions::default()).unwrap();
        assert!(subset.paths.is_empty());
        assert!(subset.components.is_none());
    }
}
