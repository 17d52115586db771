use std::collections::BTreeSet;

use oas_slice_core::error::ResolveError;
use oas_slice_core::parse::parameter::ParameterOrRef;
use oas_slice_core::parse::response::ResponseOrRef;
use oas_slice_core::parse::schema::SchemaOrRef;
use oas_slice_core::{Document, ResolveOptions, SchemaResolver, extract_subset};

use indexmap::IndexMap;

const BOOKSTORE: &str = include_str!("fixtures/bookstore.yaml");
const CYCLIC: &str = include_str!("fixtures/cyclic.yaml");
const BROKEN: &str = include_str!("fixtures/broken.json");

fn sorted_names(schemas: &IndexMap<String, &SchemaOrRef>) -> Vec<String> {
    let mut names: Vec<String> = schemas.keys().cloned().collect();
    names.sort();
    names
}

#[test]
fn empty_endpoint_set_yields_empty_closure() {
    let doc = Document::load(BOOKSTORE).unwrap();
    let resolver = SchemaResolver::new(&doc);
    let schemas = resolver.schemas_for_endpoints(BTreeSet::<String>::new()).unwrap();
    assert!(schemas.is_empty());
    assert!(resolver.operations_for_endpoints(Vec::<&str>::new()).is_empty());
}

#[test]
fn request_body_reference_and_nested_property() {
    let yaml = r##"
openapi: 3.0.0
paths:
  /api/users:
    post:
      requestBody:
        content:
          application/json:
            schema:
              $ref: "#/components/schemas/User"
      responses:
        "200":
          description: ok
components:
  schemas:
    User:
      type: object
      properties:
        address:
          $ref: "#/components/schemas/Address"
    Address:
      type: object
      properties:
        city:
          type: string
"##;
    let doc = Document::load(yaml).unwrap();
    let schemas = SchemaResolver::new(&doc)
        .schemas_for_endpoints(["/users"])
        .unwrap();
    assert_eq!(sorted_names(&schemas), ["Address", "User"]);
    assert_eq!(schemas["User"], doc.schema("User").unwrap());
    assert_eq!(schemas["Address"], doc.schema("Address").unwrap());
}

#[test]
fn full_transitive_closure() {
    let doc = Document::load(BOOKSTORE).unwrap();
    let schemas = SchemaResolver::new(&doc)
        .schemas_for_endpoints(["/books"])
        .unwrap();
    assert_eq!(
        sorted_names(&schemas),
        [
            "Address",
            "Author",
            "Book",
            "Country",
            "Currency",
            "Discountable",
            "Genre",
            "Money",
            "Tag",
        ]
    );
    assert!(!schemas.contains_key("NewBook"), "POST is not the selected operation");
    assert!(!schemas.contains_key("Unused"));
}

#[test]
fn collection_and_composition_properties() {
    let doc = Document::load(BOOKSTORE).unwrap();
    let schemas = SchemaResolver::new(&doc)
        .schemas_for_endpoints(["/books"])
        .unwrap();
    assert!(schemas.contains_key("Tag"), "array items reference");
    assert!(schemas.contains_key("Money"), "first allOf member");
    assert!(schemas.contains_key("Discountable"), "second allOf member");
}

#[test]
fn union_over_several_endpoints() {
    let doc = Document::load(BOOKSTORE).unwrap();
    let resolver = SchemaResolver::new(&doc);
    let schemas = resolver
        .schemas_for_endpoints(["/books", "/users", "/status", "/unknown"])
        .unwrap();

    assert_eq!(schemas.len(), 10);
    assert!(schemas.contains_key("User"));
    // Address is reachable from both and appears once.
    assert_eq!(schemas.keys().filter(|k| *k == "Address").count(), 1);
}

#[test]
fn only_json_and_200_are_inspected() {
    let doc = Document::load(BOOKSTORE).unwrap();
    let schemas = SchemaResolver::new(&doc)
        .schemas_for_endpoints(["/reports"])
        .unwrap();
    assert!(schemas.is_empty());
}

#[test]
fn mutual_reference_cycle_terminates() {
    let doc = Document::load(CYCLIC).unwrap();
    let schemas = SchemaResolver::new(&doc)
        .schemas_for_endpoints(["/a"])
        .unwrap();
    assert_eq!(sorted_names(&schemas), ["A", "B"]);
}

#[test]
fn self_reference_through_array_terminates() {
    let doc = Document::load(CYCLIC).unwrap();
    let schemas = SchemaResolver::new(&doc)
        .schemas_for_endpoints(["/tree"])
        .unwrap();
    assert_eq!(sorted_names(&schemas), ["Node"]);
}

#[test]
fn cycle_through_composition_and_alias_terminates() {
    let doc = Document::load(CYCLIC).unwrap();
    let schemas = SchemaResolver::new(&doc)
        .schemas_for_endpoints(["/group"])
        .unwrap();
    assert_eq!(sorted_names(&schemas), ["Group", "Member", "MemberAlias"]);
}

#[test]
fn missing_component_is_reported_by_name() {
    let doc = Document::load_json(BROKEN).unwrap();
    let err = SchemaResolver::new(&doc)
        .schemas_for_endpoints(["/widgets"])
        .unwrap_err();
    assert!(matches!(err, ResolveError::SchemaNotFound(ref name) if name == "Part"));
}

#[test]
fn non_component_reference_is_rejected() {
    let doc = Document::load_json(BROKEN).unwrap();
    let err = SchemaResolver::new(&doc)
        .schemas_for_endpoints(["/gadgets"])
        .unwrap_err();
    assert!(matches!(err, ResolveError::InvalidRefFormat(_)));
}

#[test]
fn operations_for_endpoints_keyed_by_argument() {
    let doc = Document::load(BOOKSTORE).unwrap();
    let ops = SchemaResolver::new(&doc).operations_for_endpoints(["/books", "/users", "/status"]);

    assert_eq!(ops.len(), 2);
    assert_eq!(ops["/books"].operation_id.as_deref(), Some("listBooks"));
    assert_eq!(ops["/users"].operation_id.as_deref(), Some("updateUser"));
    assert!(!ops.contains_key("/status"));
}

#[test]
fn operations_and_schemas_are_independent() {
    let doc = Document::load(BOOKSTORE).unwrap();
    let endpoints = ["/books", "/users"];

    let schemas_first = SchemaResolver::new(&doc)
        .schemas_for_endpoints(endpoints)
        .unwrap();
    let ops_after = SchemaResolver::new(&doc).operations_for_endpoints(endpoints);

    let ops_first = SchemaResolver::new(&doc).operations_for_endpoints(endpoints);
    let schemas_after = SchemaResolver::new(&doc)
        .schemas_for_endpoints(endpoints)
        .unwrap();

    assert_eq!(schemas_first, schemas_after);
    assert_eq!(ops_first, ops_after);
}

#[test]
fn strict_composition_accepts_reference_only_all_of() {
    let doc = Document::load(BOOKSTORE).unwrap();
    let resolver = SchemaResolver::with_options(
        &doc,
        ResolveOptions {
            strict_composition: true,
        },
    );
    assert!(resolver.schemas_for_endpoints(["/books"]).is_ok());
}

#[test]
fn extracted_subset_round_trips_through_json() {
    let doc = Document::load(BOOKSTORE).unwrap();
    let subset = extract_subset(&doc, ["/users"], ResolveOptions::default()).unwrap();
    let json = serde_json::to_string(&subset).unwrap();

    let reloaded = Document::load_json(&json).unwrap();
    assert_eq!(reloaded.list_endpoints(), vec!["/api/v1/users"]);

    let again = SchemaResolver::new(&reloaded)
        .schemas_for_endpoints(["/users"])
        .unwrap();
    let mut names: Vec<&str> = again.keys().map(String::as_str).collect();
    names.sort_unstable();
    assert_eq!(names, ["Address", "Country", "User"]);
}

const SECURED: &str = r##"
openapi: 3.1.0
info:
  title: Secured
  version: "1"
security:
  - apiKey: []
paths:
  /accounts/{accountId}/orders:
    summary: Orders of one account
    parameters:
      - name: accountId
        in: path
        required: true
        schema:
          $ref: "#/components/schemas/AccountId"
    get:
      operationId: listOrders
      security:
        - oauth: [orders:read]
      parameters:
        - name: filter
          in: query
          style: deepObject
          explode: true
          schema:
            type: object
      responses:
        "200":
          description: ok
          links:
            next:
              operationId: listOrders
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/OrderPage"
webhooks:
  orderShipped:
    post:
      responses:
        "200":
          description: ok
components:
  schemas:
    AccountId:
      type: string
    OrderPage:
      type: array
      items:
        $ref: "#/components/schemas/Order"
    Order:
      type: object
      properties:
        id:
          type: string
  securitySchemes:
    apiKey:
      type: apiKey
      in: header
      name: X-Key
    oauth:
      type: oauth2
      flows: {}
"##;

#[test]
fn unmodeled_fields_survive_extraction() {
    let doc = Document::load(SECURED).unwrap();
    let subset = extract_subset(&doc, ["/orders"], ResolveOptions::default()).unwrap();
    let yaml = serde_yaml_ng::to_string(&subset).unwrap();
    let reloaded = Document::load(&yaml).unwrap();
    let spec = reloaded.spec();

    assert_eq!(spec.extra["security"], serde_json::json!([{"apiKey": []}]));
    assert!(!spec.extra.contains_key("webhooks"));

    let item = &spec.paths["/accounts/{accountId}/orders"];
    assert_eq!(item.summary.as_deref(), Some("Orders of one account"));
    match item.parameters.as_slice() {
        [ParameterOrRef::Parameter(p)] => assert_eq!(p.name, "accountId"),
        other => panic!("unexpected path parameters: {other:?}"),
    }

    let op = reloaded.operation_for_endpoint("/orders").unwrap();
    assert_eq!(
        op.extra["security"],
        serde_json::json!([{"oauth": ["orders:read"]}])
    );
    let ParameterOrRef::Parameter(filter) = &op.parameters[0] else {
        panic!("expected inline parameter");
    };
    assert_eq!(filter.extra["style"], "deepObject");
    assert_eq!(filter.extra["explode"], true);
    let ResponseOrRef::Response(ok) = &op.responses["200"] else {
        panic!("expected inline response");
    };
    assert!(ok.extra.contains_key("links"));

    let components = spec.components.as_ref().unwrap();
    assert_eq!(
        components.schemas.keys().collect::<Vec<_>>(),
        ["AccountId", "OrderPage", "Order"]
    );
    let schemes = components.extra["securitySchemes"].as_object().unwrap();
    assert_eq!(schemes.keys().collect::<Vec<_>>(), ["apiKey", "oauth"]);
}

#[test]
fn array_component_expands_its_items() {
    let doc = Document::load(SECURED).unwrap();
    let schemas = SchemaResolver::new(&doc)
        .schemas_for_endpoints(["/orders"])
        .unwrap();
    // Operation-level closure only; the path parameter is a subset concern.
    assert_eq!(sorted_names(&schemas), ["Order", "OrderPage"]);
}
