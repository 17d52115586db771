//! Shape classification for schema nodes.
//!
//! Reference discovery only cares about four shapes: a `$ref`, an array
//! with `items`, an object with `properties`, and an `allOf` composition.
//! [`classify`] picks one of them for a node. The resolver uses the
//! single-shape matchers below instead, since one schema can be both an
//! object and a composition.

use indexmap::IndexMap;

use crate::error::ResolveError;
use crate::parse::schema::{SchemaOrRef, SchemaType};

/// Prefix of every reference the resolver follows.
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// The discovery-relevant shape of a schema node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaShape<'a> {
    /// `$ref` pointer.
    Reference(&'a str),
    /// Array schema; holds its `items`.
    Collection(&'a SchemaOrRef),
    /// `allOf` composition; holds its members.
    Composition(&'a [SchemaOrRef]),
    /// Object schema; holds its properties.
    Object(&'a IndexMap<String, SchemaOrRef>),
    /// Anything else. Terminates traversal.
    Primitive,
}

impl SchemaShape<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            SchemaShape::Reference(_) => "reference",
            SchemaShape::Collection(_) => "collection",
            SchemaShape::Composition(_) => "composition",
            SchemaShape::Object(_) => "object",
            SchemaShape::Primitive => "primitive",
        }
    }
}

/// Classify a node. Priority: reference, collection, composition, object.
pub fn classify(schema: &SchemaOrRef) -> SchemaShape<'_> {
    if let Some(ref_path) = as_reference(schema) {
        return SchemaShape::Reference(ref_path);
    }
    if let SchemaOrRef::Schema(s) = schema {
        if let Some(items) = s.items.as_deref() {
            return SchemaShape::Collection(items);
        }
    }
    if let Some(members) = composition_members(schema) {
        return SchemaShape::Composition(members);
    }
    if let Some(props) = object_properties(schema) {
        return SchemaShape::Object(props);
    }
    SchemaShape::Primitive
}

/// The pointer of a `$ref` node.
pub fn as_reference(schema: &SchemaOrRef) -> Option<&str> {
    match schema {
        SchemaOrRef::Ref { ref_path } => Some(ref_path),
        SchemaOrRef::Schema(_) => None,
    }
}

/// The pointer held by an array's `items`, when `items` is a `$ref`.
pub fn collection_item_reference(schema: &SchemaOrRef) -> Option<&str> {
    match schema {
        SchemaOrRef::Schema(s) => s.items.as_deref().and_then(as_reference),
        SchemaOrRef::Ref { .. } => None,
    }
}

/// Properties of an object schema: `type: object` or a non-empty
/// `properties` map.
pub fn object_properties(schema: &SchemaOrRef) -> Option<&IndexMap<String, SchemaOrRef>> {
    match schema {
        SchemaOrRef::Schema(s) => {
            let typed_object = s
                .schema_type
                .as_ref()
                .is_some_and(|t| t.contains(&SchemaType::Object));
            (typed_object || !s.properties.is_empty()).then_some(&s.properties)
        }
        SchemaOrRef::Ref { .. } => None,
    }
}

/// Members of a non-empty `allOf`.
pub fn composition_members(schema: &SchemaOrRef) -> Option<&[SchemaOrRef]> {
    match schema {
        SchemaOrRef::Schema(s) if !s.all_of.is_empty() => Some(s.all_of.as_slice()),
        _ => None,
    }
}

/// Extract the schema name from a `#/components/schemas/<Name>` pointer.
///
/// The name is everything after the final `/`.
pub fn schema_name_from_ref(ref_path: &str) -> Result<&str, ResolveError> {
    let rest = ref_path
        .strip_prefix(SCHEMA_REF_PREFIX)
        .ok_or_else(|| ResolveError::InvalidRefFormat(ref_path.to_string()))?;
    let name = rest.rsplit('/').next().unwrap_or(rest);
    if name.is_empty() {
        return Err(ResolveError::InvalidRefFormat(ref_path.to_string()));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::schema::{Schema, TypeSet};

    fn inline(schema: Schema) -> SchemaOrRef {
        SchemaOrRef::Schema(Box::new(schema))
    }

    #[test]
    fn reference_shape() {
        let node = SchemaOrRef::component_ref("User");
        assert_eq!(
            classify(&node),
            SchemaShape::Reference("#/components/schemas/User")
        );
        assert_eq!(as_reference(&node), Some("#/components/schemas/User"));
        assert!(object_properties(&node).is_none());
    }

    #[test]
    fn collection_of_refs() {
        let node = inline(Schema {
            schema_type: Some(TypeSet::Single(SchemaType::Array)),
            items: Some(Box::new(SchemaOrRef::component_ref("Item"))),
            ..Schema::default()
        });
        assert_eq!(classify(&node).kind(), "collection");
        assert_eq!(
            collection_item_reference(&node),
            Some("#/components/schemas/Item")
        );
    }

    #[test]
    fn collection_of_primitives_has_no_item_reference() {
        let node = inline(Schema {
            items: Some(Box::new(inline(Schema {
                schema_type: Some(TypeSet::Single(SchemaType::String)),
                ..Schema::default()
            }))),
            ..Schema::default()
        });
        assert_eq!(classify(&node).kind(), "collection");
        assert!(collection_item_reference(&node).is_none());
    }

    #[test]
    fn object_by_type_or_properties() {
        let typed = inline(Schema {
            schema_type: Some(TypeSet::Multiple(vec![SchemaType::Object, SchemaType::Null])),
            ..Schema::default()
        });
        assert_eq!(classify(&typed).kind(), "object");

        let mut props = IndexMap::new();
        props.insert("id".to_string(), inline(Schema::default()));
        let untyped = inline(Schema {
            properties: props,
            ..Schema::default()
        });
        assert_eq!(object_properties(&untyped).map(|p| p.len()), Some(1));
    }

    #[test]
    fn composition_and_object_are_independent() {
        let mut props = IndexMap::new();
        props.insert("extra".to_string(), inline(Schema::default()));
        let node = inline(Schema {
            properties: props,
            all_of: vec![SchemaOrRef::component_ref("Base")],
            ..Schema::default()
        });
        assert_eq!(classify(&node).kind(), "composition");
        assert!(object_properties(&node).is_some());
        assert_eq!(composition_members(&node).map(<[_]>::len), Some(1));
    }

    #[test]
    fn bare_schema_is_primitive() {
        let node = inline(Schema {
            schema_type: Some(TypeSet::Single(SchemaType::Integer)),
            ..Schema::default()
        });
        assert_eq!(classify(&node), SchemaShape::Primitive);
    }

    #[test]
    fn schema_names() {
        assert_eq!(
            schema_name_from_ref("#/components/schemas/Pet").unwrap(),
            "Pet"
        );
        assert_eq!(
            schema_name_from_ref("#/components/schemas/ns/Pet").unwrap(),
            "Pet"
        );
        assert!(matches!(
            schema_name_from_ref("#/components/parameters/Limit"),
            Err(ResolveError::InvalidRefFormat(_))
        ));
        assert!(matches!(
            schema_name_from_ref("other.yaml#/Pet"),
            Err(ResolveError::InvalidRefFormat(_))
        ));
        assert!(schema_name_from_ref("#/components/schemas/").is_err());
    }
}
