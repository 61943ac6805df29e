use crate::OperationKind;
use crate::schema::SchemaBuilder;
use crate::types::Field;
use crate::types::GraphQLType;
use crate::types::TypeId;
use std::collections::HashMap;

/// Represents a fully typechecked and immutable GraphQL schema.
///
/// All types are stored in a flat arena and addressed by [`TypeId`]. A
/// `Schema` is never mutated after [`SchemaBuilder::build()`] returns, so it
/// can be shared freely (typically behind an `Arc`) across threads.
#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    pub(crate) directive_names: Vec<String>,
    pub(crate) mutation_type: Option<TypeId>,
    pub(crate) possible_types: HashMap<TypeId, Vec<TypeId>>,
    pub(crate) query_type: TypeId,
    pub(crate) subscription_type: Option<TypeId>,
    pub(crate) type_ids: HashMap<String, TypeId>,
    pub(crate) types: Vec<GraphQLType>,
}
impl Schema {
    /// Helper function that just delegates to [`SchemaBuilder::new()`].
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Names of the custom directives defined by the schema documents.
    pub fn defined_directives(&self) -> &[String] {
        self.directive_names.as_slice()
    }

    /// Iterate all types that were defined by the schema documents (i.e.
    /// excluding the built-in scalars).
    pub fn defined_types(&self) -> impl Iterator<Item = (TypeId, &GraphQLType)> {
        self.types()
            .filter(|(_, type_)| type_.def_location().file_position().is_some())
    }

    /// Look up the field named `field_name` on the object or interface type
    /// `type_id`.
    pub fn field(&self, type_id: TypeId, field_name: &str) -> Option<&Field> {
        self.get(type_id)
            .fields()
            .and_then(|fields| fields.get(field_name))
    }

    /// Dereference a [`TypeId`] allocated by this schema.
    ///
    /// Panics if `type_id` was produced by a different schema and is out of
    /// range for this one.
    pub fn get(&self, type_id: TypeId) -> &GraphQLType {
        &self.types[type_id.index()]
    }

    /// Returns `true` if the concrete object type `object_type` is a valid
    /// runtime type for `abstract_type` (an object is a possible type of
    /// itself).
    pub fn is_possible_type(&self, abstract_type: TypeId, object_type: TypeId) -> bool {
        self.possible_types(abstract_type).contains(&object_type)
    }

    /// Returns this schema's Mutation root operation type (if one was
    /// defined). This factors in any `schema { mutation: ... }` override of
    /// the default `Mutation` name.
    pub fn mutation_type(&self) -> Option<TypeId> {
        self.mutation_type
    }

    /// The root operation type for `kind`, if the schema defines one.
    pub fn operation_type(&self, kind: OperationKind) -> Option<TypeId> {
        match kind {
            OperationKind::Mutation => self.mutation_type,
            OperationKind::Query => Some(self.query_type),
            OperationKind::Subscription => self.subscription_type,
        }
    }

    /// The concrete object types a value of `type_id` may have at runtime:
    /// the members of a union, the implementors of an interface, or just the
    /// object type itself. Empty for non-composite types.
    pub fn possible_types(&self, type_id: TypeId) -> &[TypeId] {
        self.possible_types
            .get(&type_id)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    /// Returns this schema's Query root operation type.
    pub fn query_type(&self) -> TypeId {
        self.query_type
    }

    /// Returns this schema's Subscription root operation type (if one was
    /// defined).
    pub fn subscription_type(&self) -> Option<TypeId> {
        self.subscription_type
    }

    pub fn type_by_name(&self, type_name: &str) -> Option<&GraphQLType> {
        self.type_id(type_name).map(|type_id| self.get(type_id))
    }

    pub fn type_id(&self, type_name: &str) -> Option<TypeId> {
        self.type_ids.get(type_name).copied()
    }

    /// Iterate every type in the arena (built-in scalars included) in
    /// allocation order.
    pub fn types(&self) -> impl Iterator<Item = (TypeId, &GraphQLType)> {
        self.types
            .iter()
            .enumerate()
            .map(|(idx, type_)| (TypeId(idx as u32), type_))
    }
}
