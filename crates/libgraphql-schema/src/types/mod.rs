mod enum_type;
mod field;
mod graphql_type;
mod graphql_type_kind;
mod input_object_type;
mod object_or_interface_type_data;
mod parameter;
mod scalar_type;
mod type_annotation;
mod type_id;
mod types_map_builder;
mod union_type;

pub use enum_type::EnumType;
pub use enum_type::EnumValue;
pub use field::Field;
pub use graphql_type::GraphQLType;
pub use graphql_type_kind::GraphQLTypeKind;
pub use input_object_type::InputObjectType;
pub use object_or_interface_type_data::InterfaceType;
pub use object_or_interface_type_data::ObjectOrInterfaceTypeTrait;
pub use object_or_interface_type_data::ObjectType;
pub(crate) use object_or_interface_type_data::ObjectOrInterfaceTypeData;
pub use parameter::Parameter;
pub use scalar_type::ScalarType;
pub use type_annotation::ListTypeAnnotation;
pub use type_annotation::NamedTypeAnnotation;
pub use type_annotation::TypeAnnotation;
pub use type_id::TypeId;
pub(crate) use types_map_builder::TypesMapBuilder;
pub use union_type::UnionType;

#[cfg(test)]
mod tests;
