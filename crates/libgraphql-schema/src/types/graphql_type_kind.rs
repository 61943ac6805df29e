use crate::types::GraphQLType;

/// The category of a [`GraphQLType`], without any of its definition data.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum GraphQLTypeKind {
    Bool,
    Enum,
    Float,
    ID,
    InputObject,
    Int,
    Interface,
    Object,
    Scalar,
    String,
    Union,
}
impl GraphQLTypeKind {
    /// Abstract kinds need a concrete object type chosen at execution time.
    pub fn is_abstract(&self) -> bool {
        matches!(self, Self::Interface | Self::Union)
    }

    /// Kinds that may appear in argument and variable positions.
    pub fn is_input(&self) -> bool {
        self.is_leaf() || matches!(self, Self::InputObject)
    }

    /// Kinds whose values complete without a sub-selection.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            Self::Bool
            | Self::Enum
            | Self::Float
            | Self::ID
            | Self::Int
            | Self::Scalar
            | Self::String
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "Boolean",
            Self::Float => "Float",
            Self::ID => "ID",
            Self::Int => "Int",
            Self::String => "String",
            Self::Enum => "Enum",
            Self::InputObject => "InputObject",
            Self::Interface => "Interface",
            Self::Object => "Object",
            Self::Scalar => "Scalar",
            Self::Union => "Union",
        }
    }
}
impl std::convert::From<&GraphQLType> for GraphQLTypeKind {
    fn from(value: &GraphQLType) -> Self {
        match value {
            GraphQLType::Bool => Self::Bool,
            GraphQLType::Float => Self::Float,
            GraphQLType::ID => Self::ID,
            GraphQLType::Int => Self::Int,
            GraphQLType::String => Self::String,
            GraphQLType::Enum(_) => Self::Enum,
            GraphQLType::InputObject(_) => Self::InputObject,
            GraphQLType::Interface(_) => Self::Interface,
            GraphQLType::Object(_) => Self::Object,
            GraphQLType::Scalar(_) => Self::Scalar,
            GraphQLType::Union(_) => Self::Union,
        }
    }
}
impl std::fmt::Display for GraphQLTypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
