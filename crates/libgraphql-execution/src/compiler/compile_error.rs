use libgraphql_schema::ast;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum CompileError {
    #[error("Fragment `{name}` directly or indirectly spreads itself")]
    FragmentCycle {
        location: ast::Pos,
        name: String,
    },

    #[error("No operation name was given but the document defines multiple operations")]
    MultipleOperations,

    #[error("The schema does not define a Mutation root operation type")]
    NoMutationType,

    #[error("The document does not define any operations")]
    NoOperations,

    #[error("No object type is a possible runtime type of `{type_name}`")]
    NoPossibleTypes {
        location: ast::Pos,
        type_name: String,
    },

    #[error("The schema does not define a Subscription root operation type")]
    NoSubscriptionType,

    #[error("The document does not define an operation named `{name}`")]
    OperationNotFound {
        name: String,
    },

    #[error("The `{parent_type}` type does not define a field named `{field}`")]
    UndefinedField {
        field: String,
        location: ast::Pos,
        parent_type: String,
    },

    #[error("The document does not define a fragment named `{name}`")]
    UndefinedFragment {
        location: ast::Pos,
        name: String,
    },

    #[error("Reference to undefined type `{name}`")]
    UndefinedType {
        location: ast::Pos,
        name: String,
    },
}
impl CompileError {
    /// Where in the executable document the error was found, if anywhere.
    pub fn location(&self) -> Option<ast::Pos> {
        match self {
            Self::FragmentCycle { location, .. }
                | Self::NoPossibleTypes { location, .. }
                | Self::UndefinedField { location, .. }
                | Self::UndefinedFragment { location, .. }
                | Self::UndefinedType { location, .. } => Some(*location),

            Self::MultipleOperations
                | Self::NoMutationType
                | Self::NoOperations
                | Self::NoSubscriptionType
                | Self::OperationNotFound { .. } => None,
        }
    }
}
