use crate::coercion::CoercionError;
use crate::compiler::CompileError;
use crate::path::ResponsePath;
use libgraphql_schema::ast;
use serde::Serialize;
use thiserror::Error;

/// `extensions.code` values attached to errors raised by the engine itself
/// (as opposed to errors returned by resolvers).
pub mod codes {
    pub const ABSTRACT_TYPE_RESOLUTION_ERROR: &str = "ABSTRACT_TYPE_RESOLUTION_ERROR";
    pub const ARGUMENT_COERCION_ERROR: &str = "ARGUMENT_COERCION_ERROR";
    pub const COMPILATION_ERROR: &str = "COMPILATION_ERROR";
    pub const LEAF_COERCION_ERROR: &str = "LEAF_COERCION_ERROR";
    pub const NON_NULL_VIOLATION: &str = "NON_NULL_VIOLATION";
    pub const NOT_A_SUBSCRIPTION_STREAM: &str = "NOT_A_SUBSCRIPTION_STREAM";
    pub const REQUEST_CANCELLED: &str = "REQUEST_CANCELLED";
    pub const RESOLVER_PANIC: &str = "RESOLVER_PANIC";
    pub const VARIABLE_COERCION_ERROR: &str = "VARIABLE_COERCION_ERROR";
}

/// An error produced while resolving a single field.
///
/// Anything that implements [`Display`](std::fmt::Display) converts into a
/// `FieldError`, so resolvers can use `?` on most error types directly.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldError {
    extensions: Option<serde_json::Map<String, serde_json::Value>>,
    message: String,
}
impl FieldError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            extensions: None,
            message: message.into(),
        }
    }

    pub fn extensions(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        self.extensions.as_ref()
    }

    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    pub fn with_code(self, code: &str) -> Self {
        self.with_extension("code", code)
    }

    pub fn with_extension(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.extensions
            .get_or_insert_with(serde_json::Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub(crate) fn into_graphql_error(
        self,
        path: ResponsePath,
        location: Option<ast::Pos>,
    ) -> GraphQLError {
        GraphQLError {
            extensions: self.extensions,
            locations: location.map(SourcePosition::from).into_iter().collect(),
            message: self.message,
            path: Some(path),
        }
    }
}
impl<E: std::fmt::Display> std::convert::From<E> for FieldError {
    fn from(err: E) -> Self {
        Self::new(err.to_string())
    }
}

pub type FieldResult<T> = std::result::Result<T, FieldError>;

/// A `{line, column}` pair in the executable document.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct SourcePosition {
    pub column: usize,
    pub line: usize,
}
impl std::convert::From<ast::Pos> for SourcePosition {
    fn from(pos: ast::Pos) -> Self {
        Self {
            column: pos.column,
            line: pos.line,
        }
    }
}

/// An entry of the `errors` list in an
/// [`ExecutionResult`](crate::ExecutionResult).
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphQLError {
    pub(crate) message: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) locations: Vec<SourcePosition>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) path: Option<ResponsePath>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) extensions: Option<serde_json::Map<String, serde_json::Value>>,
}
impl GraphQLError {
    /// An error that is not tied to any position in the response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            extensions: None,
            locations: vec![],
            message: message.into(),
            path: None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        self.extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .and_then(|code| code.as_str())
    }

    pub fn extensions(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        self.extensions.as_ref()
    }

    pub fn locations(&self) -> &[SourcePosition] {
        self.locations.as_slice()
    }

    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    pub fn path(&self) -> Option<&ResponsePath> {
        self.path.as_ref()
    }

    pub fn with_code(self, code: &str) -> Self {
        let mut extensions = self.extensions.unwrap_or_default();
        extensions.insert("code".to_string(), serde_json::Value::from(code));
        Self {
            extensions: Some(extensions),
            ..self
        }
    }

    pub fn with_location(mut self, location: Option<ast::Pos>) -> Self {
        self.locations.extend(location.map(SourcePosition::from));
        self
    }
}
impl std::fmt::Display for GraphQLError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(path) if !path.is_root() => write!(f, "{} (at `{path}`)", self.message),
            _ => f.write_str(self.message.as_str()),
        }
    }
}

/// Errors that prevent a request from producing any data.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ExecutionError {
    #[error(
        "Failed to compile the operation:\n{}",
        errors.iter()
            .map(|err| format!("  * {err}"))
            .collect::<Vec<_>>()
            .join("\n"),
    )]
    Compile {
        errors: Vec<CompileError>,
    },

    #[error("The `{field_name}` subscription field did not resolve to an event stream")]
    NotASubscriptionStream {
        field_name: String,
    },

    #[error("Request was cancelled")]
    RequestCancelled,

    #[error(
        "Failed to coerce variable values:\n{}",
        errors.iter()
            .map(|err| format!("  * {err}"))
            .collect::<Vec<_>>()
            .join("\n"),
    )]
    VariableCoercion {
        errors: Vec<CoercionError>,
    },
}
impl ExecutionError {
    /// The top-level `errors` entries reported for this failure.
    pub fn to_graphql_errors(&self) -> Vec<GraphQLError> {
        match self {
            Self::Compile { errors } => errors.iter()
                .map(|err| GraphQLError::new(err.to_string())
                    .with_location(err.location())
                    .with_code(codes::COMPILATION_ERROR))
                .collect(),

            Self::NotASubscriptionStream { .. } => vec![
                GraphQLError::new(self.to_string())
                    .with_code(codes::NOT_A_SUBSCRIPTION_STREAM),
            ],

            Self::RequestCancelled => vec![
                GraphQLError::new(self.to_string())
                    .with_code(codes::REQUEST_CANCELLED),
            ],

            Self::VariableCoercion { errors } => errors.iter()
                .map(|err| GraphQLError::new(err.to_string())
                    .with_code(codes::VARIABLE_COERCION_ERROR))
                .collect(),
        }
    }
}
