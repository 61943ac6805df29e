use crate::error::ExecutionError;
use crate::error::GraphQLError;
use crate::path::ResponsePath;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

/// One GraphQL response payload.
///
/// For a plain query or mutation this is the whole response. For an
/// operation using `@defer`/`@stream` the first `ExecutionResult` is the
/// initial payload and every following one is an incremental payload
/// carrying a `path` and either `data` (a deferred fragment) or `items` (a
/// streamed list item).
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) data: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) items: Option<Value>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) errors: Vec<GraphQLError>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) path: Option<ResponsePath>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) label: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) extensions: Option<serde_json::Map<String, Value>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) has_next: Option<bool>,
}
impl ExecutionResult {
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn errors(&self) -> &[GraphQLError] {
        self.errors.as_slice()
    }

    pub fn extensions(&self) -> Option<&serde_json::Map<String, Value>> {
        self.extensions.as_ref()
    }

    pub fn has_next(&self) -> Option<bool> {
        self.has_next
    }

    /// `true` when no errors were reported.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn items(&self) -> Option<&Value> {
        self.items.as_ref()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn path(&self) -> Option<&ResponsePath> {
        self.path.as_ref()
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Assembles [`ExecutionResult`]s, putting their errors in a deterministic
/// order.
#[derive(Debug, Default)]
pub(crate) struct ResultBuilder {
    result: ExecutionResult,
}
impl ResultBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The result of a request that failed before producing any data.
    pub(crate) fn request_error(err: &ExecutionError) -> ExecutionResult {
        tracing::debug!(error = %err, "request failed");
        Self::new()
            .data(Value::Null)
            .errors(err.to_graphql_errors())
            .finalize()
    }

    pub(crate) fn data(mut self, data: Value) -> Self {
        self.result.data = Some(data);
        self
    }

    pub(crate) fn errors(mut self, errors: Vec<GraphQLError>) -> Self {
        self.result.errors = errors;
        self
    }

    pub(crate) fn extensions(
        mut self,
        extensions: Option<serde_json::Map<String, Value>>,
    ) -> Self {
        self.result.extensions = extensions;
        self
    }

    pub(crate) fn has_next(mut self, has_next: bool) -> Self {
        self.result.has_next = Some(has_next);
        self
    }

    pub(crate) fn items(mut self, items: Value) -> Self {
        self.result.items = Some(items);
        self
    }

    pub(crate) fn label(mut self, label: Option<String>) -> Self {
        self.result.label = label;
        self
    }

    pub(crate) fn path(mut self, path: ResponsePath) -> Self {
        self.result.path = Some(path);
        self
    }

    pub(crate) fn finalize(mut self) -> ExecutionResult {
        sort_errors(&mut self.result.errors);
        self.result
    }
}

/// Path-less errors first, then by position in the response. The sort is
/// stable, so errors at the same position stay in the order they were
/// reported.
pub(crate) fn sort_errors(errors: &mut [GraphQLError]) {
    errors.sort_by(|a, b| match (&a.path, &b.path) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.response_order(b),
    });
}
