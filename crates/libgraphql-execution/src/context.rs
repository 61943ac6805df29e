use crate::arguments::Arguments;
use crate::coercion::VariableValues;
use crate::compiler::CompiledField;
use crate::compiler::CompiledOperation;
use crate::compiler::CompiledSelectionSet;
use crate::config::ExecutorConfig;
use crate::error::FieldResult;
use crate::error::GraphQLError;
use crate::executable_schema::ExecutableSchema;
use crate::path::ResponsePath;
use crate::pipeline::PipelineCache;
use crate::value::FieldValue;
use futures::stream::BoxStream;
use libgraphql_schema::Schema;
use libgraphql_schema::types::TypeAnnotation;
use libgraphql_schema::types::TypeId;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::any::Any;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Per-request state shared by every field of one execution. Never shared
/// across requests.
pub(crate) struct ExecutionContext {
    pub(crate) cancellation: CancellationToken,
    pub(crate) config: ExecutorConfig,
    pub(crate) extensions: Mutex<serde_json::Map<String, serde_json::Value>>,
    pub(crate) operation: Arc<CompiledOperation>,
    pub(crate) pipelines: Arc<PipelineCache>,
    pub(crate) request_data: Option<Arc<dyn Any + Send + Sync>>,
    pub(crate) resolver_permits: Arc<Semaphore>,
    pub(crate) root_value: Arc<FieldValue>,
    pub(crate) schema: Arc<ExecutableSchema>,
    pub(crate) variables: VariableValues,
}
impl ExecutionContext {
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Maximum number of sibling fields (or list items) completed at once.
    pub(crate) fn fan_out_limit(&self) -> usize {
        self.config.max_concurrent_fields.max(1)
    }

    pub(crate) fn take_extensions(&self) -> Option<serde_json::Map<String, serde_json::Value>> {
        let extensions = std::mem::take(&mut *self.extensions.lock());
        if extensions.is_empty() {
            None
        } else {
            Some(extensions)
        }
    }
}

/// Append-only, thread-safe list of the errors reported while producing one
/// payload. Insertion order is the sequence used to break ordering ties.
#[derive(Debug, Default)]
pub(crate) struct ErrorCollector {
    errors: Mutex<Vec<GraphQLError>>,
}
impl ErrorCollector {
    pub(crate) fn report_error(&self, error: GraphQLError) {
        tracing::debug!(error = %error, "field error");
        self.errors.lock().push(error);
    }

    pub(crate) fn take(&self) -> Vec<GraphQLError> {
        std::mem::take(&mut *self.errors.lock())
    }
}

/// Work scheduled by `@defer` or `@stream` while producing a payload.
pub(crate) enum PendingIncremental {
    Defer {
        label: Option<String>,
        object_type: TypeId,
        parent: Arc<FieldValue>,
        path: ResponsePath,
        selections: Arc<CompiledSelectionSet>,
    },

    Stream {
        field: Arc<CompiledField>,
        item_annotation: TypeAnnotation,
        label: Option<String>,
        path: ResponsePath,
        source: BoxStream<'static, FieldResult<FieldValue>>,
        start_index: usize,
    },
}
impl PendingIncremental {
    pub(crate) fn path(&self) -> &ResponsePath {
        match self {
            Self::Defer { path, .. } | Self::Stream { path, .. } => path,
        }
    }
}

/// Incremental work registered by one payload, plus the response positions
/// that payload nulled out. Work under a nulled position is discarded.
#[derive(Default)]
pub(crate) struct IncrementalRegistry {
    nulled_paths: Mutex<Vec<ResponsePath>>,
    pending: Mutex<Vec<PendingIncremental>>,
}
impl IncrementalRegistry {
    pub(crate) fn record_null(&self, path: ResponsePath) {
        self.nulled_paths.lock().push(path);
    }

    pub(crate) fn register(&self, task: PendingIncremental) {
        self.pending.lock().push(task);
    }

    /// Remove and return every registered task whose response position
    /// survived null propagation.
    pub(crate) fn take_live(&self) -> Vec<PendingIncremental> {
        let pending = std::mem::take(&mut *self.pending.lock());
        let nulled_paths = std::mem::take(&mut *self.nulled_paths.lock());
        pending.into_iter()
            .filter(|task| !nulled_paths.iter().any(|nulled| task.path().starts_with(nulled)))
            .collect()
    }
}

/// What a single payload (the initial result, one deferred fragment, one
/// streamed item, or one subscription event) executes within.
#[derive(Clone)]
pub(crate) struct ExecutionScope {
    pub(crate) ctx: Arc<ExecutionContext>,
    pub(crate) errors: Arc<ErrorCollector>,
    pub(crate) incremental: Arc<IncrementalRegistry>,
}
impl ExecutionScope {
    pub(crate) fn new(ctx: Arc<ExecutionContext>) -> Self {
        Self {
            ctx,
            errors: Arc::new(ErrorCollector::default()),
            incremental: Arc::new(IncrementalRegistry::default()),
        }
    }
}

/// Everything a resolver (or middleware) can see about the field being
/// resolved.
#[derive(Clone)]
pub struct ResolverContext {
    pub(crate) arguments: Arc<Arguments>,
    pub(crate) exec: Arc<ExecutionContext>,
    pub(crate) field: Arc<CompiledField>,
    pub(crate) object_type: TypeId,
    pub(crate) parent: Arc<FieldValue>,
    pub(crate) path: ResponsePath,
}
impl ResolverContext {
    /// Deserialize the coerced argument `name`.
    pub fn arg<T: DeserializeOwned>(&self, name: &str) -> FieldResult<T> {
        self.arguments.get(name)
    }

    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.exec.cancellation
    }

    /// The request-scoped context value supplied with the request, if it is
    /// a `T`.
    pub fn data<T: Any>(&self) -> Option<&T> {
        self.exec.request_data
            .as_ref()
            .and_then(|data| data.downcast_ref::<T>())
    }

    pub fn field(&self) -> &CompiledField {
        &self.field
    }

    pub fn field_name(&self) -> &str {
        self.field.field_name()
    }

    pub fn is_cancelled(&self) -> bool {
        self.exec.is_cancelled()
    }

    /// The concrete object type that owns the field.
    pub fn object_type(&self) -> TypeId {
        self.object_type
    }

    pub fn object_type_name(&self) -> &str {
        self.schema().get(self.object_type).name()
    }

    pub fn parent(&self) -> &FieldValue {
        &self.parent
    }

    /// Downcast an opaque parent value.
    pub fn parent_as<T: Any>(&self) -> Option<&T> {
        self.parent.downcast_ref::<T>()
    }

    pub fn parent_json(&self) -> Option<&serde_json::Value> {
        self.parent.as_json()
    }

    pub fn path(&self) -> &ResponsePath {
        &self.path
    }

    pub fn response_name(&self) -> &str {
        self.field.response_name()
    }

    pub fn schema(&self) -> &Schema {
        self.exec.schema.schema()
    }

    /// Add (or replace) a member of the response's top-level `extensions`.
    pub fn set_extension(&self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.exec.extensions.lock().insert(key.into(), value.into());
    }

    pub fn variables(&self) -> &VariableValues {
        &self.exec.variables
    }
}
impl std::fmt::Debug for ResolverContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverContext")
            .field("arguments", &self.arguments)
            .field("field", &self.field.field_name())
            .field("object_type", &self.object_type)
            .field("path", &self.path.to_string())
            .finish()
    }
}
