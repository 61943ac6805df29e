use crate::coercion::VariableValues;
use crate::coercion::coerce_variables;
use crate::compiler::OperationCache;
use crate::compiler::OperationCacheKey;
use crate::compiler::OperationCompiler;
use crate::compiler::directive_variable_names;
use crate::compiler::select_operation;
use crate::config::ExecutorConfig;
use crate::context::ExecutionContext;
use crate::error::ExecutionError;
use crate::executable_schema::ExecutableSchema;
use crate::execution;
use crate::pipeline::PipelineCache;
use crate::response::ExecutionResult;
use crate::response::ResultBuilder;
use crate::value::FieldValue;
use futures::Stream;
use futures::StreamExt;
use futures::stream::BoxStream;
use libgraphql_schema::OperationKind;
use libgraphql_schema::ast;
use parking_lot::Mutex;
use std::any::Any;
use std::pin::Pin;
use std::sync::Arc;
use std::task::Context;
use std::task::Poll;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Everything needed to execute one operation.
#[derive(Clone)]
pub struct Request {
    cancellation: CancellationToken,
    context_data: Option<Arc<dyn Any + Send + Sync>>,
    document: Arc<ast::operation::Document>,
    operation_name: Option<String>,
    root_value: Arc<FieldValue>,
    schema: Arc<ExecutableSchema>,
    variables: VariableValues,
}
impl Request {
    pub fn new(schema: Arc<ExecutableSchema>, document: Arc<ast::operation::Document>) -> Self {
        Self {
            cancellation: CancellationToken::new(),
            context_data: None,
            document,
            operation_name: None,
            root_value: Arc::new(FieldValue::Null),
            schema,
            variables: VariableValues::new(),
        }
    }

    /// Parse `query` and build a request for it.
    pub fn parse(
        schema: Arc<ExecutableSchema>,
        query: &str,
    ) -> Result<Self, ast::operation::ParseError> {
        Ok(Self::new(schema, Arc::new(ast::operation::parse(query)?)))
    }

    /// Cancelling `token` stops the request from starting any more
    /// resolvers.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Request-scoped data made available to resolvers and middleware via
    /// [`ResolverContext::data()`](crate::ResolverContext::data).
    pub fn context_data<T: Any + Send + Sync>(mut self, data: T) -> Self {
        self.context_data = Some(Arc::new(data));
        self
    }

    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// The parent value handed to root field resolvers.
    pub fn root_value(mut self, root_value: impl Into<FieldValue>) -> Self {
        self.root_value = Arc::new(root_value.into());
        self
    }

    pub fn variables(mut self, variables: VariableValues) -> Self {
        self.variables = variables;
        self
    }
}
impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("operation_name", &self.operation_name)
            .field("schema_id", &self.schema.schema_id())
            .field("variables", &self.variables)
            .finish()
    }
}

/// The outcome of [`Executor::execute()`].
pub enum Response {
    Single(ExecutionResult),

    /// Returned for subscriptions and for operations that deliver
    /// `@defer`/`@stream` payloads incrementally.
    Stream(ResponseStream),
}
impl Response {
    /// Gather every payload. A single result becomes a one-element list.
    pub async fn collect(self) -> Vec<ExecutionResult> {
        match self {
            Self::Single(result) => vec![result],
            Self::Stream(stream) => stream.collect().await,
        }
    }

    /// The result of a non-streaming response.
    pub fn into_single(self) -> Option<ExecutionResult> {
        match self {
            Self::Single(result) => Some(result),
            Self::Stream(_) => None,
        }
    }

    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }
}
impl std::fmt::Debug for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(result) => f.debug_tuple("Single").field(result).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// A sequence of [`ExecutionResult`]s that can be consumed once.
pub struct ResponseStream(BoxStream<'static, ExecutionResult>);
impl Stream for ResponseStream {
    type Item = ExecutionResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.0.poll_next_unpin(cx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

/// Executes requests against any number of [`ExecutableSchema`]s, sharing a
/// compiled-operation cache and a field-pipeline cache between them.
pub struct Executor {
    config: ExecutorConfig,
    operations: OperationCache,
    pipelines: Arc<PipelineCache>,
}
impl Executor {
    pub fn new(config: ExecutorConfig) -> Self {
        Self {
            operations: OperationCache::new(config.operation_cache_capacity),
            pipelines: Arc::new(PipelineCache::new(config.pipeline_cache_capacity)),
            config,
        }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub async fn execute(&self, request: Request) -> Response {
        let span = tracing::info_span!(
            "execute",
            operation_name = request.operation_name.as_deref(),
            schema_id = request.schema.schema_id(),
        );
        self.execute_inner(request).instrument(span).await
    }

    pub fn operation_cache(&self) -> &OperationCache {
        &self.operations
    }

    pub fn pipeline_cache(&self) -> &PipelineCache {
        &self.pipelines
    }

    async fn execute_inner(&self, request: Request) -> Response {
        let Request {
            cancellation,
            context_data,
            document,
            operation_name,
            root_value,
            schema,
            variables,
        } = request;

        let operation_def = match select_operation(&document, operation_name.as_deref()) {
            Ok(operation_def) => operation_def,
            Err(err) => return Response::Single(ResultBuilder::request_error(
                &ExecutionError::Compile { errors: vec![err] },
            )),
        };

        let variables = match coerce_variables(schema.schema(), operation_def, &variables) {
            Ok(variables) => variables,
            Err(errors) => return Response::Single(ResultBuilder::request_error(
                &ExecutionError::VariableCoercion { errors },
            )),
        };

        let cache_key = OperationCacheKey {
            directive_variables: directive_variable_names(&document)
                .into_iter()
                .map(|name| {
                    let value = variables.get(&name)
                        .map(|value| value.to_string())
                        .unwrap_or_default();
                    (name, value)
                })
                .collect(),
            document: Arc::from(document.to_string()),
            operation_name: operation_name.clone(),
            schema_id: schema.schema_id(),
        };
        let compiled = self.operations.get_or_compile(cache_key, || {
            OperationCompiler::compile(
                schema.schema(),
                &document,
                operation_name.as_deref(),
                &variables,
            )
        }).await;
        let operation = match compiled {
            Ok(operation) => operation,
            Err(errors) => return Response::Single(ResultBuilder::request_error(
                &ExecutionError::Compile { errors: errors.as_ref().clone() },
            )),
        };

        if cancellation.is_cancelled() {
            return Response::Single(ResultBuilder::request_error(&ExecutionError::RequestCancelled));
        }

        let kind = operation.kind();
        let ctx = Arc::new(ExecutionContext {
            cancellation,
            config: self.config.clone(),
            extensions: Mutex::new(serde_json::Map::new()),
            operation,
            pipelines: self.pipelines.clone(),
            request_data: context_data,
            resolver_permits: Arc::new(Semaphore::new(self.config.max_concurrent_resolvers.max(1))),
            root_value,
            schema,
            variables,
        });

        match kind {
            OperationKind::Subscription => match execution::subscribe(ctx).await {
                Ok(events) => Response::Stream(ResponseStream(events)),
                Err(result) => Response::Single(result),
            },

            OperationKind::Mutation | OperationKind::Query => {
                let (initial, pending) = execution::execute_operation(ctx.clone()).await;
                tracing::debug!(
                    errors = initial.errors().len(),
                    incremental = pending.len(),
                    "initial payload ready",
                );
                if pending.is_empty() {
                    Response::Single(initial)
                } else {
                    Response::Stream(ResponseStream(
                        execution::incremental_stream(ctx, initial, pending),
                    ))
                }
            },
        }
    }
}
impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("config", &self.config)
            .field("operations", &self.operations)
            .field("pipelines", &self.pipelines)
            .finish()
    }
}
