use crate::ExecutableSchema;
use crate::ExecutableSchemaBuilder;
use crate::ExecutionResult;
use crate::Executor;
use crate::ExecutorConfig;
use crate::Request;
use crate::Response;
use crate::coercion::VariableValues;
use libgraphql_schema::Schema;
use std::sync::Arc;
use std::time::Duration;

pub(crate) fn builder(sdl: &str) -> ExecutableSchemaBuilder {
    let schema = Schema::builder()
        .load_str(None, sdl)
        .unwrap()
        .build()
        .unwrap();
    ExecutableSchema::builder(Arc::new(schema))
}

pub(crate) fn executor() -> Executor {
    Executor::new(ExecutorConfig::default())
}

pub(crate) fn variables(value: serde_json::Value) -> VariableValues {
    match value {
        serde_json::Value::Object(map) => map,
        _ => VariableValues::new(),
    }
}

pub(crate) fn request(schema: &Arc<ExecutableSchema>, query: &str) -> Request {
    Request::parse(schema.clone(), query).unwrap()
}

/// Execute `query` and return its (non-incremental) result.
pub(crate) async fn run(schema: &Arc<ExecutableSchema>, query: &str) -> ExecutionResult {
    run_request(&executor(), request(schema, query)).await
}

pub(crate) async fn run_request(executor: &Executor, request: Request) -> ExecutionResult {
    match executor.execute(request).await {
        Response::Single(result) => result,
        Response::Stream(_) => panic!("expected a single result, got a stream"),
    }
}

pub(crate) fn error_paths(result: &ExecutionResult) -> Vec<serde_json::Value> {
    result.errors()
        .iter()
        .map(|err| err.path().map(|path| path.to_json()).unwrap_or(serde_json::Value::Null))
        .collect()
}

pub(crate) async fn sleep_ms(millis: u64) {
    tokio::time::sleep(Duration::from_millis(millis)).await;
}
