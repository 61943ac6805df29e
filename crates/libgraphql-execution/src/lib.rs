//! Operation compilation and concurrent execution for `libgraphql`.
//!
//! An [`ExecutableSchema`] binds resolvers, type resolvers, and middleware to
//! a [`Schema`](libgraphql_schema::Schema). An [`Executor`] compiles each
//! requested operation (caching the result), composes each field's
//! middleware pipeline (also cached), and resolves fields concurrently while
//! keeping response order, list order, and null propagation as GraphQL
//! prescribes.

pub mod arguments;
pub mod coercion;
pub mod compiler;
mod config;
mod context;
mod error;
pub mod executable_schema;
mod execution;
mod executor;
pub mod middleware;
mod path;
mod pipeline;
mod response;
mod value;

pub use arguments::Arguments;
pub use config::ExecutorConfig;
pub use context::ResolverContext;
pub use error::ExecutionError;
pub use error::FieldError;
pub use error::FieldResult;
pub use error::GraphQLError;
pub use error::SourcePosition;
pub use error::codes;
pub use executable_schema::ExecutableSchema;
pub use executable_schema::ExecutableSchemaBuilder;
pub use executable_schema::ExecutableSchemaBuildError;
pub use executor::Executor;
pub use executor::Request;
pub use executor::Response;
pub use executor::ResponseStream;
pub use middleware::FieldDelegate;
pub use middleware::Middleware;
pub use middleware::MiddlewareStage;
pub use path::PathSegment;
pub use path::ResponsePath;
pub use pipeline::PipelineCache;
pub use pipeline::build_field_delegate;
pub use pipeline::default_resolver;
pub use response::ExecutionResult;
pub use tokio_util::sync::CancellationToken;
pub use value::EventStream;
pub use value::FieldValue;

#[cfg(test)]
mod tests;
