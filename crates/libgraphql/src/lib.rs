pub use libgraphql_schema::*;

/// Compile and execute GraphQL operations against a
/// [`Schema`](crate::schema::Schema) (resolvers, field middleware,
/// `@defer`/`@stream`, subscriptions).
pub mod execution {
    pub use libgraphql_execution::*;
}
