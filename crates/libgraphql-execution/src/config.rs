use serde::Deserialize;
use serde::Serialize;

/// Tuning knobs for an [`Executor`](crate::Executor).
///
/// Every field is optional when deserializing; omitted fields take their
/// default.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields, default)]
pub struct ExecutorConfig {
    /// Upper bound on how many sibling fields of one selection set are
    /// in flight at once.
    pub max_concurrent_fields: usize,

    /// Upper bound on resolver invocations in flight across a whole request.
    pub max_concurrent_resolvers: usize,

    /// Number of compiled operations kept in the LRU. Zero disables the
    /// cache.
    pub operation_cache_capacity: usize,

    /// Number of composed field pipelines kept in the LRU. Zero disables the
    /// cache.
    pub pipeline_cache_capacity: usize,

    /// Run each resolver on its own tokio task (as opposed to polling it
    /// inline on the task executing its parent selection set).
    pub spawn_resolvers: bool,
}
impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fields: 64,
            max_concurrent_resolvers: 256,
            operation_cache_capacity: 1024,
            pipeline_cache_capacity: 4096,
            spawn_resolvers: true,
        }
    }
}
