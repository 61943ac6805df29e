use crate::compiler::CompileError;
use crate::compiler::CompiledOperation;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use tokio::sync::OnceCell;

/// The memoized result of compiling one [`OperationCacheKey`]. Failures are
/// cached too: a document that does not compile will not compile the next
/// time either.
pub type CompileOutcome = Result<Arc<CompiledOperation>, Arc<Vec<CompileError>>>;

/// Everything a [`CompiledOperation`] depends on.
///
/// `directive_variables` holds the (serialized) values of each variable
/// referenced by `@skip`, `@include`, `@defer`, or `@stream`, since those are
/// evaluated at compile time.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct OperationCacheKey {
    pub directive_variables: Vec<(String, String)>,
    pub document: Arc<str>,
    pub operation_name: Option<String>,
    pub schema_id: u64,
}

/// A bounded LRU of compiled operations shared by every request an
/// `Executor` runs.
///
/// Concurrent requests for the same key compile it exactly once: the first
/// caller compiles while the rest await the entry's `OnceCell` (without
/// blocking their worker thread) and then share its result.
pub struct OperationCache {
    entries: Option<Mutex<LruCache<OperationCacheKey, Arc<OnceCell<CompileOutcome>>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}
impl OperationCache {
    /// A `capacity` of zero disables caching entirely.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity)
                .map(|capacity| Mutex::new(LruCache::new(capacity))),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub async fn get_or_compile<F>(&self, key: OperationCacheKey, compile: F) -> CompileOutcome
    where
        F: FnOnce() -> Result<CompiledOperation, Vec<CompileError>>,
    {
        let Some(entries) = &self.entries else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Self::run_compile(compile);
        };

        let (cell, hit) = {
            let mut entries = entries.lock();
            match entries.get(&key) {
                Some(cell) => (cell.clone(), true),
                None => {
                    let cell = Arc::new(OnceCell::new());
                    entries.put(key.clone(), cell.clone());
                    (cell, false)
                },
            }
        };

        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(operation_name = key.operation_name.as_deref(), "operation cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(operation_name = key.operation_name.as_deref(), "operation cache miss");
        }

        cell.get_or_init(|| async move { Self::run_compile(compile) })
            .await
            .clone()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.entries
            .as_ref()
            .map(|entries| entries.lock().len())
            .unwrap_or(0)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    fn run_compile<F>(compile: F) -> CompileOutcome
    where
        F: FnOnce() -> Result<CompiledOperation, Vec<CompileError>>,
    {
        compile().map(Arc::new).map_err(Arc::new)
    }
}
impl std::fmt::Debug for OperationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationCache")
            .field("hits", &self.hits())
            .field("len", &self.len())
            .field("misses", &self.misses())
            .finish()
    }
}
