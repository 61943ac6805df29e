use crate::coercion::VariableValues;
use crate::compiler::CompileError;
use crate::compiler::OperationCache;
use crate::compiler::OperationCacheKey;
use crate::compiler::OperationCompiler;
use libgraphql_schema::Schema;
use libgraphql_schema::ast;
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

fn schema() -> Schema {
    Schema::builder()
        .load_str(None, "type Query { a: Int b: Int }")
        .unwrap()
        .build()
        .unwrap()
}

fn key(document: &str) -> OperationCacheKey {
    OperationCacheKey {
        directive_variables: vec![],
        document: Arc::from(document),
        operation_name: None,
        schema_id: 1,
    }
}

/// Looks `document` up, counting every compilation it triggers.
async fn lookup(cache: &OperationCache, compiles: &AtomicUsize, document: &str) {
    let _ = cache.get_or_compile(key(document), || {
        compiles.fetch_add(1, Ordering::SeqCst);
        Err(vec![])
    }).await;
}

#[tokio::test]
async fn second_lookup_is_a_hit() {
    let schema = schema();
    let document = ast::operation::parse("{ a }").unwrap();
    let variables = VariableValues::new();
    let cache = OperationCache::new(8);

    let first = cache.get_or_compile(key("{ a }"), || {
        OperationCompiler::compile(&schema, &document, None, &variables)
    }).await.unwrap();
    let second = cache.get_or_compile(key("{ a }"), || {
        panic!("should not recompile a cached operation")
    }).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.hits(), 1);
    assert_eq!(cache.misses(), 1);
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn failures_are_cached() {
    let cache = OperationCache::new(8);
    let compiles = AtomicUsize::new(0);

    for _ in 0..3 {
        let outcome = cache.get_or_compile(key("{ nope }"), || {
            compiles.fetch_add(1, Ordering::SeqCst);
            Err(vec![CompileError::NoOperations])
        }).await;
        assert_eq!(outcome.unwrap_err().as_slice(), &[CompileError::NoOperations]);
    }

    assert_eq!(compiles.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn directive_variables_distinguish_entries() {
    let cache = OperationCache::new(8);
    let compiles = AtomicUsize::new(0);

    for value in ["true", "false", "true"] {
        let mut key = key("query($v: Boolean!) { a @skip(if: $v) }");
        key.directive_variables = vec![("v".to_string(), value.to_string())];
        let _ = cache.get_or_compile(key, || {
            compiles.fetch_add(1, Ordering::SeqCst);
            Err(vec![])
        }).await;
    }

    assert_eq!(compiles.load(Ordering::SeqCst), 2);
    assert_eq!(cache.len(), 2);
}

#[tokio::test]
async fn least_recently_used_entry_is_evicted() {
    let cache = OperationCache::new(2);
    let compiles = AtomicUsize::new(0);

    lookup(&cache, &compiles, "{ a }").await;
    lookup(&cache, &compiles, "{ b }").await;
    lookup(&cache, &compiles, "{ a }").await;
    lookup(&cache, &compiles, "{ a b }").await;
    lookup(&cache, &compiles, "{ a }").await;
    assert_eq!(compiles.load(Ordering::SeqCst), 3);

    lookup(&cache, &compiles, "{ b }").await;
    assert_eq!(compiles.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn zero_capacity_never_caches() {
    let cache = OperationCache::new(0);
    let compiles = AtomicUsize::new(0);

    for _ in 0..3 {
        let _ = cache.get_or_compile(key("{ a }"), || {
            compiles.fetch_add(1, Ordering::SeqCst);
            Err(vec![])
        }).await;
    }

    assert_eq!(compiles.load(Ordering::SeqCst), 3);
    assert!(cache.is_empty());
}

#[test]
fn concurrent_lookups_compile_once_and_share_the_result() {
    let schema = schema();
    let document = ast::operation::parse("{ a b }").unwrap();
    let variables = VariableValues::new();
    let cache = OperationCache::new(16);
    let compiles = AtomicUsize::new(0);

    let results: Vec<_> = (0..64)
        .into_par_iter()
        .map(|_| {
            futures::executor::block_on(cache.get_or_compile(key("{ a b }"), || {
                compiles.fetch_add(1, Ordering::SeqCst);
                OperationCompiler::compile(&schema, &document, None, &variables)
            })).unwrap()
        })
        .collect();

    assert_eq!(compiles.load(Ordering::SeqCst), 1);
    assert!(results.iter().all(|op| Arc::ptr_eq(op, &results[0])));
    assert_eq!(cache.hits() + cache.misses(), 64);
}

/// Tests that requests waiting on an in-progress compilation yield their
/// worker thread instead of blocking it.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn waiting_lookups_do_not_block_workers() {
    let cache = Arc::new(OperationCache::new(8));
    let started = Instant::now();

    let compiling = tokio::spawn({
        let cache = cache.clone();
        async move {
            let _ = cache.get_or_compile(key("{ a }"), || {
                std::thread::sleep(Duration::from_millis(400));
                Err(vec![])
            }).await;
        }
    });
    tokio::time::sleep(Duration::from_millis(20)).await;

    let waiters = (0..2)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move {
                let _ = cache.get_or_compile(key("{ a }"), || Err(vec![])).await;
            })
        })
        .collect::<Vec<_>>();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let ticked_at = tokio::spawn(async { Instant::now() }).await.unwrap();
    assert!(ticked_at.duration_since(started) < Duration::from_millis(300));

    compiling.await.unwrap();
    for waiter in waiters {
        waiter.await.unwrap();
    }
    assert_eq!(cache.misses(), 1);
    assert_eq!(cache.hits(), 2);
}
