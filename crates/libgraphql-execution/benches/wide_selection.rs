use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;
use libgraphql_execution::ExecutableSchema;
use libgraphql_execution::Executor;
use libgraphql_execution::ExecutorConfig;
use libgraphql_execution::FieldValue;
use libgraphql_execution::Request;
use libgraphql_schema::Schema;
use libgraphql_schema::ast;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

const FIELD_COUNT: usize = 200;
const ITEM_COUNT: usize = 100;

fn executable_schema() -> Arc<ExecutableSchema> {
    let fields = (0..FIELD_COUNT)
        .map(|idx| format!("f{idx}: Int"))
        .collect::<Vec<_>>()
        .join(" ");
    let sdl = format!(
        "type Item {{ id: ID! name: String }}\ntype Query {{ {fields} items: [Item!]! }}",
    );
    let schema = Schema::builder()
        .load_str(None, &sdl)
        .unwrap()
        .build()
        .unwrap();

    let mut builder = ExecutableSchema::builder(Arc::new(schema))
        .sync_resolver("Query", "items", |_| Ok(FieldValue::list(
            (0..ITEM_COUNT).map(|idx| json!({ "id": idx, "name": format!("item {idx}") })),
        )));
    for idx in 0..FIELD_COUNT {
        builder = builder.sync_resolver("Query", &format!("f{idx}"), move |_| {
            Ok(FieldValue::from(idx as i64))
        });
    }
    Arc::new(builder.build().unwrap())
}

fn query() -> Arc<ast::operation::Document> {
    let fields = (0..FIELD_COUNT)
        .map(|idx| format!("f{idx}"))
        .collect::<Vec<_>>()
        .join(" ");
    let query = format!("{{ {fields} items {{ id name }} }}");
    Arc::new(ast::operation::parse(&query).unwrap())
}

fn bench_wide_selection(c: &mut Criterion) {
    let runtime = Runtime::new().unwrap();
    let schema = executable_schema();
    let document = query();

    let mut group = c.benchmark_group("wide_selection");
    group.warm_up_time(Duration::from_millis(200));
    group.measurement_time(Duration::from_secs(5));

    let configs = [
        ("cached_spawned", ExecutorConfig::default()),
        ("cached_inline", ExecutorConfig {
            spawn_resolvers: false,
            ..ExecutorConfig::default()
        }),
        ("uncached_inline", ExecutorConfig {
            operation_cache_capacity: 0,
            pipeline_cache_capacity: 0,
            spawn_resolvers: false,
            ..ExecutorConfig::default()
        }),
    ];

    for (name, config) in configs {
        let executor = Executor::new(config);
        group.bench_with_input(
            BenchmarkId::new("execute", name),
            &(&runtime, &executor),
            |b, (runtime, executor)| {
                b.to_async(*runtime).iter(|| async {
                    let request = Request::new(schema.clone(), document.clone());
                    executor.execute(request).await
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_wide_selection);
criterion_main!(benches);
