use crate::commands::execute::write_payloads;
use futures::StreamExt;
use libgraphql::Schema;
use libgraphql::execution::ExecutableSchema;
use libgraphql::execution::Executor;
use libgraphql::execution::ExecutorConfig;
use libgraphql::execution::Request;
use libgraphql::execution::Response;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

/// A writer that remembers what was written and how often it was flushed.
#[derive(Clone, Default)]
struct RecordingWriter {
    bytes: Arc<Mutex<Vec<u8>>>,
    flushes: Arc<AtomicUsize>,
}
impl Write for RecordingWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.bytes.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

async fn streamed_items() -> Response {
    let schema = Schema::builder()
        .load_str(None, "type Query { items: [Int!]! }")
        .unwrap()
        .build()
        .unwrap();
    let schema = ExecutableSchema::builder(Arc::new(schema)).build().unwrap();
    let request = Request::parse(Arc::new(schema), "{ items @stream(initialCount: 1) }")
        .unwrap()
        .root_value(json!({ "items": [1, 2, 3] }));
    Executor::new(ExecutorConfig::default()).execute(request).await
}

/// Tests that every incremental payload is written and flushed before the
/// next one is pulled from the response stream.
#[tokio::test(flavor = "multi_thread")]
async fn payloads_are_written_as_they_arrive() {
    let Response::Stream(payloads) = streamed_items().await else {
        panic!("expected an incremental response");
    };
    let writer = RecordingWriter::default();
    let flushes = writer.flushes.clone();
    let flushed_before_each = Arc::new(Mutex::new(vec![]));
    let observed = flushed_before_each.clone();
    let payloads = payloads.map(move |payload| {
        observed.lock().unwrap().push(flushes.load(Ordering::SeqCst));
        payload
    });

    let count = write_payloads(payloads, &mut writer.clone()).await.unwrap();

    assert_eq!(count, 4);
    assert_eq!(*flushed_before_each.lock().unwrap(), vec![0, 1, 2, 3]);

    let output = String::from_utf8(writer.bytes.lock().unwrap().clone()).unwrap();
    let values = serde_json::Deserializer::from_str(&output)
        .into_iter::<serde_json::Value>()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(values, vec![
        json!({ "data": { "items": [1] }, "hasNext": true }),
        json!({ "items": [2], "path": ["items", 1], "hasNext": true }),
        json!({ "items": [3], "path": ["items", 2], "hasNext": true }),
        json!({ "hasNext": false }),
    ]);
}
