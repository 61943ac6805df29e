//! Composition of per-field resolution pipelines.
//!
//! A field's [`FieldDelegate`] runs, in order: argument coercion, pre-resolve
//! middleware (schema-wide first, then field-specific, each group in
//! declaration order), the resolver (or the default resolver), and then the
//! post-resolve middleware in the same order. Everything after argument
//! coercion runs inside an error boundary that turns panics into field
//! errors.

use crate::arguments::Arguments;
use crate::coercion::coerce_argument_values;
use crate::context::ResolverContext;
use crate::error::FieldError;
use crate::error::FieldResult;
use crate::error::codes;
use crate::executable_schema::ExecutableSchema;
use crate::middleware::FieldDelegate;
use crate::middleware::Middleware;
use crate::middleware::MiddlewareStage;
use crate::value::FieldValue;
use futures::FutureExt;
use futures::future::BoxFuture;
use libgraphql_schema::Schema;
use libgraphql_schema::types::TypeId;
use lru::LruCache;
use parking_lot::Mutex;
use std::any::Any;
use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

type PipelineKey = (u64, TypeId, String);

/// Composed field delegates, keyed by `(schema_id, object type, field
/// name)`.
///
/// Concurrent misses for the same key may each build a delegate, but only
/// the first one stored is ever handed out.
pub struct PipelineCache {
    entries: Option<Mutex<LruCache<PipelineKey, FieldDelegate>>>,
}
impl PipelineCache {
    /// A `capacity` of zero disables caching entirely.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity)
                .map(|capacity| Mutex::new(LruCache::new(capacity))),
        }
    }

    pub fn get_or_build(
        &self,
        schema: &ExecutableSchema,
        type_id: TypeId,
        field_name: &str,
    ) -> FieldDelegate {
        let Some(entries) = &self.entries else {
            return build_field_delegate(schema, type_id, field_name);
        };

        let key = (schema.schema_id(), type_id, field_name.to_string());
        if let Some(delegate) = entries.lock().get(&key) {
            return delegate.clone();
        }

        // Built outside of the lock.
        let built = build_field_delegate(schema, type_id, field_name);
        let mut entries = entries.lock();
        if let Some(existing) = entries.get(&key) {
            return existing.clone();
        }
        tracing::trace!(field_name, "caching field pipeline");
        entries.put(key, built.clone());
        built
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
}
impl std::fmt::Debug for PipelineCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineCache")
            .field("len", &self.len())
            .finish()
    }
}

/// Compose the delegate for `type_id.field_name` of `schema`.
pub fn build_field_delegate(
    schema: &ExecutableSchema,
    type_id: TypeId,
    field_name: &str,
) -> FieldDelegate {
    let resolver: FieldDelegate = match schema.resolver(type_id, field_name) {
        Some(resolver) => resolver.clone(),
        None => Arc::new(default_resolver),
    };

    let (pre_resolve, post_resolve): (Vec<Middleware>, Vec<Middleware>) = schema
        .middleware_for(type_id, field_name)
        .cloned()
        .partition(|middleware| middleware.stage() == MiddlewareStage::PreResolve);

    let mut delegate = with_post_resolve(resolver, post_resolve);
    for middleware in pre_resolve.iter().rev() {
        delegate = middleware.wrap(delegate);
    }

    with_argument_coercion(schema.schema().clone(), with_error_boundary(delegate))
}

/// Resolve a field by reading the property of the same name off of a JSON
/// parent object.
pub fn default_resolver(ctx: ResolverContext) -> BoxFuture<'static, FieldResult<FieldValue>> {
    let result = match untyped(ctx.parent()) {
        FieldValue::Json(serde_json::Value::Null) | FieldValue::Null => Ok(FieldValue::Null),

        FieldValue::Json(serde_json::Value::Object(props)) => Ok(
            props.get(ctx.field_name())
                .cloned()
                .map(FieldValue::Json)
                .unwrap_or(FieldValue::Null),
        ),

        FieldValue::Opaque(_) => Err(FieldError::new(format!(
            "No resolver is registered for `{}.{}` and its parent value is opaque",
            ctx.object_type_name(),
            ctx.field_name(),
        ))),

        other => Err(FieldError::new(format!(
            "Cannot read field `{}` from {}",
            ctx.field_name(),
            other.kind_name(),
        ))),
    };
    futures::future::ready(result).boxed()
}

fn untyped(value: &FieldValue) -> &FieldValue {
    match value {
        FieldValue::WithType { inner, .. } => untyped(inner),
        other => other,
    }
}

fn with_argument_coercion(schema: Arc<Schema>, next: FieldDelegate) -> FieldDelegate {
    Arc::new(move |mut ctx: ResolverContext| {
        let field = ctx.field.clone();
        let Some(field_def) = field.field() else {
            return next(ctx);
        };
        match coerce_argument_values(
            &schema,
            field_def.parameters(),
            field.arguments(),
            ctx.variables(),
        ) {
            Ok(values) => {
                ctx.arguments = Arc::new(Arguments::from_map(values));
                next(ctx)
            },
            Err(err) => futures::future::ready(Err(
                FieldError::new(err.to_string()).with_code(codes::ARGUMENT_COERCION_ERROR),
            )).boxed(),
        }
    })
}

/// Turn a panic, whether raised while creating the resolution future or
/// while polling it, into a field error.
fn with_error_boundary(inner: FieldDelegate) -> FieldDelegate {
    Arc::new(move |ctx: ResolverContext| {
        let field_name = ctx.field_name().to_string();
        let future = match std::panic::catch_unwind(AssertUnwindSafe(|| inner(ctx))) {
            Ok(future) => future,
            Err(payload) => {
                return futures::future::ready(Err(panic_error(&field_name, payload))).boxed();
            },
        };
        AssertUnwindSafe(future)
            .catch_unwind()
            .map(move |result| result.unwrap_or_else(|payload| {
                Err(panic_error(&field_name, payload))
            }))
            .boxed()
    })
}

fn with_post_resolve(inner: FieldDelegate, post_resolve: Vec<Middleware>) -> FieldDelegate {
    if post_resolve.is_empty() {
        return inner;
    }
    let post_resolve = Arc::new(post_resolve);
    Arc::new(move |ctx: ResolverContext| {
        let inner = inner.clone();
        let post_resolve = post_resolve.clone();
        async move {
            let mut value = inner(ctx.clone()).await?;
            for middleware in post_resolve.iter() {
                value = middleware.after_resolve(&ctx, value)?;
            }
            Ok::<_, FieldError>(value)
        }.boxed()
    })
}

fn panic_error(field_name: &str, payload: Box<dyn Any + Send>) -> FieldError {
    let detail = payload.downcast_ref::<&str>()
        .map(|msg| msg.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    tracing::error!(field_name, detail = detail.as_str(), "resolver panicked");
    FieldError::new(format!("Resolver for `{field_name}` panicked: {detail}"))
        .with_code(codes::RESOLVER_PANIC)
}
