//! Field middleware descriptors.
//!
//! Middleware is attached to an [`ExecutableSchema`](crate::ExecutableSchema)
//! either schema-wide or for a single field, and is composed into each
//! field's [`FieldDelegate`] the first time that field is resolved.

use crate::context::ResolverContext;
use crate::error::FieldResult;
use crate::value::FieldValue;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;

/// A fully composed (or partially composed) field resolution step.
pub type FieldDelegate =
    Arc<dyn Fn(ResolverContext) -> BoxFuture<'static, FieldResult<FieldValue>> + Send + Sync>;

type AroundFn =
    Arc<dyn Fn(ResolverContext, FieldDelegate) -> BoxFuture<'static, FieldResult<FieldValue>> + Send + Sync>;
type PostResolveFn =
    Arc<dyn Fn(&ResolverContext, FieldValue) -> FieldResult<FieldValue> + Send + Sync>;
type PreResolveFn = Arc<dyn Fn(&ResolverContext) -> FieldResult<()> + Send + Sync>;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MiddlewareStage {
    /// Runs after the resolver returned successfully and may replace (or
    /// reject) the resolved value.
    PostResolve,

    /// Runs after argument coercion and before the resolver. May
    /// short-circuit resolution with an error.
    PreResolve,
}

#[derive(Clone)]
enum MiddlewareFn {
    Around(AroundFn),
    PostResolve(PostResolveFn),
    PreResolve(PreResolveFn),
}

/// A named hook in a field's resolution pipeline.
#[derive(Clone)]
pub struct Middleware {
    func: MiddlewareFn,
    name: String,
}
impl Middleware {
    /// Wrap everything downstream of this middleware. `next` runs the rest
    /// of the pipeline (later pre-resolve middleware, the resolver, and all
    /// post-resolve middleware). Scheduled in the pre-resolve stage.
    pub fn around<F, Fut>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(ResolverContext, FieldDelegate) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FieldResult<FieldValue>> + Send + 'static,
    {
        Self {
            func: MiddlewareFn::Around(Arc::new(move |ctx, next| func(ctx, next).boxed())),
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn post_resolve<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&ResolverContext, FieldValue) -> FieldResult<FieldValue> + Send + Sync + 'static,
    {
        Self {
            func: MiddlewareFn::PostResolve(Arc::new(func)),
            name: name.into(),
        }
    }

    pub fn pre_resolve<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&ResolverContext) -> FieldResult<()> + Send + Sync + 'static,
    {
        Self {
            func: MiddlewareFn::PreResolve(Arc::new(func)),
            name: name.into(),
        }
    }

    pub fn stage(&self) -> MiddlewareStage {
        match &self.func {
            MiddlewareFn::Around(_) | MiddlewareFn::PreResolve(_) => MiddlewareStage::PreResolve,
            MiddlewareFn::PostResolve(_) => MiddlewareStage::PostResolve,
        }
    }

    /// Apply a post-resolve hook to `value`. Other stages pass it through.
    pub(crate) fn after_resolve(
        &self,
        ctx: &ResolverContext,
        value: FieldValue,
    ) -> FieldResult<FieldValue> {
        match &self.func {
            MiddlewareFn::PostResolve(func) => func(ctx, value),
            MiddlewareFn::Around(_) | MiddlewareFn::PreResolve(_) => Ok(value),
        }
    }

    /// Put this (pre-resolve stage) middleware in front of `next`.
    pub(crate) fn wrap(&self, next: FieldDelegate) -> FieldDelegate {
        match &self.func {
            MiddlewareFn::Around(func) => {
                let func = func.clone();
                Arc::new(move |ctx| func(ctx, next.clone()))
            },

            MiddlewareFn::PostResolve(_) => next,

            MiddlewareFn::PreResolve(func) => {
                let func = func.clone();
                Arc::new(move |ctx| match func(&ctx) {
                    Ok(()) => next(ctx),
                    Err(err) => futures::future::ready(Err(err)).boxed(),
                })
            },
        }
    }
}
impl std::fmt::Debug for Middleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Middleware")
            .field("name", &self.name)
            .field("stage", &self.stage())
            .finish()
    }
}
