use crate::arguments::Arguments;
use crate::compiler::CompiledField;
use crate::compiler::CompiledSelectionSet;
use crate::compiler::ExecutionStrategy;
use crate::compiler::FieldKind;
use crate::context::ExecutionContext;
use crate::context::ExecutionScope;
use crate::context::PendingIncremental;
use crate::context::ResolverContext;
use crate::error::ExecutionError;
use crate::error::FieldError;
use crate::error::FieldResult;
use crate::error::codes;
use crate::executable_schema::ExecutableSchema;
use crate::path::PathSegment;
use crate::path::ResponsePath;
use crate::response::ExecutionResult;
use crate::response::ResultBuilder;
use crate::value::FieldValue;
use futures::FutureExt;
use futures::StreamExt;
use futures::future::BoxFuture;
use futures::stream;
use futures::stream::BoxStream;
use futures::stream::SelectAll;
use libgraphql_schema::types::GraphQLType;
use libgraphql_schema::types::TypeAnnotation;
use libgraphql_schema::types::TypeId;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::task::AbortOnDropHandle;

/// A null reached a non-null position and must be pushed up to the nearest
/// nullable ancestor. The error explaining why has already been reported.
#[derive(Debug)]
pub(crate) struct Propagate;

type Completed = Result<Value, Propagate>;
type ObjectResult = Result<serde_json::Map<String, Value>, Propagate>;

/// Execute the query or mutation held by `ctx`, producing the initial
/// payload along with any `@defer`/`@stream` work it scheduled.
pub(crate) async fn execute_operation(
    ctx: Arc<ExecutionContext>,
) -> (ExecutionResult, Vec<PendingIncremental>) {
    let scope = ExecutionScope::new(ctx.clone());
    let data = match execute_selection_set(
        scope.clone(),
        ctx.operation.selection_set().clone(),
        ctx.operation.root_type(),
        ctx.root_value.clone(),
        ResponsePath::root(),
    ).await {
        Ok(data) => Value::Object(data),
        Err(Propagate) => Value::Null,
    };

    if ctx.is_cancelled() {
        return (ResultBuilder::request_error(&ExecutionError::RequestCancelled), vec![]);
    }

    let pending =
        if data.is_null() {
            vec![]
        } else {
            scope.incremental.take_live()
        };

    let result = ResultBuilder::new()
        .data(data)
        .errors(scope.errors.take())
        .extensions(ctx.take_extensions())
        .finalize();
    (result, pending)
}

pub(crate) fn execute_selection_set(
    scope: ExecutionScope,
    selection_set: Arc<CompiledSelectionSet>,
    object_type: TypeId,
    parent: Arc<FieldValue>,
    path: ResponsePath,
) -> BoxFuture<'static, ObjectResult> {
    async move {
        let Some(selections) = selection_set.for_type(object_type) else {
            return Ok(serde_json::Map::new());
        };

        for deferred in selections.deferred() {
            scope.incremental.register(PendingIncremental::Defer {
                label: deferred.label().map(|label| label.to_string()),
                object_type,
                parent: parent.clone(),
                path: path.clone(),
                selections: deferred.selections().clone(),
            });
        }

        let fields = selections.fields().to_vec();
        let pending: Vec<BoxFuture<'static, Completed>> = fields.iter()
            .map(|field| execute_field(
                scope.clone(),
                field.clone(),
                object_type,
                parent.clone(),
                path.clone(),
            ))
            .collect();

        let completed: Vec<Completed> = match selection_set.strategy() {
            ExecutionStrategy::Parallel => stream::iter(pending)
                .buffered(scope.ctx.fan_out_limit())
                .collect()
                .await,

            ExecutionStrategy::Serial => {
                let mut completed = Vec::with_capacity(pending.len());
                for field in pending {
                    let result = field.await;
                    let propagating = result.is_err();
                    completed.push(result);
                    if propagating {
                        break;
                    }
                }
                completed
            },
        };

        let mut data = serde_json::Map::with_capacity(fields.len());
        for (field, value) in fields.iter().zip(completed) {
            data.insert(field.response_name().to_string(), value?);
        }
        Ok(data)
    }.boxed()
}

fn execute_field(
    scope: ExecutionScope,
    field: Arc<CompiledField>,
    object_type: TypeId,
    parent: Arc<FieldValue>,
    parent_path: ResponsePath,
) -> BoxFuture<'static, Completed> {
    async move {
        let path = parent_path.child_key(field.response_name(), field.position());
        if field.kind() == FieldKind::Typename {
            let type_name = scope.ctx.schema.schema().get(object_type).name();
            return Ok(Value::from(type_name));
        }

        let resolved = resolve_field(&scope, &field, object_type, parent, &path).await;
        match resolved {
            Ok(value) => complete_value(
                scope,
                field.clone(),
                field.type_annotation().clone(),
                path,
                value,
            ).await,

            Err(err) => {
                report(&scope, &field, &path, err);
                null_or_propagate(&scope, field.type_annotation(), path)
            },
        }
    }.boxed()
}

/// Run the field's composed pipeline. Holds a resolver permit only for the
/// duration of the resolver call itself.
async fn resolve_field(
    scope: &ExecutionScope,
    field: &Arc<CompiledField>,
    object_type: TypeId,
    parent: Arc<FieldValue>,
    path: &ResponsePath,
) -> FieldResult<FieldValue> {
    let ctx = &scope.ctx;
    if ctx.is_cancelled() {
        return Err(cancelled_error());
    }

    let delegate = ctx.pipelines.get_or_build(&ctx.schema, object_type, field.field_name());
    let resolver_ctx = ResolverContext {
        arguments: Arc::new(Arguments::default()),
        exec: ctx.clone(),
        field: field.clone(),
        object_type,
        parent,
        path: path.clone(),
    };

    let _permit = ctx.resolver_permits
        .clone()
        .acquire_owned()
        .await
        .map_err(|_| cancelled_error())?;
    tracing::trace!(path = %path, "resolving field");

    if ctx.config.spawn_resolvers {
        // Aborted if the request is dropped while the resolver is running.
        match AbortOnDropHandle::new(tokio::spawn(delegate(resolver_ctx))).await {
            Ok(result) => result,
            Err(err) => Err(FieldError::new(format!(
                "Resolver task for `{}` failed: {err}",
                field.field_name(),
            )).with_code(codes::RESOLVER_PANIC)),
        }
    } else {
        delegate(resolver_ctx).await
    }
}

fn complete_value(
    scope: ExecutionScope,
    field: Arc<CompiledField>,
    annotation: TypeAnnotation,
    path: ResponsePath,
    value: FieldValue,
) -> BoxFuture<'static, Completed> {
    async move {
        if value.is_null() {
            if annotation.nullable() {
                return Ok(Value::Null);
            }
            let parent_type = scope.ctx.schema.schema().get(field.parent_type()).name();
            let err = FieldError::new(format!(
                "Cannot return null for non-nullable field `{parent_type}.{}`",
                field.field_name(),
            )).with_code(codes::NON_NULL_VIOLATION);
            report(&scope, &field, &path, err);
            return Err(Propagate);
        }

        let completed = match &annotation {
            TypeAnnotation::List(list_annot) => complete_list(
                scope.clone(),
                field,
                list_annot.inner_type_annotation().clone(),
                path.clone(),
                value,
            ).await,

            TypeAnnotation::Named(named_annot) => complete_named(
                scope.clone(),
                field,
                named_annot.type_id(),
                path.clone(),
                value,
            ).await,
        };

        match completed {
            Ok(value) => Ok(value),
            Err(Propagate) => null_or_propagate(&scope, &annotation, path),
        }
    }.boxed()
}

async fn complete_list(
    scope: ExecutionScope,
    field: Arc<CompiledField>,
    item_annotation: TypeAnnotation,
    path: ResponsePath,
    value: FieldValue,
) -> Completed {
    // `@stream` only applies to the field's outermost list.
    let stream_directive = field.stream()
        .filter(|_| matches!(path.last(), Some(PathSegment::Key { .. })))
        .cloned();

    let (initial, rest) = match value.into_untyped() {
        FieldValue::List(mut items) => match &stream_directive {
            Some(directive) => {
                let rest = items.split_off(directive.initial_count().min(items.len()));
                let rest = (!rest.is_empty())
                    .then(|| stream::iter(rest.into_iter().map(Ok)).boxed());
                (items, rest)
            },
            None => (items, None),
        },

        FieldValue::Json(Value::Array(items)) => {
            let mut items: Vec<FieldValue> = items.into_iter().map(FieldValue::Json).collect();
            match &stream_directive {
                Some(directive) => {
                    let rest = items.split_off(directive.initial_count().min(items.len()));
                    let rest = (!rest.is_empty())
                        .then(|| stream::iter(rest.into_iter().map(Ok)).boxed());
                    (items, rest)
                },
                None => (items, None),
            }
        },

        FieldValue::Stream(events) => {
            let mut events = events.into_inner();
            let limit = stream_directive.as_ref().map(|directive| directive.initial_count());
            let mut initial = vec![];
            let mut exhausted = false;
            while limit.is_none_or(|limit| initial.len() < limit) {
                match events.next().await {
                    Some(Ok(item)) => initial.push(item),
                    Some(Err(err)) => {
                        report(&scope, &field, &path, err);
                        return Err(Propagate);
                    },
                    None => {
                        exhausted = true;
                        break;
                    },
                }
            }
            (initial, (!exhausted).then_some(events))
        },

        other => {
            let err = FieldError::new(format!(
                "Expected a list for field `{}` but the resolver returned {}",
                field.field_name(),
                other.kind_name(),
            ));
            report(&scope, &field, &path, err);
            return Err(Propagate);
        },
    };

    if let (Some(source), Some(directive)) = (rest, &stream_directive) {
        scope.incremental.register(PendingIncremental::Stream {
            field: field.clone(),
            item_annotation: item_annotation.clone(),
            label: directive.label().map(|label| label.to_string()),
            path: path.clone(),
            source,
            start_index: initial.len(),
        });
    }

    let completed: Vec<Completed> = stream::iter(initial.into_iter().enumerate())
        .map(|(index, item)| complete_value(
            scope.clone(),
            field.clone(),
            item_annotation.clone(),
            path.child_index(index),
            item,
        ))
        .buffered(scope.ctx.fan_out_limit())
        .collect()
        .await;

    completed.into_iter()
        .collect::<Result<Vec<Value>, Propagate>>()
        .map(Value::Array)
}

async fn complete_named(
    scope: ExecutionScope,
    field: Arc<CompiledField>,
    type_id: TypeId,
    path: ResponsePath,
    value: FieldValue,
) -> Completed {
    let exec_schema = scope.ctx.schema.clone();
    let named_type = exec_schema.schema().get(type_id);

    if named_type.is_leaf() {
        return coerce_leaf(&exec_schema, type_id, value).map_err(|message| {
            let err = FieldError::new(message).with_code(codes::LEAF_COERCION_ERROR);
            report(&scope, &field, &path, err);
            Propagate
        });
    }

    let object_type =
        if named_type.is_abstract() {
            match resolve_abstract_type(&exec_schema, type_id, &value) {
                Ok(object_type) => object_type,
                Err(message) => {
                    let err = FieldError::new(message)
                        .with_code(codes::ABSTRACT_TYPE_RESOLUTION_ERROR);
                    report(&scope, &field, &path, err);
                    return Err(Propagate);
                },
            }
        } else {
            type_id
        };

    let Some(selection_set) = field.selection_set().cloned() else {
        let err = FieldError::new(format!(
            "Field `{}` has a composite type but no selection set",
            field.field_name(),
        ));
        report(&scope, &field, &path, err);
        return Err(Propagate);
    };

    execute_selection_set(scope, selection_set, object_type, Arc::new(value), path)
        .await
        .map(Value::Object)
}

/// Serialize a resolved value for a scalar or enum type.
fn coerce_leaf(
    exec_schema: &ExecutableSchema,
    type_id: TypeId,
    value: FieldValue,
) -> Result<Value, String> {
    let leaf_type = exec_schema.schema().get(type_id);
    let type_name = leaf_type.name();
    let value = match value.into_untyped() {
        FieldValue::Json(value) => value,
        other => return Err(format!(
            "Expected a `{type_name}` value but the resolver returned {}",
            other.kind_name(),
        )),
    };
    let invalid = || format!("`{type_name}` cannot represent value: {value}");

    match leaf_type {
        GraphQLType::Bool => value.as_bool().map(Value::from).ok_or_else(invalid),

        GraphQLType::Enum(enum_type) => value.as_str()
            .filter(|name| enum_type.has_value(name))
            .map(Value::from)
            .ok_or_else(invalid),

        GraphQLType::Float => value.as_f64().map(Value::from).ok_or_else(invalid),

        GraphQLType::ID => match &value {
            Value::String(_) => Ok(value.clone()),
            Value::Number(num) if num.is_i64() || num.is_u64() => Ok(Value::from(num.to_string())),
            _ => Err(invalid()),
        },

        GraphQLType::Int => int_value(&value).map(Value::from).ok_or_else(invalid),

        GraphQLType::Scalar(_) => match exec_schema.scalar_serializer(type_id) {
            Some(serialize) => serialize(&value)
                .map_err(|err| format!("`{type_name}` cannot represent value: {err}")),
            None => Ok(value.clone()),
        },

        GraphQLType::String => match &value {
            Value::Bool(b) => Ok(Value::from(b.to_string())),
            Value::Number(num) => Ok(Value::from(num.to_string())),
            Value::String(_) => Ok(value.clone()),
            _ => Err(invalid()),
        },

        GraphQLType::InputObject(_)
            | GraphQLType::Interface(_)
            | GraphQLType::Object(_)
            | GraphQLType::Union(_) => Err(format!("`{type_name}` is not a leaf type")),
    }
}

fn int_value(value: &Value) -> Option<i32> {
    value.as_i64()
        .and_then(|num| i32::try_from(num).ok())
        .or_else(|| value.as_f64()
            .filter(|num| num.fract() == 0.0)
            .filter(|num| *num >= f64::from(i32::MIN) && *num <= f64::from(i32::MAX))
            .map(|num| num as i32))
}

/// Determine the concrete object type of a value whose declared type is an
/// interface or union: an explicit [`FieldValue::WithType`] wins, then the
/// abstract type's registered type resolver, then a `__typename` property.
fn resolve_abstract_type(
    exec_schema: &ExecutableSchema,
    abstract_type: TypeId,
    value: &FieldValue,
) -> Result<TypeId, String> {
    let schema = exec_schema.schema();
    let abstract_name = schema.get(abstract_type).name();

    let type_name = match value {
        FieldValue::WithType { type_name, .. } => Some(type_name.clone()),
        _ => None,
    }
    .or_else(|| exec_schema.type_resolver(abstract_type).and_then(|resolve| resolve(value)))
    .or_else(|| value.as_json()
        .and_then(|json| json.get("__typename"))
        .and_then(|name| name.as_str())
        .map(|name| name.to_string()));

    let Some(type_name) = type_name else {
        return Err(format!(
            "Could not determine the concrete type of `{abstract_name}` for the resolved value",
        ));
    };

    match schema.type_id(&type_name) {
        Some(object_type) if schema.is_possible_type(abstract_type, object_type) => Ok(object_type),
        _ => Err(format!("`{type_name}` is not a possible type of `{abstract_name}`")),
    }
}

fn cancelled_error() -> FieldError {
    FieldError::new("Request was cancelled").with_code(codes::REQUEST_CANCELLED)
}

fn null_or_propagate(
    scope: &ExecutionScope,
    annotation: &TypeAnnotation,
    path: ResponsePath,
) -> Completed {
    if annotation.nullable() {
        scope.incremental.record_null(path);
        Ok(Value::Null)
    } else {
        Err(Propagate)
    }
}

fn report(scope: &ExecutionScope, field: &CompiledField, path: &ResponsePath, err: FieldError) {
    scope.errors.report_error(err.into_graphql_error(path.clone(), Some(field.location())));
}

/// Output of one incremental task: at most one payload, any work that
/// payload scheduled, and whether the task has more to send.
struct TaskEvent {
    finished: bool,
    payload: Option<ExecutionResult>,
    spawned: Vec<PendingIncremental>,
}

fn task_stream(ctx: Arc<ExecutionContext>, task: PendingIncremental) -> BoxStream<'static, TaskEvent> {
    match task {
        PendingIncremental::Defer { label, object_type, parent, path, selections } =>
            stream::once(async move {
                let scope = ExecutionScope::new(ctx);
                let data = match execute_selection_set(
                    scope.clone(),
                    selections,
                    object_type,
                    parent,
                    path.clone(),
                ).await {
                    Ok(data) => Value::Object(data),
                    Err(Propagate) => Value::Null,
                };
                TaskEvent {
                    finished: true,
                    payload: Some(ResultBuilder::new()
                        .data(data)
                        .path(path)
                        .label(label)
                        .errors(scope.errors.take())
                        .finalize()),
                    spawned: scope.incremental.take_live(),
                }
            }).boxed(),

        PendingIncremental::Stream { field, item_annotation, label, path, source, start_index } => {
            let state = Some((source, start_index));
            stream::unfold(state, move |state| {
                let ctx = ctx.clone();
                let field = field.clone();
                let item_annotation = item_annotation.clone();
                let label = label.clone();
                let path = path.clone();
                async move {
                    let (mut source, index) = state?;
                    let Some(item) = source.next().await else {
                        let event = TaskEvent {
                            finished: true,
                            payload: None,
                            spawned: vec![],
                        };
                        return Some((event, None));
                    };

                    let scope = ExecutionScope::new(ctx);
                    let item_path = path.child_index(index);
                    let completed = match item {
                        Ok(value) => complete_value(
                            scope.clone(),
                            field.clone(),
                            item_annotation.clone(),
                            item_path.clone(),
                            value,
                        ).await,
                        Err(err) => {
                            report(&scope, &field, &item_path, err);
                            null_or_propagate(&scope, &item_annotation, item_path.clone())
                        },
                    };
                    let items = match completed {
                        Ok(value) => Value::Array(vec![value]),
                        Err(Propagate) => Value::Null,
                    };

                    let event = TaskEvent {
                        finished: false,
                        payload: Some(ResultBuilder::new()
                            .items(items)
                            .path(item_path)
                            .label(label)
                            .errors(scope.errors.take())
                            .finalize()),
                        spawned: scope.incremental.take_live(),
                    };
                    Some((event, Some((source, index + 1))))
                }
            }).boxed()
        },
    }
}

/// Drives every outstanding incremental task, emitting payloads in
/// completion order.
struct IncrementalDriver {
    ctx: Arc<ExecutionContext>,
    running: usize,
    tasks: SelectAll<BoxStream<'static, TaskEvent>>,
}
impl IncrementalDriver {
    fn spawn_all(&mut self, pending: Vec<PendingIncremental>) {
        for task in pending {
            self.running += 1;
            self.tasks.push(task_stream(self.ctx.clone(), task));
        }
    }

    async fn next_payload(&mut self) -> Option<ExecutionResult> {
        while self.running > 0 {
            let event = tokio::select! {
                biased;
                _ = self.ctx.cancellation.cancelled() => None,
                event = self.tasks.next() => Some(event),
            };

            let Some(event) = event else {
                tracing::debug!("incremental delivery cancelled");
                self.running = 0;
                self.tasks = SelectAll::new();
                return Some(ResultBuilder::new()
                    .errors(ExecutionError::RequestCancelled.to_graphql_errors())
                    .has_next(false)
                    .finalize());
            };
            let Some(event) = event else {
                self.running = 0;
                return Some(ResultBuilder::new().has_next(false).finalize());
            };

            if event.finished {
                self.running -= 1;
            }
            self.spawn_all(event.spawned);

            match event.payload {
                Some(mut payload) => {
                    payload.has_next = Some(self.running > 0);
                    return Some(payload);
                },
                None if self.running == 0 =>
                    return Some(ResultBuilder::new().has_next(false).finalize()),
                None => (),
            }
        }
        None
    }
}

/// The initial payload followed by one payload per deferred fragment or
/// streamed item. The last payload has `hasNext: false`.
pub(crate) fn incremental_stream(
    ctx: Arc<ExecutionContext>,
    mut initial: ExecutionResult,
    pending: Vec<PendingIncremental>,
) -> BoxStream<'static, ExecutionResult> {
    let mut driver = IncrementalDriver {
        ctx,
        running: 0,
        tasks: SelectAll::new(),
    };
    driver.spawn_all(pending);
    initial.has_next = Some(driver.running > 0);

    stream::once(futures::future::ready(initial))
        .chain(stream::unfold(driver, |mut driver| async move {
            driver.next_payload()
                .await
                .map(|payload| (payload, driver))
        }))
        .boxed()
}

/// Resolve the subscription's root field into its source stream and map
/// each event through the field's selection set.
pub(crate) async fn subscribe(
    ctx: Arc<ExecutionContext>,
) -> Result<BoxStream<'static, ExecutionResult>, ExecutionResult> {
    let root_type = ctx.operation.root_type();
    let Some(field) = ctx.operation
        .selection_set()
        .for_type(root_type)
        .and_then(|selections| selections.fields().first())
        .cloned() else {
        return Err(ResultBuilder::new()
            .data(Value::Object(serde_json::Map::new()))
            .finalize());
    };

    let not_a_stream = || ResultBuilder::request_error(&ExecutionError::NotASubscriptionStream {
        field_name: field.field_name().to_string(),
    });
    if field.kind() == FieldKind::Typename {
        return Err(not_a_stream());
    }

    let path = ResponsePath::root().child_key(field.response_name(), field.position());
    let scope = ExecutionScope::new(ctx.clone());
    let resolved = resolve_field(&scope, &field, root_type, ctx.root_value.clone(), &path).await;
    let source = match resolved {
        Ok(FieldValue::Stream(events)) => events.into_inner(),
        Ok(_) => return Err(not_a_stream()),
        Err(err) => {
            report(&scope, &field, &path, err);
            return Err(ResultBuilder::new()
                .data(Value::Null)
                .errors(scope.errors.take())
                .finalize());
        },
    };

    let cancellation = ctx.cancellation.clone();
    Ok(source
        .take_until(cancellation.cancelled_owned())
        .then(move |event| execute_subscription_event(
            ctx.clone(),
            field.clone(),
            path.clone(),
            event,
        ))
        .boxed())
}

fn execute_subscription_event(
    ctx: Arc<ExecutionContext>,
    field: Arc<CompiledField>,
    path: ResponsePath,
    event: FieldResult<FieldValue>,
) -> BoxFuture<'static, ExecutionResult> {
    async move {
        let scope = ExecutionScope::new(ctx.clone());
        let completed = match event {
            Ok(value) => complete_value(
                scope.clone(),
                field.clone(),
                field.type_annotation().clone(),
                path,
                value,
            ).await,
            Err(err) => {
                report(&scope, &field, &path, err);
                null_or_propagate(&scope, field.type_annotation(), path)
            },
        };

        let data = match completed {
            Ok(value) => {
                let mut data = serde_json::Map::new();
                data.insert(field.response_name().to_string(), value);
                Value::Object(data)
            },
            Err(Propagate) => Value::Null,
        };

        ResultBuilder::new()
            .data(data)
            .errors(scope.errors.take())
            .extensions(ctx.take_extensions())
            .finalize()
    }.boxed()
}
