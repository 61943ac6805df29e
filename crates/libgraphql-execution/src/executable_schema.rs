use crate::context::ResolverContext;
use crate::error::FieldResult;
use crate::middleware::FieldDelegate;
use crate::middleware::Middleware;
use crate::value::FieldValue;
use futures::FutureExt;
use libgraphql_schema::Schema;
use libgraphql_schema::types::GraphQLType;
use libgraphql_schema::types::TypeId;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use thiserror::Error;

type Result<T> = std::result::Result<T, ExecutableSchemaBuildError>;

/// Picks the concrete object type (by name) of a value whose declared type
/// is an interface or union.
pub type TypeResolver = Arc<dyn Fn(&FieldValue) -> Option<String> + Send + Sync>;

/// Converts a resolved custom scalar value into its serialized form.
pub type ScalarSerializer =
    Arc<dyn Fn(&serde_json::Value) -> std::result::Result<serde_json::Value, String> + Send + Sync>;

static NEXT_SCHEMA_ID: AtomicU64 = AtomicU64::new(1);

/// A [`Schema`] bound to the resolvers, type resolvers, middleware, and
/// scalar serializers used to execute operations against it.
pub struct ExecutableSchema {
    field_middleware: HashMap<(TypeId, String), Vec<Middleware>>,
    middleware: Vec<Middleware>,
    resolvers: HashMap<(TypeId, String), FieldDelegate>,
    scalar_serializers: HashMap<TypeId, ScalarSerializer>,
    schema: Arc<Schema>,
    schema_id: u64,
    type_resolvers: HashMap<TypeId, TypeResolver>,
}
impl ExecutableSchema {
    pub fn builder(schema: Arc<Schema>) -> ExecutableSchemaBuilder {
        ExecutableSchemaBuilder::new(schema)
    }

    /// Schema-wide middleware followed by the middleware registered for
    /// `type_id.field_name`, in declaration order.
    pub fn middleware_for(
        &self,
        type_id: TypeId,
        field_name: &str,
    ) -> impl Iterator<Item = &Middleware> {
        let field_specific = self.field_middleware
            .get(&(type_id, field_name.to_string()))
            .map(|middleware| middleware.as_slice())
            .unwrap_or(&[]);
        self.middleware.iter().chain(field_specific.iter())
    }

    pub fn resolver(&self, type_id: TypeId, field_name: &str) -> Option<&FieldDelegate> {
        self.resolvers.get(&(type_id, field_name.to_string()))
    }

    pub fn scalar_serializer(&self, type_id: TypeId) -> Option<&ScalarSerializer> {
        self.scalar_serializers.get(&type_id)
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Process-unique identifier of this executable schema. Used to key the
    /// operation and pipeline caches.
    pub fn schema_id(&self) -> u64 {
        self.schema_id
    }

    pub fn type_resolver(&self, type_id: TypeId) -> Option<&TypeResolver> {
        self.type_resolvers.get(&type_id)
    }
}
impl std::fmt::Debug for ExecutableSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutableSchema")
            .field("middleware", &self.middleware)
            .field("resolvers", &self.resolvers.len())
            .field("schema_id", &self.schema_id)
            .field("type_resolvers", &self.type_resolvers.len())
            .finish()
    }
}

/// Collects resolvers and hooks by type and field *name*; names are
/// checked against the schema by [`ExecutableSchemaBuilder::build()`].
pub struct ExecutableSchemaBuilder {
    field_middleware: Vec<(String, String, Middleware)>,
    middleware: Vec<Middleware>,
    resolvers: Vec<(String, String, FieldDelegate)>,
    scalar_serializers: Vec<(String, ScalarSerializer)>,
    schema: Arc<Schema>,
    type_resolvers: Vec<(String, TypeResolver)>,
}
impl ExecutableSchemaBuilder {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            field_middleware: vec![],
            middleware: vec![],
            resolvers: vec![],
            scalar_serializers: vec![],
            schema,
            type_resolvers: vec![],
        }
    }

    pub fn build(self) -> Result<ExecutableSchema> {
        let schema = self.schema;

        let mut resolvers = HashMap::new();
        for (type_name, field_name, resolver) in self.resolvers {
            let type_id = Self::lookup_object_field(&schema, &type_name, &field_name)?;
            resolvers.insert((type_id, field_name), resolver);
        }

        let mut field_middleware = HashMap::<(TypeId, String), Vec<Middleware>>::new();
        for (type_name, field_name, middleware) in self.field_middleware {
            let type_id = Self::lookup_object_field(&schema, &type_name, &field_name)?;
            field_middleware.entry((type_id, field_name))
                .or_default()
                .push(middleware);
        }

        let mut type_resolvers = HashMap::new();
        for (type_name, type_resolver) in self.type_resolvers {
            let type_id = Self::lookup_type(&schema, &type_name)?;
            if !schema.get(type_id).is_abstract() {
                return Err(ExecutableSchemaBuildError::NonAbstractTypeResolver {
                    type_name,
                });
            }
            type_resolvers.insert(type_id, type_resolver);
        }

        let mut scalar_serializers = HashMap::new();
        for (type_name, serializer) in self.scalar_serializers {
            let type_id = Self::lookup_type(&schema, &type_name)?;
            if !matches!(schema.get(type_id), GraphQLType::Scalar(_)) {
                return Err(ExecutableSchemaBuildError::NonScalarSerializer {
                    type_name,
                });
            }
            scalar_serializers.insert(type_id, serializer);
        }

        let schema_id = NEXT_SCHEMA_ID.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            schema_id,
            resolvers = resolvers.len(),
            middleware = self.middleware.len(),
            "built executable schema",
        );

        Ok(ExecutableSchema {
            field_middleware,
            middleware: self.middleware,
            resolvers,
            scalar_serializers,
            schema,
            schema_id,
            type_resolvers,
        })
    }

    /// Middleware applied only to `type_name.field_name` (after any
    /// schema-wide middleware of the same stage).
    pub fn field_middleware(
        mut self,
        type_name: &str,
        field_name: &str,
        middleware: Middleware,
    ) -> Self {
        self.field_middleware.push((
            type_name.to_string(),
            field_name.to_string(),
            middleware,
        ));
        self
    }

    /// Middleware applied to every field of every object type.
    pub fn middleware(mut self, middleware: Middleware) -> Self {
        self.middleware.push(middleware);
        self
    }

    pub fn resolver<F, Fut>(mut self, type_name: &str, field_name: &str, resolver: F) -> Self
    where
        F: Fn(ResolverContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FieldResult<FieldValue>> + Send + 'static,
    {
        self.resolvers.push((
            type_name.to_string(),
            field_name.to_string(),
            Arc::new(move |ctx| resolver(ctx).boxed()),
        ));
        self
    }

    pub fn scalar_serializer<F>(mut self, scalar_name: &str, serializer: F) -> Self
    where
        F: Fn(&serde_json::Value) -> std::result::Result<serde_json::Value, String>
            + Send + Sync + 'static,
    {
        self.scalar_serializers.push((scalar_name.to_string(), Arc::new(serializer)));
        self
    }

    /// Register a resolver that computes its value without awaiting.
    pub fn sync_resolver<F>(mut self, type_name: &str, field_name: &str, resolver: F) -> Self
    where
        F: Fn(&ResolverContext) -> FieldResult<FieldValue> + Send + Sync + 'static,
    {
        self.resolvers.push((
            type_name.to_string(),
            field_name.to_string(),
            Arc::new(move |ctx| futures::future::ready(resolver(&ctx)).boxed()),
        ));
        self
    }

    pub fn type_resolver<F>(mut self, abstract_type_name: &str, type_resolver: F) -> Self
    where
        F: Fn(&FieldValue) -> Option<String> + Send + Sync + 'static,
    {
        self.type_resolvers.push((abstract_type_name.to_string(), Arc::new(type_resolver)));
        self
    }

    fn lookup_object_field(
        schema: &Schema,
        type_name: &str,
        field_name: &str,
    ) -> Result<TypeId> {
        let type_id = Self::lookup_type(schema, type_name)?;
        let GraphQLType::Object(obj_type) = schema.get(type_id) else {
            return Err(ExecutableSchemaBuildError::NonObjectFieldOwner {
                type_name: type_name.to_string(),
            });
        };
        if !obj_type.fields().contains_key(field_name) {
            return Err(ExecutableSchemaBuildError::UndefinedField {
                field_name: field_name.to_string(),
                type_name: type_name.to_string(),
            });
        }
        Ok(type_id)
    }

    fn lookup_type(schema: &Schema, type_name: &str) -> Result<TypeId> {
        schema.type_id(type_name).ok_or_else(|| ExecutableSchemaBuildError::UndefinedType {
            type_name: type_name.to_string(),
        })
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ExecutableSchemaBuildError {
    #[error("A type resolver was registered for `{type_name}`, which is not an interface or union")]
    NonAbstractTypeResolver {
        type_name: String,
    },

    #[error("Resolvers and field middleware may only be attached to object types, but `{type_name}` is not one")]
    NonObjectFieldOwner {
        type_name: String,
    },

    #[error("A scalar serializer was registered for `{type_name}`, which is not a custom scalar")]
    NonScalarSerializer {
        type_name: String,
    },

    #[error("The `{type_name}` type does not define a field named `{field_name}`")]
    UndefinedField {
        field_name: String,
        type_name: String,
    },

    #[error("The schema does not define a type named `{type_name}`")]
    UndefinedType {
        type_name: String,
    },
}
