use indexmap::IndexMap;
use libgraphql_schema::OperationKind;
use libgraphql_schema::ast;
use libgraphql_schema::types::Field;
use libgraphql_schema::types::TypeAnnotation;
use libgraphql_schema::types::TypeId;
use std::sync::Arc;

/// How the fields of one selection set are scheduled.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecutionStrategy {
    /// Fields may resolve concurrently.
    Parallel,

    /// Each field (including its entire subtree) completes before the next
    /// one starts. Used for the root selection set of a mutation.
    Serial,
}

/// An operation selected from a document and bound against a schema.
///
/// Fragments are inlined, `@skip`/`@include` have been applied, and every
/// selection set is pre-split by the concrete object type it may be executed
/// against. A `CompiledOperation` is immutable and shared by every request
/// that compiles to the same cache key.
#[derive(Clone, Debug)]
pub struct CompiledOperation {
    pub(crate) has_incremental: bool,
    pub(crate) kind: OperationKind,
    pub(crate) name: Option<String>,
    pub(crate) root_type: TypeId,
    pub(crate) selection_set: Arc<CompiledSelectionSet>,
    pub(crate) variable_definitions: Vec<ast::operation::VariableDefinition>,
}
impl CompiledOperation {
    /// Whether any `@defer` or `@stream` survived compilation.
    pub fn has_incremental(&self) -> bool {
        self.has_incremental
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn root_type(&self) -> TypeId {
        self.root_type
    }

    pub fn selection_set(&self) -> &Arc<CompiledSelectionSet> {
        &self.selection_set
    }

    pub fn variable_definitions(&self) -> &[ast::operation::VariableDefinition] {
        self.variable_definitions.as_slice()
    }
}

#[derive(Clone, Debug)]
pub struct CompiledSelectionSet {
    pub(crate) by_type: IndexMap<TypeId, TypedSelections>,
    pub(crate) strategy: ExecutionStrategy,
}
impl CompiledSelectionSet {
    /// The selections that apply when the parent value's concrete type is
    /// `object_type`.
    pub fn for_type(&self, object_type: TypeId) -> Option<&TypedSelections> {
        self.by_type.get(&object_type)
    }

    pub fn possible_types(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.by_type.keys().copied()
    }

    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }
}

/// The fields (in response order) and deferred fragments of a selection set
/// for one concrete object type.
#[derive(Clone, Debug, Default)]
pub struct TypedSelections {
    pub(crate) deferred: Vec<DeferredFragment>,
    pub(crate) fields: Vec<Arc<CompiledField>>,
}
impl TypedSelections {
    pub fn deferred(&self) -> &[DeferredFragment] {
        self.deferred.as_slice()
    }

    pub fn fields(&self) -> &[Arc<CompiledField>] {
        self.fields.as_slice()
    }

    pub fn response_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.response_name())
    }
}

#[derive(Clone, Debug)]
pub struct DeferredFragment {
    pub(crate) label: Option<String>,
    pub(crate) selections: Arc<CompiledSelectionSet>,
}
impl DeferredFragment {
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn selections(&self) -> &Arc<CompiledSelectionSet> {
        &self.selections
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldKind {
    Field,
    Typename,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StreamDirective {
    pub(crate) initial_count: usize,
    pub(crate) label: Option<String>,
}
impl StreamDirective {
    pub fn initial_count(&self) -> usize {
        self.initial_count
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

/// A field selection bound to its schema definition.
#[derive(Clone, Debug)]
pub struct CompiledField {
    pub(crate) arguments: IndexMap<String, ast::Value>,
    pub(crate) field: Option<Field>,
    pub(crate) field_name: String,
    pub(crate) kind: FieldKind,
    pub(crate) location: ast::Pos,
    pub(crate) parent_type: TypeId,
    pub(crate) position: usize,
    pub(crate) possible_types: Vec<TypeId>,
    pub(crate) response_name: String,
    pub(crate) selection_set: Option<Arc<CompiledSelectionSet>>,
    pub(crate) stream: Option<StreamDirective>,
    pub(crate) type_annotation: TypeAnnotation,
}
impl CompiledField {
    /// Argument literals as written in the document. They may reference
    /// variables and are coerced each time the field is resolved.
    pub fn arguments(&self) -> &IndexMap<String, ast::Value> {
        &self.arguments
    }

    /// The schema definition of this field. `None` for `__typename`.
    pub fn field(&self) -> Option<&Field> {
        self.field.as_ref()
    }

    pub fn field_name(&self) -> &str {
        self.field_name.as_str()
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn location(&self) -> ast::Pos {
        self.location
    }

    pub fn parent_type(&self) -> TypeId {
        self.parent_type
    }

    /// Ordinal of this field within its [`TypedSelections`].
    pub fn position(&self) -> usize {
        self.position
    }

    /// Concrete object types the field's (innermost) value may have. Empty
    /// for leaf fields.
    pub fn possible_types(&self) -> &[TypeId] {
        self.possible_types.as_slice()
    }

    pub fn response_name(&self) -> &str {
        self.response_name.as_str()
    }

    pub fn selection_set(&self) -> Option<&Arc<CompiledSelectionSet>> {
        self.selection_set.as_ref()
    }

    pub fn stream(&self) -> Option<&StreamDirective> {
        self.stream.as_ref()
    }

    pub fn type_annotation(&self) -> &TypeAnnotation {
        &self.type_annotation
    }
}
