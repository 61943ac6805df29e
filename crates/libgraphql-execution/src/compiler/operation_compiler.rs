use crate::coercion::VariableValues;
use crate::compiler::CompileError;
use crate::compiler::CompiledField;
use crate::compiler::CompiledOperation;
use crate::compiler::CompiledSelectionSet;
use crate::compiler::DeferredFragment;
use crate::compiler::ExecutionStrategy;
use crate::compiler::FieldKind;
use crate::compiler::StreamDirective;
use crate::compiler::TypedSelections;
use crate::compiler::directives;
use indexmap::IndexMap;
use libgraphql_schema::OperationKind;
use libgraphql_schema::Schema;
use libgraphql_schema::ast;
use libgraphql_schema::types::TypeAnnotation;
use libgraphql_schema::types::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

type Result<T> = std::result::Result<T, Vec<CompileError>>;

/// Pick the operation to execute out of `document`.
pub fn select_operation<'a>(
    document: &'a ast::operation::Document,
    operation_name: Option<&str>,
) -> std::result::Result<&'a ast::operation::OperationDefinition, CompileError> {
    let mut operations = document.definitions.iter().filter_map(|def| match def {
        ast::operation::Definition::Operation(op) => Some(op),
        ast::operation::Definition::Fragment(_) => None,
    });

    match operation_name {
        Some(name) => operations
            .find(|op| OperationParts::of(op).name == Some(name))
            .ok_or_else(|| CompileError::OperationNotFound {
                name: name.to_string(),
            }),

        None => {
            let first = operations.next().ok_or(CompileError::NoOperations)?;
            if operations.next().is_some() {
                return Err(CompileError::MultipleOperations);
            }
            Ok(first)
        },
    }
}

struct OperationParts<'a> {
    kind: OperationKind,
    name: Option<&'a str>,
    selection_set: &'a ast::operation::SelectionSet,
    variable_definitions: &'a [ast::operation::VariableDefinition],
}
impl<'a> OperationParts<'a> {
    fn of(op: &'a ast::operation::OperationDefinition) -> Self {
        use ast::operation::OperationDefinition;
        match op {
            OperationDefinition::Mutation(m) => Self {
                kind: OperationKind::Mutation,
                name: m.name.as_deref(),
                selection_set: &m.selection_set,
                variable_definitions: &m.variable_definitions,
            },
            OperationDefinition::Query(q) => Self {
                kind: OperationKind::Query,
                name: q.name.as_deref(),
                selection_set: &q.selection_set,
                variable_definitions: &q.variable_definitions,
            },
            OperationDefinition::SelectionSet(s) => Self {
                kind: OperationKind::Query,
                name: None,
                selection_set: s,
                variable_definitions: &[],
            },
            OperationDefinition::Subscription(s) => Self {
                kind: OperationKind::Subscription,
                name: s.name.as_deref(),
                selection_set: &s.selection_set,
                variable_definitions: &s.variable_definitions,
            },
        }
    }
}

/// A selection set to merge, plus the chain of fragments spread to reach it
/// (used to detect fragment cycles).
#[derive(Clone)]
struct SelectionSource<'a> {
    fragment_path: Vec<&'a str>,
    selection_set: &'a ast::operation::SelectionSet,
}

#[derive(Default)]
struct CollectedFields<'a> {
    deferred: Vec<(Option<String>, SelectionSource<'a>)>,
    fields: IndexMap<String, Vec<(&'a ast::operation::Field, Vec<&'a str>)>>,
}

/// Turns a document plus an operation name into a [`CompiledOperation`].
///
/// `@skip`, `@include`, `@defer`, and `@stream` are evaluated here against
/// the request's (already coerced) variables. Subscriptions inline `@defer`
/// and `@stream` so each event yields one complete payload.
pub struct OperationCompiler<'a> {
    errors: Vec<CompileError>,
    fragments: HashMap<&'a str, &'a ast::operation::FragmentDefinition>,
    has_incremental: bool,
    kind: OperationKind,
    schema: &'a Schema,
    variables: &'a VariableValues,
}
impl<'a> OperationCompiler<'a> {
    pub fn compile(
        schema: &'a Schema,
        document: &'a ast::operation::Document,
        operation_name: Option<&str>,
        variables: &'a VariableValues,
    ) -> Result<CompiledOperation> {
        let operation = select_operation(document, operation_name)
            .map_err(|err| vec![err])?;
        let parts = OperationParts::of(operation);

        let root_type = match (parts.kind, schema.operation_type(parts.kind)) {
            (_, Some(root_type)) => root_type,
            (OperationKind::Mutation, None) => return Err(vec![CompileError::NoMutationType]),
            (_, None) => return Err(vec![CompileError::NoSubscriptionType]),
        };

        let fragments = document.definitions
            .iter()
            .filter_map(|def| match def {
                ast::operation::Definition::Fragment(fragment) =>
                    Some((fragment.name.as_str(), fragment)),
                ast::operation::Definition::Operation(_) => None,
            })
            .collect();

        let mut compiler = Self {
            errors: vec![],
            fragments,
            has_incremental: false,
            kind: parts.kind,
            schema,
            variables,
        };

        let strategy = match parts.kind {
            OperationKind::Mutation => ExecutionStrategy::Serial,
            OperationKind::Query | OperationKind::Subscription => ExecutionStrategy::Parallel,
        };
        let selection_set = compiler.compile_selection_set(
            root_type,
            &[SelectionSource {
                fragment_path: vec![],
                selection_set: parts.selection_set,
            }],
            strategy,
            parts.selection_set.span.0,
        );

        if !compiler.errors.is_empty() {
            return Err(compiler.errors);
        }

        tracing::debug!(
            operation_name = parts.name,
            kind = %parts.kind,
            has_incremental = compiler.has_incremental,
            "compiled operation",
        );

        Ok(CompiledOperation {
            has_incremental: compiler.has_incremental,
            kind: parts.kind,
            name: parts.name.map(|name| name.to_string()),
            root_type,
            selection_set,
            variable_definitions: parts.variable_definitions.to_vec(),
        })
    }

    fn collect_fields(
        &mut self,
        object_type: TypeId,
        source: &SelectionSource<'a>,
        collected: &mut CollectedFields<'a>,
    ) {
        let selection_set: &'a ast::operation::SelectionSet = source.selection_set;
        for selection in &selection_set.items {
            match selection {
                ast::operation::Selection::Field(field) => {
                    if !self.should_include(&field.directives) {
                        continue;
                    }
                    let response_name = field.alias
                        .as_deref()
                        .unwrap_or(field.name.as_str());
                    collected.fields
                        .entry(response_name.to_string())
                        .or_default()
                        .push((field, source.fragment_path.clone()));
                },

                ast::operation::Selection::FragmentSpread(spread) => {
                    if !self.should_include(&spread.directives) {
                        continue;
                    }
                    let name = spread.fragment_name.as_str();
                    if source.fragment_path.contains(&name) {
                        self.errors.push(CompileError::FragmentCycle {
                            location: spread.position,
                            name: name.to_string(),
                        });
                        continue;
                    }
                    let Some(fragment) = self.fragments.get(name).copied() else {
                        self.errors.push(CompileError::UndefinedFragment {
                            location: spread.position,
                            name: name.to_string(),
                        });
                        continue;
                    };
                    let ast::operation::TypeCondition::On(condition) = &fragment.type_condition;
                    if !self.type_condition_applies(object_type, condition, fragment.position) {
                        continue;
                    }

                    let mut fragment_path = source.fragment_path.clone();
                    fragment_path.push(name);
                    let fragment_source = SelectionSource {
                        fragment_path,
                        selection_set: &fragment.selection_set,
                    };
                    match self.defer_label(&spread.directives) {
                        Some(label) => collected.deferred.push((label, fragment_source)),
                        None => self.collect_fields(object_type, &fragment_source, collected),
                    }
                },

                ast::operation::Selection::InlineFragment(inline) => {
                    if !self.should_include(&inline.directives) {
                        continue;
                    }
                    if let Some(ast::operation::TypeCondition::On(condition)) = &inline.type_condition
                        && !self.type_condition_applies(object_type, condition, inline.position) {
                        continue;
                    }

                    let inline_source = SelectionSource {
                        fragment_path: source.fragment_path.clone(),
                        selection_set: &inline.selection_set,
                    };
                    match self.defer_label(&inline.directives) {
                        Some(label) => collected.deferred.push((label, inline_source)),
                        None => self.collect_fields(object_type, &inline_source, collected),
                    }
                },
            }
        }
    }

    fn compile_field(
        &mut self,
        object_type: TypeId,
        response_name: String,
        occurrences: Vec<(&'a ast::operation::Field, Vec<&'a str>)>,
        position: usize,
    ) -> Option<Arc<CompiledField>> {
        let (first, _) = occurrences.first()?;
        let first = *first;

        if first.name == "__typename" {
            let Some(string_type) = self.schema.type_id("String") else {
                self.errors.push(CompileError::UndefinedType {
                    location: first.position,
                    name: "String".to_string(),
                });
                return None;
            };
            return Some(Arc::new(CompiledField {
                arguments: IndexMap::new(),
                field: None,
                field_name: first.name.clone(),
                kind: FieldKind::Typename,
                location: first.position,
                parent_type: object_type,
                position,
                possible_types: vec![],
                response_name,
                selection_set: None,
                stream: None,
                type_annotation: TypeAnnotation::named(string_type, "String", false),
            }));
        }

        let schema = self.schema;
        let Some(field_def) = schema.field(object_type, &first.name) else {
            self.errors.push(CompileError::UndefinedField {
                field: first.name.clone(),
                location: first.position,
                parent_type: schema.get(object_type).name().to_string(),
            });
            return None;
        };

        let inner_type = field_def.type_annotation().innermost_type_id();
        let selection_set =
            if schema.get(inner_type).is_composite() {
                let sources: Vec<SelectionSource<'a>> = occurrences.iter()
                    .map(|(field, fragment_path)| SelectionSource {
                        fragment_path: fragment_path.clone(),
                        selection_set: &field.selection_set,
                    })
                    .collect();
                Some(self.compile_selection_set(
                    inner_type,
                    &sources,
                    ExecutionStrategy::Parallel,
                    first.position,
                ))
            } else {
                None
            };

        let stream =
            if field_def.type_annotation().is_list() {
                self.stream_directive(&first.directives)
            } else {
                None
            };
        if stream.is_some() {
            self.has_incremental = true;
        }

        Some(Arc::new(CompiledField {
            arguments: first.arguments.iter().cloned().collect(),
            field: Some(field_def.clone()),
            field_name: first.name.clone(),
            kind: FieldKind::Field,
            location: first.position,
            parent_type: object_type,
            position,
            possible_types: schema.possible_types(inner_type).to_vec(),
            response_name,
            selection_set,
            stream,
            type_annotation: field_def.type_annotation().clone(),
        }))
    }

    fn compile_selection_set(
        &mut self,
        parent_type: TypeId,
        sources: &[SelectionSource<'a>],
        strategy: ExecutionStrategy,
        location: ast::Pos,
    ) -> Arc<CompiledSelectionSet> {
        let possible_types = self.schema.possible_types(parent_type).to_vec();
        if possible_types.is_empty() {
            self.errors.push(CompileError::NoPossibleTypes {
                location,
                type_name: self.schema.get(parent_type).name().to_string(),
            });
        }

        let mut by_type = IndexMap::new();
        for object_type in possible_types {
            let mut collected = CollectedFields::default();
            for source in sources {
                self.collect_fields(object_type, source, &mut collected);
            }

            let mut fields = Vec::with_capacity(collected.fields.len());
            for (position, (response_name, occurrences)) in collected.fields.into_iter().enumerate() {
                if let Some(field) = self.compile_field(object_type, response_name, occurrences, position) {
                    fields.push(field);
                }
            }

            let mut deferred = vec![];
            for (label, source) in collected.deferred {
                self.has_incremental = true;
                let fragment_location = source.selection_set.span.0;
                deferred.push(DeferredFragment {
                    label,
                    selections: self.compile_selection_set(
                        object_type,
                        &[source],
                        ExecutionStrategy::Parallel,
                        fragment_location,
                    ),
                });
            }

            by_type.insert(object_type, TypedSelections { deferred, fields });
        }

        Arc::new(CompiledSelectionSet { by_type, strategy })
    }

    /// `Some(label)` when the directives carry an active `@defer`.
    fn defer_label(&self, directive_list: &[ast::operation::Directive]) -> Option<Option<String>> {
        if matches!(self.kind, OperationKind::Subscription) {
            return None;
        }
        let defer = directives::find(directive_list, "defer")?;
        if !directives::eval_bool(directives::argument(defer, "if"), self.variables, true) {
            return None;
        }
        Some(directives::eval_string(directives::argument(defer, "label"), self.variables))
    }

    fn should_include(&self, directive_list: &[ast::operation::Directive]) -> bool {
        if let Some(skip) = directives::find(directive_list, "skip")
            && directives::eval_bool(directives::argument(skip, "if"), self.variables, false) {
            return false;
        }
        if let Some(include) = directives::find(directive_list, "include")
            && !directives::eval_bool(directives::argument(include, "if"), self.variables, true) {
            return false;
        }
        true
    }

    fn stream_directive(&self, directive_list: &[ast::operation::Directive]) -> Option<StreamDirective> {
        if matches!(self.kind, OperationKind::Subscription) {
            return None;
        }
        let stream = directives::find(directive_list, "stream")?;
        if !directives::eval_bool(directives::argument(stream, "if"), self.variables, true) {
            return None;
        }
        Some(StreamDirective {
            initial_count: directives::eval_count(
                directives::argument(stream, "initialCount"),
                self.variables,
            ),
            label: directives::eval_string(directives::argument(stream, "label"), self.variables),
        })
    }

    fn type_condition_applies(
        &mut self,
        object_type: TypeId,
        condition: &str,
        location: ast::Pos,
    ) -> bool {
        match self.schema.type_id(condition) {
            Some(condition_type) =>
                condition_type == object_type
                    || self.schema.is_possible_type(condition_type, object_type),
            None => {
                self.errors.push(CompileError::UndefinedType {
                    location,
                    name: condition.to_string(),
                });
                false
            },
        }
    }
}
