//! Input coercion for variable values and field arguments.
//!
//! Coerced values are plain JSON. Enum values become strings, `ID`s become
//! strings, and `Float`s are always JSON floats.

use indexmap::IndexMap;
use libgraphql_schema::Schema;
use libgraphql_schema::ast;
use libgraphql_schema::types::GraphQLType;
use libgraphql_schema::types::InputObjectType;
use libgraphql_schema::types::Parameter;
use libgraphql_schema::types::TypeAnnotation;
use libgraphql_schema::types::TypeId;
use serde_json::Value;
use thiserror::Error;

type Result<T> = std::result::Result<T, CoercionError>;

/// Coerced variable values, keyed by variable name (without the `$`).
pub type VariableValues = serde_json::Map<String, Value>;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum CoercionError {
    #[error("{location}: expected a value of type `{expected}` but found `{found}`")]
    InvalidValue {
        expected: String,
        found: String,
        location: String,
    },

    #[error("{location}: `{type_name}` is not an input type")]
    NonInputType {
        location: String,
        type_name: String,
    },

    #[error("{location}: a value of non-null type `{expected}` is required")]
    RequiredValueMissing {
        expected: String,
        location: String,
    },

    #[error("{location}: unknown type `{type_name}`")]
    UndefinedType {
        location: String,
        type_name: String,
    },

    #[error("{location}: `{field_name}` is not a field of input type `{type_name}`")]
    UnknownInputField {
        field_name: String,
        location: String,
        type_name: String,
    },
}

/// Coerce the raw variable values supplied with a request against the
/// variable definitions of `operation`.
///
/// Every problem is reported rather than just the first one.
pub fn coerce_variables(
    schema: &Schema,
    operation: &ast::operation::OperationDefinition,
    raw: &VariableValues,
) -> std::result::Result<VariableValues, Vec<CoercionError>> {
    use ast::operation::OperationDefinition;
    let definitions = match operation {
        OperationDefinition::Mutation(op) => op.variable_definitions.as_slice(),
        OperationDefinition::Query(op) => op.variable_definitions.as_slice(),
        OperationDefinition::SelectionSet(_) => &[],
        OperationDefinition::Subscription(op) => op.variable_definitions.as_slice(),
    };

    let mut coerced = VariableValues::new();
    let mut errors = vec![];
    for def in definitions {
        let location = format!("${}", def.name);
        let Some(annotation) = annotation_from_ast(schema, &def.var_type, true) else {
            errors.push(CoercionError::UndefinedType {
                location,
                type_name: innermost_type_name(&def.var_type).to_string(),
            });
            continue;
        };

        let result = match (raw.get(&def.name), &def.default_value) {
            (Some(value), _) =>
                coerce_input_value(schema, &annotation, value, &location).map(Some),
            (None, Some(default)) =>
                coerce_literal(schema, &annotation, default, &VariableValues::new(), &location)
                    .map(Some),
            (None, None) if !annotation.nullable() =>
                Err(CoercionError::RequiredValueMissing {
                    expected: annotation.to_string(),
                    location,
                }),
            (None, None) => Ok(None),
        };

        match result {
            Ok(Some(value)) => {
                coerced.insert(def.name.clone(), value);
            },
            Ok(None) => (),
            Err(err) => errors.push(err),
        }
    }

    if errors.is_empty() {
        Ok(coerced)
    } else {
        Err(errors)
    }
}

/// Coerce the argument literals written on a field against the field's
/// parameter definitions. Arguments bound to a variable that was not
/// provided fall back to the parameter's default value.
pub fn coerce_argument_values(
    schema: &Schema,
    parameters: &IndexMap<String, Parameter>,
    arguments: &IndexMap<String, ast::Value>,
    variables: &VariableValues,
) -> Result<VariableValues> {
    let mut coerced = VariableValues::new();
    for (name, param) in parameters {
        let location = format!("argument `{name}`");
        let value = coerce_parameter(
            schema,
            param,
            arguments.get(name),
            variables,
            &location,
        )?;
        if let Some(value) = value {
            coerced.insert(name.clone(), value);
        }
    }
    Ok(coerced)
}

/// Convert an AST literal to JSON without any type information. Used for
/// custom scalars, whose input format is opaque to the engine.
pub fn ast_value_to_json(literal: &ast::Value, variables: &VariableValues) -> Value {
    match literal {
        ast::Value::Boolean(b) => Value::from(*b),
        ast::Value::Enum(name) => Value::from(name.as_str()),
        ast::Value::Float(f) => Value::from(*f),
        ast::Value::Int(n) => n.as_i64().map(Value::from).unwrap_or(Value::Null),
        ast::Value::List(items) => Value::Array(
            items.iter()
                .map(|item| ast_value_to_json(item, variables))
                .collect(),
        ),
        ast::Value::Null => Value::Null,
        ast::Value::Object(fields) => Value::Object(
            fields.iter()
                .map(|(name, value)| (name.clone(), ast_value_to_json(value, variables)))
                .collect(),
        ),
        ast::Value::String(s) => Value::from(s.as_str()),
        ast::Value::Variable(name) => variables.get(name).cloned().unwrap_or(Value::Null),
    }
}

pub(crate) fn annotation_from_ast(
    schema: &Schema,
    ast_type: &ast::operation::Type,
    nullable: bool,
) -> Option<TypeAnnotation> {
    match ast_type {
        ast::operation::Type::ListType(inner) =>
            annotation_from_ast(schema, inner, true)
                .map(|inner| TypeAnnotation::list(inner, nullable)),

        ast::operation::Type::NamedType(name) =>
            schema.type_id(name)
                .map(|type_id| TypeAnnotation::named(type_id, name.as_str(), nullable)),

        ast::operation::Type::NonNullType(inner) =>
            annotation_from_ast(schema, inner, false),
    }
}

fn innermost_type_name(ast_type: &ast::operation::Type) -> &str {
    match ast_type {
        ast::operation::Type::ListType(inner)
            | ast::operation::Type::NonNullType(inner) => innermost_type_name(inner),
        ast::operation::Type::NamedType(name) => name.as_str(),
    }
}

/// Coerce a runtime (JSON) input value, e.g. a variable value.
pub fn coerce_input_value(
    schema: &Schema,
    annotation: &TypeAnnotation,
    value: &Value,
    location: &str,
) -> Result<Value> {
    if value.is_null() {
        return null_for(annotation, location);
    }

    match annotation {
        TypeAnnotation::List(list_annot) => {
            let inner = list_annot.inner_type_annotation();
            match value {
                Value::Array(items) => items.iter()
                    .enumerate()
                    .map(|(idx, item)| coerce_input_value(
                        schema,
                        inner,
                        item,
                        &format!("{location}[{idx}]"),
                    ))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Array),

                single => Ok(Value::Array(vec![
                    coerce_input_value(schema, inner, single, location)?,
                ])),
            }
        },

        TypeAnnotation::Named(named_annot) => coerce_named_input(
            schema,
            named_annot.type_id(),
            named_annot.type_name(),
            value,
            location,
        ),
    }
}

fn coerce_named_input(
    schema: &Schema,
    type_id: TypeId,
    type_name: &str,
    value: &Value,
    location: &str,
) -> Result<Value> {
    let invalid = || CoercionError::InvalidValue {
        expected: type_name.to_string(),
        found: value.to_string(),
        location: location.to_string(),
    };

    match schema.get(type_id) {
        GraphQLType::Bool => value.as_bool().map(Value::from).ok_or_else(invalid),

        GraphQLType::Enum(enum_type) => match value.as_str() {
            Some(name) if enum_type.has_value(name) => Ok(Value::from(name)),
            _ => Err(invalid()),
        },

        GraphQLType::Float => value.as_f64().map(Value::from).ok_or_else(invalid),

        GraphQLType::ID => match value {
            Value::String(id) => Ok(Value::from(id.as_str())),
            Value::Number(num) if num.is_i64() || num.is_u64() =>
                Ok(Value::from(num.to_string())),
            _ => Err(invalid()),
        },

        GraphQLType::InputObject(input_type) => match value {
            Value::Object(fields) => {
                let mut coerced = VariableValues::new();
                for field_name in fields.keys() {
                    if !input_type.fields().contains_key(field_name) {
                        return Err(CoercionError::UnknownInputField {
                            field_name: field_name.clone(),
                            location: location.to_string(),
                            type_name: input_type.name().to_string(),
                        });
                    }
                }
                for (field_name, param) in input_type.fields() {
                    let field_location = format!("{location}.{field_name}");
                    let field_value = match fields.get(field_name) {
                        Some(field_value) => Some(coerce_input_value(
                            schema,
                            param.type_annotation(),
                            field_value,
                            &field_location,
                        )?),
                        None => default_for(schema, param, &field_location)?,
                    };
                    if let Some(field_value) = field_value {
                        coerced.insert(field_name.clone(), field_value);
                    }
                }
                Ok(Value::Object(coerced))
            },
            _ => Err(invalid()),
        },

        GraphQLType::Int => value.as_i64()
            .and_then(|num| i32::try_from(num).ok())
            .map(Value::from)
            .ok_or_else(invalid),

        GraphQLType::Scalar(_) => Ok(value.clone()),

        GraphQLType::String => value.as_str().map(Value::from).ok_or_else(invalid),

        GraphQLType::Interface(_)
            | GraphQLType::Object(_)
            | GraphQLType::Union(_) => Err(CoercionError::NonInputType {
                location: location.to_string(),
                type_name: type_name.to_string(),
            }),
    }
}

/// Coerce an AST literal (which may reference variables) against
/// `annotation`.
pub fn coerce_literal(
    schema: &Schema,
    annotation: &TypeAnnotation,
    literal: &ast::Value,
    variables: &VariableValues,
    location: &str,
) -> Result<Value> {
    match literal {
        ast::Value::Variable(var_name) => {
            return match variables.get(var_name) {
                Some(value) => coerce_input_value(schema, annotation, value, location),
                None => null_for(annotation, location),
            };
        },
        ast::Value::Null => return null_for(annotation, location),
        _ => (),
    }

    match annotation {
        TypeAnnotation::List(list_annot) => {
            let inner = list_annot.inner_type_annotation();
            match literal {
                ast::Value::List(items) => items.iter()
                    .enumerate()
                    .map(|(idx, item)| coerce_literal(
                        schema,
                        inner,
                        item,
                        variables,
                        &format!("{location}[{idx}]"),
                    ))
                    .collect::<Result<Vec<_>>>()
                    .map(Value::Array),

                single => Ok(Value::Array(vec![
                    coerce_literal(schema, inner, single, variables, location)?,
                ])),
            }
        },

        TypeAnnotation::Named(named_annot) => coerce_named_literal(
            schema,
            named_annot.type_id(),
            named_annot.type_name(),
            literal,
            variables,
            location,
        ),
    }
}

fn coerce_named_literal(
    schema: &Schema,
    type_id: TypeId,
    type_name: &str,
    literal: &ast::Value,
    variables: &VariableValues,
    location: &str,
) -> Result<Value> {
    let invalid = || CoercionError::InvalidValue {
        expected: type_name.to_string(),
        found: literal.to_string(),
        location: location.to_string(),
    };

    match schema.get(type_id) {
        GraphQLType::Bool => match literal {
            ast::Value::Boolean(b) => Ok(Value::from(*b)),
            _ => Err(invalid()),
        },

        GraphQLType::Enum(enum_type) => match literal {
            ast::Value::Enum(name) if enum_type.has_value(name) =>
                Ok(Value::from(name.as_str())),
            _ => Err(invalid()),
        },

        GraphQLType::Float => match literal {
            ast::Value::Float(f) => Ok(Value::from(*f)),
            ast::Value::Int(num) => num.as_i64()
                .map(|num| Value::from(num as f64))
                .ok_or_else(invalid),
            _ => Err(invalid()),
        },

        GraphQLType::ID => match literal {
            ast::Value::Int(num) => num.as_i64()
                .map(|num| Value::from(num.to_string()))
                .ok_or_else(invalid),
            ast::Value::String(id) => Ok(Value::from(id.as_str())),
            _ => Err(invalid()),
        },

        GraphQLType::InputObject(input_type) => match literal {
            ast::Value::Object(fields) => coerce_input_object_literal(
                schema,
                input_type,
                fields,
                variables,
                location,
            ),
            _ => Err(invalid()),
        },

        GraphQLType::Int => match literal {
            ast::Value::Int(num) => num.as_i64()
                .and_then(|num| i32::try_from(num).ok())
                .map(Value::from)
                .ok_or_else(invalid),
            _ => Err(invalid()),
        },

        GraphQLType::Scalar(_) => Ok(ast_value_to_json(literal, variables)),

        GraphQLType::String => match literal {
            ast::Value::String(s) => Ok(Value::from(s.as_str())),
            _ => Err(invalid()),
        },

        GraphQLType::Interface(_)
            | GraphQLType::Object(_)
            | GraphQLType::Union(_) => Err(CoercionError::NonInputType {
                location: location.to_string(),
                type_name: type_name.to_string(),
            }),
    }
}

fn coerce_input_object_literal(
    schema: &Schema,
    input_type: &InputObjectType,
    fields: &std::collections::BTreeMap<String, ast::Value>,
    variables: &VariableValues,
    location: &str,
) -> Result<Value> {
    for field_name in fields.keys() {
        if !input_type.fields().contains_key(field_name) {
            return Err(CoercionError::UnknownInputField {
                field_name: field_name.clone(),
                location: location.to_string(),
                type_name: input_type.name().to_string(),
            });
        }
    }

    let mut coerced = VariableValues::new();
    for (field_name, param) in input_type.fields() {
        let value = coerce_parameter(
            schema,
            param,
            fields.get(field_name),
            variables,
            &format!("{location}.{field_name}"),
        )?;
        if let Some(value) = value {
            coerced.insert(field_name.clone(), value);
        }
    }
    Ok(Value::Object(coerced))
}

/// Shared by field arguments and input object fields. `None` means the value
/// is absent from the coerced map.
fn coerce_parameter(
    schema: &Schema,
    param: &Parameter,
    literal: Option<&ast::Value>,
    variables: &VariableValues,
    location: &str,
) -> Result<Option<Value>> {
    let provided = match literal {
        Some(ast::Value::Variable(var_name)) => variables.contains_key(var_name),
        Some(_) => true,
        None => false,
    };

    match literal {
        Some(literal) if provided => coerce_literal(
            schema,
            param.type_annotation(),
            literal,
            variables,
            location,
        ).map(Some),
        _ => default_for(schema, param, location),
    }
}

fn default_for(
    schema: &Schema,
    param: &Parameter,
    location: &str,
) -> Result<Option<Value>> {
    match param.default_value() {
        Some(default) => coerce_literal(
            schema,
            param.type_annotation(),
            default,
            &VariableValues::new(),
            location,
        ).map(Some),
        None if !param.type_annotation().nullable() =>
            Err(CoercionError::RequiredValueMissing {
                expected: param.type_annotation().to_string(),
                location: location.to_string(),
            }),
        None => Ok(None),
    }
}

fn null_for(annotation: &TypeAnnotation, location: &str) -> Result<Value> {
    if annotation.nullable() {
        Ok(Value::Null)
    } else {
        Err(CoercionError::RequiredValueMissing {
            expected: annotation.to_string(),
            location: location.to_string(),
        })
    }
}
