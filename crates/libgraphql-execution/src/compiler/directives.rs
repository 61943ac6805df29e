use crate::coercion::VariableValues;
use libgraphql_schema::ast;
use std::collections::BTreeSet;

/// Directives that are evaluated while compiling. Any variable they refer to
/// becomes part of the operation cache key.
const COMPILE_TIME_DIRECTIVES: [&str; 4] = ["defer", "include", "skip", "stream"];

pub(super) fn find<'d>(
    directives: &'d [ast::operation::Directive],
    name: &str,
) -> Option<&'d ast::operation::Directive> {
    directives.iter().find(|directive| directive.name == name)
}

pub(super) fn argument<'d>(
    directive: &'d ast::operation::Directive,
    name: &str,
) -> Option<&'d ast::Value> {
    directive.arguments
        .iter()
        .find(|(arg_name, _)| arg_name == name)
        .map(|(_, value)| value)
}

pub(super) fn eval_bool(
    value: Option<&ast::Value>,
    variables: &VariableValues,
    default: bool,
) -> bool {
    match value {
        Some(ast::Value::Boolean(b)) => *b,
        Some(ast::Value::Variable(name)) => variables
            .get(name)
            .and_then(|value| value.as_bool())
            .unwrap_or(default),
        _ => default,
    }
}

pub(super) fn eval_string(
    value: Option<&ast::Value>,
    variables: &VariableValues,
) -> Option<String> {
    match value {
        Some(ast::Value::String(s)) => Some(s.clone()),
        Some(ast::Value::Variable(name)) => variables
            .get(name)
            .and_then(|value| value.as_str())
            .map(|s| s.to_string()),
        _ => None,
    }
}

pub(super) fn eval_count(
    value: Option<&ast::Value>,
    variables: &VariableValues,
) -> usize {
    let count = match value {
        Some(ast::Value::Int(num)) => num.as_i64(),
        Some(ast::Value::Variable(name)) => variables
            .get(name)
            .and_then(|value| value.as_i64()),
        _ => None,
    };
    count.and_then(|n| usize::try_from(n).ok()).unwrap_or(0)
}

/// Names of every variable referenced by an `@skip`, `@include`, `@defer`, or
/// `@stream` directive anywhere in `document`, sorted.
pub fn directive_variable_names(document: &ast::operation::Document) -> Vec<String> {
    let mut names = BTreeSet::new();
    for def in &document.definitions {
        match def {
            ast::operation::Definition::Fragment(fragment) => {
                collect_from_directives(&fragment.directives, &mut names);
                collect_from_selection_set(&fragment.selection_set, &mut names);
            },

            ast::operation::Definition::Operation(op) => {
                use ast::operation::OperationDefinition;
                let selection_set = match op {
                    OperationDefinition::Mutation(m) => &m.selection_set,
                    OperationDefinition::Query(q) => &q.selection_set,
                    OperationDefinition::SelectionSet(s) => s,
                    OperationDefinition::Subscription(s) => &s.selection_set,
                };
                collect_from_selection_set(selection_set, &mut names);
            },
        }
    }
    names.into_iter().collect()
}

fn collect_from_directives(
    directives: &[ast::operation::Directive],
    names: &mut BTreeSet<String>,
) {
    for directive in directives {
        if !COMPILE_TIME_DIRECTIVES.contains(&directive.name.as_str()) {
            continue;
        }
        for (_, value) in &directive.arguments {
            if let ast::Value::Variable(var_name) = value {
                names.insert(var_name.clone());
            }
        }
    }
}

fn collect_from_selection_set(
    selection_set: &ast::operation::SelectionSet,
    names: &mut BTreeSet<String>,
) {
    for selection in &selection_set.items {
        match selection {
            ast::operation::Selection::Field(field) => {
                collect_from_directives(&field.directives, names);
                collect_from_selection_set(&field.selection_set, names);
            },

            ast::operation::Selection::FragmentSpread(spread) =>
                collect_from_directives(&spread.directives, names),

            ast::operation::Selection::InlineFragment(inline) => {
                collect_from_directives(&inline.directives, names);
                collect_from_selection_set(&inline.selection_set, names);
            },
        }
    }
}
