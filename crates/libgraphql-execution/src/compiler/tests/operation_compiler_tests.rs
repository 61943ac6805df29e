use crate::coercion::VariableValues;
use crate::compiler::CompileError;
use crate::compiler::CompiledOperation;
use crate::compiler::ExecutionStrategy;
use crate::compiler::FieldKind;
use crate::compiler::OperationCompiler;
use crate::compiler::directive_variable_names;
use crate::compiler::select_operation;
use libgraphql_schema::OperationKind;
use libgraphql_schema::Schema;
use libgraphql_schema::ast;

const SCHEMA: &str = concat!(
    "interface Node { id: ID! }\n",
    "type User implements Node { id: ID! name: String friends: [User!] }\n",
    "type Post implements Node { id: ID! title: String author: User }\n",
    "union SearchResult = User | Post\n",
    "type Query {\n",
    "  me: User\n",
    "  node(id: ID!): Node\n",
    "  search(term: String): [SearchResult!]!\n",
    "}\n",
    "type Mutation { rename(name: String!): User }\n",
);

fn schema() -> Schema {
    Schema::builder()
        .load_str(None, SCHEMA)
        .unwrap()
        .build()
        .unwrap()
}

fn compile_with(
    schema: &Schema,
    query: &str,
    operation_name: Option<&str>,
    variables: serde_json::Value,
) -> Result<CompiledOperation, Vec<CompileError>> {
    let document = ast::operation::parse(query).unwrap();
    let variables: VariableValues = match variables {
        serde_json::Value::Object(map) => map,
        _ => VariableValues::new(),
    };
    OperationCompiler::compile(schema, &document, operation_name, &variables)
}

fn compile(schema: &Schema, query: &str) -> Result<CompiledOperation, Vec<CompileError>> {
    compile_with(schema, query, None, serde_json::json!({}))
}

fn root_names(schema: &Schema, op: &CompiledOperation) -> Vec<String> {
    op.selection_set()
        .for_type(schema.query_type())
        .unwrap()
        .response_names()
        .map(|name| name.to_string())
        .collect()
}

mod operation_selection {
    use super::*;

    #[test]
    fn single_anonymous_operation_is_selected() {
        let document = ast::operation::parse("{ me { id } }").unwrap();
        assert!(select_operation(&document, None).is_ok());
    }

    #[test]
    fn multiple_operations_require_a_name() {
        let document = ast::operation::parse(concat!(
            "query A { me { id } }\n",
            "query B { me { name } }\n",
        )).unwrap();

        assert_eq!(
            select_operation(&document, None).unwrap_err(),
            CompileError::MultipleOperations,
        );
        assert!(select_operation(&document, Some("B")).is_ok());
        assert_eq!(
            select_operation(&document, Some("C")).unwrap_err(),
            CompileError::OperationNotFound { name: "C".to_string() },
        );
    }

    #[test]
    fn fragment_only_document_has_no_operations() {
        let document = ast::operation::parse("fragment F on User { id }").unwrap();
        assert_eq!(
            select_operation(&document, None).unwrap_err(),
            CompileError::NoOperations,
        );
    }

    #[test]
    fn subscription_without_subscription_type_fails() {
        let schema = schema();
        let errors = compile(&schema, "subscription { me { id } }").unwrap_err();
        assert_eq!(errors, vec![CompileError::NoSubscriptionType]);
    }
}

mod field_collection {
    use super::*;

    #[test]
    fn aliases_and_order_are_preserved() {
        let schema = schema();
        let op = compile(&schema, "{ b: me { id } a: me { name } me { id } }").unwrap();

        assert_eq!(op.kind(), OperationKind::Query);
        assert_eq!(root_names(&schema, &op), vec!["b", "a", "me"]);
    }

    #[test]
    fn same_response_name_merges_sub_selections() {
        let schema = schema();
        let op = compile(&schema, "{ me { id } me { name id } }").unwrap();

        let root = op.selection_set().for_type(schema.query_type()).unwrap();
        assert_eq!(root.fields().len(), 1);

        let user_id = schema.type_id("User").unwrap();
        let me = &root.fields()[0];
        let user_fields: Vec<&str> = me.selection_set()
            .unwrap()
            .for_type(user_id)
            .unwrap()
            .response_names()
            .collect();
        assert_eq!(user_fields, vec!["id", "name"]);
    }

    #[test]
    fn skip_and_include_are_applied() {
        let schema = schema();
        let op = compile_with(
            &schema,
            concat!(
                "query Q($yes: Boolean!, $no: Boolean!) {\n",
                "  a: me @include(if: $yes) { id }\n",
                "  b: me @include(if: $no) { id }\n",
                "  c: me @skip(if: $yes) { id }\n",
                "  d: me @skip(if: $no) { id }\n",
                "  e: me @skip(if: false) @include(if: true) { id }\n",
                "}\n",
            ),
            None,
            serde_json::json!({ "yes": true, "no": false }),
        ).unwrap();

        assert_eq!(root_names(&schema, &op), vec!["a", "d", "e"]);
    }

    #[test]
    fn fragments_are_inlined_in_place() {
        let schema = schema();
        let op = compile(&schema, concat!(
            "{ first: me { id } ...Rest last: me { id } }\n",
            "fragment Rest on Query { middle: me { name } }\n",
        )).unwrap();

        assert_eq!(root_names(&schema, &op), vec!["first", "middle", "last"]);
    }

    #[test]
    fn abstract_selections_are_split_by_concrete_type() {
        let schema = schema();
        let op = compile(&schema, concat!(
            "{ search(term: \"x\") {\n",
            "  __typename\n",
            "  ... on User { name }\n",
            "  ... on Post { title }\n",
            "  ... on Node { id }\n",
            "} }\n",
        )).unwrap();

        let root = op.selection_set().for_type(schema.query_type()).unwrap();
        let search = &root.fields()[0];
        let selections = search.selection_set().unwrap();

        let user = selections.for_type(schema.type_id("User").unwrap()).unwrap();
        assert_eq!(user.response_names().collect::<Vec<_>>(), vec!["__typename", "name", "id"]);
        assert_eq!(user.fields()[0].kind(), FieldKind::Typename);

        let post = selections.for_type(schema.type_id("Post").unwrap()).unwrap();
        assert_eq!(post.response_names().collect::<Vec<_>>(), vec!["__typename", "title", "id"]);
    }

    #[test]
    fn arguments_are_kept_as_literals() {
        let schema = schema();
        let op = compile(&schema, "query($id: ID!) { node(id: $id) { id } }").unwrap();

        let root = op.selection_set().for_type(schema.query_type()).unwrap();
        assert_eq!(
            root.fields()[0].arguments().get("id"),
            Some(&ast::Value::Variable("id".to_string())),
        );
    }
}

mod strategies {
    use super::*;

    #[test]
    fn mutation_root_is_serial_and_nested_sets_are_parallel() {
        let schema = schema();
        let op = compile(&schema, "mutation { a: rename(name: \"x\") { id } }").unwrap();

        assert_eq!(op.kind(), OperationKind::Mutation);
        assert_eq!(op.selection_set().strategy(), ExecutionStrategy::Serial);

        let mutation_type = schema.mutation_type().unwrap();
        let rename = &op.selection_set().for_type(mutation_type).unwrap().fields()[0];
        assert_eq!(rename.selection_set().unwrap().strategy(), ExecutionStrategy::Parallel);
    }

    #[test]
    fn query_root_is_parallel() {
        let schema = schema();
        let op = compile(&schema, "{ me { id } }").unwrap();
        assert_eq!(op.selection_set().strategy(), ExecutionStrategy::Parallel);
    }
}

mod incremental {
    use super::*;

    #[test]
    fn subscriptions_inline_defer_and_stream() {
        let schema = Schema::builder()
            .load_str(None, concat!(
                "type User { id: ID! name: String friends: [User!] }\n",
                "type Query { me: User }\n",
                "type Subscription { userChanged: User }\n",
            ))
            .unwrap()
            .build()
            .unwrap();
        let op = compile(&schema, concat!(
            "subscription { userChanged { id ... @defer { name } friends @stream { id } } }",
        )).unwrap();

        assert!(!op.has_incremental());
        let root = op.selection_set()
            .for_type(schema.type_id("Subscription").unwrap())
            .unwrap();
        let user = root.fields()[0]
            .selection_set()
            .unwrap()
            .for_type(schema.type_id("User").unwrap())
            .unwrap();
        assert_eq!(user.response_names().collect::<Vec<_>>(), vec!["id", "name", "friends"]);
        assert!(user.deferred().is_empty());
        let friends = user.fields().iter().find(|field| field.response_name() == "friends").unwrap();
        assert!(friends.stream().is_none());
    }

    #[test]
    fn deferred_fragment_is_split_out() {
        let schema = schema();
        let op = compile(&schema, concat!(
            "{ me { id ... @defer(label: \"slow\") { name } } }\n",
        )).unwrap();

        assert!(op.has_incremental());

        let root = op.selection_set().for_type(schema.query_type()).unwrap();
        let user = root.fields()[0]
            .selection_set()
            .unwrap()
            .for_type(schema.type_id("User").unwrap())
            .unwrap();
        assert_eq!(user.response_names().collect::<Vec<_>>(), vec!["id"]);
        assert_eq!(user.deferred().len(), 1);
        assert_eq!(user.deferred()[0].label(), Some("slow"));
    }

    #[test]
    fn disabled_defer_is_inlined() {
        let schema = schema();
        let op = compile(&schema, "{ me { id ... @defer(if: false) { name } } }").unwrap();

        assert!(!op.has_incremental());
        let root = op.selection_set().for_type(schema.query_type()).unwrap();
        let user = root.fields()[0]
            .selection_set()
            .unwrap()
            .for_type(schema.type_id("User").unwrap())
            .unwrap();
        assert_eq!(user.response_names().collect::<Vec<_>>(), vec!["id", "name"]);
        assert!(user.deferred().is_empty());
    }

    #[test]
    fn stream_applies_only_to_list_fields() {
        let schema = schema();
        let op = compile_with(
            &schema,
            "query($n: Int) { search @stream(initialCount: $n, label: \"s\") { __typename } me @stream { id } }",
            None,
            serde_json::json!({ "n": 2 }),
        ).unwrap();

        let root = op.selection_set().for_type(schema.query_type()).unwrap();
        let stream = root.fields()[0].stream().unwrap();
        assert_eq!(stream.initial_count(), 2);
        assert_eq!(stream.label(), Some("s"));
        assert!(root.fields()[1].stream().is_none());
        assert!(op.has_incremental());
    }

    #[test]
    fn directive_variables_are_collected_from_fragments_too() {
        let document = ast::operation::parse(concat!(
            "query($a: Boolean, $b: Boolean, $c: Int, $unused: ID) {\n",
            "  me @skip(if: $a) { ...F }\n",
            "  node(id: $unused) { id }\n",
            "}\n",
            "fragment F on User { name @include(if: $b) friends @stream(initialCount: $c) { id } }\n",
        )).unwrap();

        assert_eq!(directive_variable_names(&document), vec!["a", "b", "c"]);
    }
}

mod errors {
    use super::*;

    #[test]
    fn undefined_field_reports_parent_type() {
        let schema = schema();
        let errors = compile(&schema, "{ me { nope } }").unwrap_err();

        assert_eq!(errors.len(), 1);
        assert!(matches!(
            &errors[0],
            CompileError::UndefinedField { field, parent_type, .. }
                if field == "nope" && parent_type == "User"
        ));
        assert!(errors[0].location().is_some());
    }

    #[test]
    fn undefined_fragment() {
        let schema = schema();
        let errors = compile(&schema, "{ ...Missing }").unwrap_err();
        assert!(matches!(
            &errors[0],
            CompileError::UndefinedFragment { name, .. } if name == "Missing"
        ));
    }

    #[test]
    fn fragment_cycle_is_detected() {
        let schema = schema();
        let errors = compile(&schema, concat!(
            "{ me { ...A } }\n",
            "fragment A on User { friends { ...B } }\n",
            "fragment B on User { ...A }\n",
        )).unwrap_err();

        assert!(errors.iter().any(|err| matches!(
            err,
            CompileError::FragmentCycle { name, .. } if name == "A"
        )));
    }

    #[test]
    fn unknown_type_condition() {
        let schema = schema();
        let errors = compile(&schema, "{ me { ... on Ghost { id } } }").unwrap_err();
        assert!(matches!(
            &errors[0],
            CompileError::UndefinedType { name, .. } if name == "Ghost"
        ));
    }

    #[test]
    fn interface_without_implementors_has_no_possible_types() {
        let schema = Schema::builder()
            .load_str(None, "interface Lonely { id: ID } type Query { lonely: Lonely }")
            .unwrap()
            .build()
            .unwrap();
        let errors = compile(&schema, "{ lonely { id } }").unwrap_err();
        assert!(matches!(
            &errors[0],
            CompileError::NoPossibleTypes { type_name, .. } if type_name == "Lonely"
        ));
    }

    #[test]
    fn every_error_is_reported() {
        let schema = schema();
        let errors = compile(&schema, "{ a: nope me { alsoNope } }").unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
