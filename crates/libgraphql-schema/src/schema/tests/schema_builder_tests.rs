use crate::loc;
use crate::schema::SchemaBuilder;
use crate::schema::SchemaBuildError;
use crate::types::GraphQLType;
use crate::types::GraphQLTypeKind;
use crate::types::ObjectOrInterfaceTypeTrait;
use crate::OperationKind;
use std::path::Path;

type Result<T> = std::result::Result<T, SchemaBuildError>;

mod build_operations {
    use super::*;

    #[test]
    fn build_all_empty_operation_types_single_str() -> Result<()> {
        let schema = SchemaBuilder::from_str(None, concat!(
            "type Mutation\n",
            "type Query\n",
            "type Subscription",
        ))?;

        let mutation_type = schema.get(schema.mutation_type().unwrap());
        let mutation_obj = mutation_type.as_object().unwrap();
        assert_eq!(mutation_obj.name(), "Mutation");
        assert!(mutation_obj.fields().is_empty());
        assert_eq!(
            mutation_obj.def_location(),
            &loc::SourceLocation::Schema(loc::FilePosition {
                col: 1,
                file: None,
                line: 1,
            }),
        );

        let query_type = schema.get(schema.query_type());
        assert_eq!(query_type.name(), "Query");

        let subscription_type = schema.get(schema.subscription_type().unwrap());
        assert_eq!(subscription_type.name(), "Subscription");

        Ok(())
    }

    #[test]
    fn build_empty_query_type_str() -> Result<()> {
        let schema = SchemaBuilder::from_str(None, "type Query")?;

        assert!(schema.mutation_type().is_none());
        assert!(schema.subscription_type().is_none());
        assert_eq!(schema.defined_types().count(), 1);
        // Five builtin scalars plus `Query`
        assert_eq!(schema.types().count(), 6);

        Ok(())
    }

    #[test]
    fn schema_block_overrides_default_root_names() -> Result<()> {
        let schema = SchemaBuilder::from_str(None, concat!(
            "schema { query: RootQuery, mutation: RootMutation }\n",
            "type RootQuery { a: Int }\n",
            "type RootMutation { b: Int }\n",
            "type Query { ignored: Int }\n",
        ))?;

        assert_eq!(schema.get(schema.query_type()).name(), "RootQuery");
        assert_eq!(
            schema.operation_type(OperationKind::Mutation).map(|id| schema.get(id).name()),
            Some("RootMutation"),
        );
        assert!(schema.operation_type(OperationKind::Subscription).is_none());

        Ok(())
    }

    #[test]
    fn missing_query_type_is_an_error() {
        let result = SchemaBuilder::from_str(None, "type Mutation { a: Int }");
        assert_eq!(result.unwrap_err(), SchemaBuildError::NoQueryOperationTypeDefined);
    }

    #[test]
    fn non_object_root_type_is_an_error() {
        let result = SchemaBuilder::from_str(None, concat!(
            "schema { query: Q }\n",
            "interface Q { a: Int }\n",
        ));
        assert!(matches!(
            result,
            Err(SchemaBuildError::InvalidRootOperationType {
                operation: OperationKind::Query,
                ..
            }),
        ));
    }

    #[test]
    fn duplicate_schema_block_root_is_an_error() {
        let result = SchemaBuilder::new()
            .load_str(None, "schema { query: Query }\ntype Query { a: Int }")
            .and_then(|builder| builder.load_str(None, "schema { query: Query }"));
        assert!(matches!(
            result,
            Err(SchemaBuildError::DuplicateOperationDefinition {
                operation: OperationKind::Query,
                ..
            }),
        ));
    }
}

mod build_types {
    use super::*;

    #[test]
    fn types_may_reference_types_defined_later() -> Result<()> {
        let schema = SchemaBuilder::from_str(None, concat!(
            "type Query { me: User, friends(first: Int = 10): [User!]! }\n",
            "type User { id: ID!, name: String }\n",
        ))?;

        let query = schema.get(schema.query_type()).as_object().unwrap();
        let friends = query.field("friends").unwrap();
        assert_eq!(friends.type_annotation().to_string(), "[User!]!");
        assert_eq!(
            friends.type_annotation().innermost_type_id(),
            schema.type_id("User").unwrap(),
        );

        let first_param = friends.parameters().get("first").unwrap();
        assert_eq!(first_param.type_annotation().to_string(), "Int");
        assert!(first_param.default_value().is_some());

        Ok(())
    }

    #[test]
    fn fields_retain_definition_order() -> Result<()> {
        let schema = SchemaBuilder::from_str(None, "type Query { c: Int, a: Int, b: Int }")?;

        let query = schema.get(schema.query_type()).as_object().unwrap();
        let names: Vec<&str> = query.fields().keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);

        Ok(())
    }

    #[test]
    fn undefined_type_reference_is_an_error() {
        let result = SchemaBuilder::from_str(None, "type Query { a: Missing }");
        assert!(matches!(
            result,
            Err(SchemaBuildError::UndefinedType { type_name, .. }) if type_name == "Missing",
        ));
    }

    #[test]
    fn duplicate_type_definition_is_an_error() {
        let result = SchemaBuilder::from_str(None, concat!(
            "type Query { a: Int }\n",
            "type Query { b: Int }\n",
        ));
        assert!(matches!(
            result,
            Err(SchemaBuildError::DuplicateTypeDefinition { type_name, .. }) if type_name == "Query",
        ));
    }

    #[test]
    fn redefining_builtin_scalar_is_an_error() {
        let result = SchemaBuilder::from_str(None, "scalar Int\ntype Query { a: Int }");
        assert!(matches!(
            result,
            Err(SchemaBuildError::DuplicateTypeDefinition { type_name, .. }) if type_name == "Int",
        ));
    }

    #[test]
    fn dunder_type_name_is_an_error() {
        let result = SchemaBuilder::from_str(None, "type __Foo { a: Int }\ntype Query { a: Int }");
        assert!(matches!(
            result,
            Err(SchemaBuildError::InvalidDunderPrefixedTypeName { .. }),
        ));
    }

    #[test]
    fn duplicate_field_definition_is_an_error() {
        let result = SchemaBuilder::from_str(None, "type Query { a: Int, a: String }");
        assert!(matches!(
            result,
            Err(SchemaBuildError::DuplicateFieldDefinition { field_name, .. }) if field_name == "a",
        ));
    }

    #[test]
    fn input_object_as_output_type_is_an_error() {
        let result = SchemaBuilder::from_str(None, concat!(
            "input Filter { a: Int }\n",
            "type Query { a: Filter }\n",
        ));
        assert!(matches!(result, Err(SchemaBuildError::InvalidOutputFieldType { .. })));
    }

    #[test]
    fn object_as_argument_type_is_an_error() {
        let result = SchemaBuilder::from_str(None, concat!(
            "type Thing { a: Int }\n",
            "type Query { a(thing: Thing): Int }\n",
        ));
        assert!(matches!(result, Err(SchemaBuildError::InvalidInputType { .. })));
    }

    #[test]
    fn enum_values_are_recorded() -> Result<()> {
        let schema = SchemaBuilder::from_str(None, concat!(
            "enum Color { RED GREEN BLUE }\n",
            "type Query { color: Color }\n",
        ))?;

        let color = schema.type_by_name("Color").unwrap().as_enum().unwrap();
        assert!(color.has_value("GREEN"));
        assert!(!color.has_value("PURPLE"));
        assert_eq!(color.values().len(), 3);

        Ok(())
    }

    #[test]
    fn duplicate_enum_value_is_an_error() {
        let result = SchemaBuilder::from_str(None, concat!(
            "enum Color { RED RED }\n",
            "type Query { color: Color }\n",
        ));
        assert!(matches!(result, Err(SchemaBuildError::DuplicateEnumValueDefinition { .. })));
    }
}

mod abstract_types {
    use super::*;

    const PETS_SCHEMA: &str = concat!(
        "interface Named { name: String }\n",
        "type Dog implements Named { name: String, barks: Boolean }\n",
        "type Cat implements Named { name: String, meows: Boolean }\n",
        "type Rock { weight: Float }\n",
        "union Pet = Dog | Cat\n",
        "type Query { pets: [Pet], named: [Named] }\n",
    );

    #[test]
    fn possible_types_of_union_are_its_members() -> Result<()> {
        let schema = SchemaBuilder::from_str(None, PETS_SCHEMA)?;

        let pet = schema.type_id("Pet").unwrap();
        let dog = schema.type_id("Dog").unwrap();
        let cat = schema.type_id("Cat").unwrap();
        let rock = schema.type_id("Rock").unwrap();
        assert_eq!(schema.possible_types(pet), &[dog, cat]);
        assert!(schema.is_possible_type(pet, cat));
        assert!(!schema.is_possible_type(pet, rock));

        Ok(())
    }

    #[test]
    fn possible_types_of_interface_are_its_implementors() -> Result<()> {
        let schema = SchemaBuilder::from_str(None, PETS_SCHEMA)?;

        let named = schema.type_id("Named").unwrap();
        let dog = schema.type_id("Dog").unwrap();
        let cat = schema.type_id("Cat").unwrap();
        assert_eq!(schema.possible_types(named), &[dog, cat]);

        Ok(())
    }

    #[test]
    fn object_is_a_possible_type_of_itself() -> Result<()> {
        let schema = SchemaBuilder::from_str(None, PETS_SCHEMA)?;

        let rock = schema.type_id("Rock").unwrap();
        assert_eq!(schema.possible_types(rock), &[rock]);
        assert!(schema.possible_types(schema.type_id("String").unwrap()).is_empty());

        Ok(())
    }

    #[test]
    fn union_of_non_object_is_an_error() {
        let result = SchemaBuilder::from_str(None, concat!(
            "interface Named { name: String }\n",
            "union Bad = Named\n",
            "type Query { bad: Bad }\n",
        ));
        assert!(matches!(result, Err(SchemaBuildError::InvalidUnionMember { .. })));
    }

    #[test]
    fn duplicate_union_member_is_an_error() {
        let result = SchemaBuilder::from_str(None, concat!(
            "type A { a: Int }\n",
            "union U = A | A\n",
            "type Query { u: U }\n",
        ));
        assert!(matches!(result, Err(SchemaBuildError::DuplicateUnionMember { .. })));
    }

    #[test]
    fn missing_interface_field_is_an_error() {
        let result = SchemaBuilder::from_str(None, concat!(
            "interface Named { name: String }\n",
            "type Dog implements Named { barks: Boolean }\n",
            "type Query { dog: Dog }\n",
        ));
        assert!(matches!(
            result,
            Err(SchemaBuildError::MissingInterfaceField { field_name, .. }) if field_name == "name",
        ));
    }

    #[test]
    fn implementing_non_interface_is_an_error() {
        let result = SchemaBuilder::from_str(None, concat!(
            "type Base { a: Int }\n",
            "type Dog implements Base { a: Int }\n",
            "type Query { dog: Dog }\n",
        ));
        assert!(matches!(result, Err(SchemaBuildError::InvalidImplementedType { .. })));
    }
}

mod type_extensions {
    use super::*;

    #[test]
    fn object_extension_appends_fields() -> Result<()> {
        let schema = SchemaBuilder::new()
            .load_str(None, "extend type Query { b: String }")?
            .load_str(None, "type Query { a: Int }")?
            .build()?;

        let query = schema.get(schema.query_type()).as_object().unwrap();
        let names: Vec<&str> = query.fields().keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);

        Ok(())
    }

    #[test]
    fn union_extension_appends_members() -> Result<()> {
        let schema = SchemaBuilder::from_str(None, concat!(
            "type A { a: Int }\n",
            "type B { b: Int }\n",
            "union U = A\n",
            "extend union U = B\n",
            "type Query { u: U }\n",
        ))?;

        let union_type = schema.type_by_name("U").unwrap().as_union().unwrap();
        assert_eq!(
            union_type.members(),
            &[schema.type_id("A").unwrap(), schema.type_id("B").unwrap()],
        );

        Ok(())
    }

    #[test]
    fn enum_extension_appends_values() -> Result<()> {
        let schema = SchemaBuilder::from_str(None, concat!(
            "enum Color { RED }\n",
            "extend enum Color { GREEN }\n",
            "type Query { c: Color }\n",
        ))?;

        let color = schema.type_by_name("Color").unwrap().as_enum().unwrap();
        assert!(color.has_value("RED"));
        assert!(color.has_value("GREEN"));

        Ok(())
    }

    #[test]
    fn extension_of_undefined_type_is_an_error() {
        let result = SchemaBuilder::from_str(None, concat!(
            "extend type Missing { a: Int }\n",
            "type Query { a: Int }\n",
        ));
        assert!(matches!(result, Err(SchemaBuildError::ExtensionOfUndefinedType { .. })));
    }

    #[test]
    fn extension_with_wrong_kind_is_an_error() {
        let result = SchemaBuilder::from_str(None, concat!(
            "enum Color { RED }\n",
            "extend type Color { a: Int }\n",
            "type Query { a: Int }\n",
        ));
        assert!(matches!(
            result,
            Err(SchemaBuildError::InvalidExtensionType {
                type_kind: GraphQLTypeKind::Enum,
                ..
            }),
        ));
    }
}

mod directives {
    use super::*;

    #[test]
    fn custom_directives_are_recorded() -> Result<()> {
        let schema = SchemaBuilder::from_str(None, concat!(
            "directive @auth(role: String) on FIELD_DEFINITION\n",
            "type Query { a: Int }\n",
        ))?;

        assert_eq!(schema.defined_directives(), &["auth".to_string()]);

        Ok(())
    }

    #[test]
    fn redefining_builtin_directive_is_an_error() {
        let result = SchemaBuilder::from_str(None, concat!(
            "directive @skip(if: Boolean!) on FIELD\n",
            "type Query { a: Int }\n",
        ));
        assert!(matches!(
            result,
            Err(SchemaBuildError::RedefinitionOfBuiltinDirective { directive_name, .. })
                if directive_name == "skip",
        ));
    }
}

mod load_errors {
    use super::*;

    #[test]
    fn parse_error_carries_file_path() {
        let result = SchemaBuilder::from_str(Some(Path::new("broken.graphql")), "type Query {");
        assert!(matches!(
            result,
            Err(SchemaBuildError::ParseError { file: Some(file), .. })
                if file == Path::new("broken.graphql"),
        ));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let result = SchemaBuilder::from_file("/this/path/does/not/exist.graphql");
        assert!(matches!(result, Err(SchemaBuildError::SchemaFileReadError(_))));
    }

    #[test]
    fn builtin_scalars_are_not_defined_types() -> Result<()> {
        let schema = SchemaBuilder::from_str(None, "type Query { a: Int }")?;

        assert!(matches!(schema.type_by_name("Int"), Some(GraphQLType::Int)));
        assert!(matches!(schema.type_by_name("Boolean"), Some(GraphQLType::Bool)));
        assert!(schema.defined_types().all(|(_, t)| t.name() != "Int"));

        Ok(())
    }
}
