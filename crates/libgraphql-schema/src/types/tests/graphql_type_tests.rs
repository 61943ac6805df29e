use crate::schema::SchemaBuilder;
use crate::schema::SchemaBuildError;
use crate::types::GraphQLTypeKind;

type Result<T> = std::result::Result<T, SchemaBuildError>;

const SCHEMA: &str = concat!(
    "scalar DateTime\n",
    "enum Color { RED }\n",
    "input Filter { color: Color }\n",
    "interface Node { id: ID! }\n",
    "type Thing implements Node { id: ID!, at: DateTime }\n",
    "union Any = Thing\n",
    "type Query { node: Node, any: Any, things(filter: Filter): [Thing] }\n",
);

#[test]
fn type_classification() -> Result<()> {
    let schema = SchemaBuilder::from_str(None, SCHEMA)?;
    let get = |name: &str| schema.type_by_name(name).unwrap();

    for leaf in ["Boolean", "Color", "DateTime", "Float", "ID", "Int", "String"] {
        assert!(get(leaf).is_leaf(), "{leaf} should be a leaf");
        assert!(get(leaf).is_input_type());
        assert!(get(leaf).is_output_type());
    }

    assert!(get("Filter").is_input_type());
    assert!(!get("Filter").is_output_type());

    assert!(get("Node").is_abstract());
    assert!(get("Any").is_abstract());
    assert!(!get("Thing").is_abstract());
    assert!(get("Thing").is_composite());
    assert!(!get("Thing").is_input_type());

    Ok(())
}

#[test]
fn type_kind_and_name() -> Result<()> {
    let schema = SchemaBuilder::from_str(None, SCHEMA)?;

    let thing = schema.type_by_name("Thing").unwrap();
    assert_eq!(thing.type_kind(), GraphQLTypeKind::Object);
    assert_eq!(thing.type_kind().to_string(), "Object");
    assert_eq!(schema.type_by_name("Boolean").unwrap().type_kind(), GraphQLTypeKind::Bool);
    assert_eq!(schema.type_by_name("DateTime").unwrap().name(), "DateTime");

    Ok(())
}

#[test]
fn fields_only_exist_on_objects_and_interfaces() -> Result<()> {
    let schema = SchemaBuilder::from_str(None, SCHEMA)?;

    assert!(schema.type_by_name("Thing").unwrap().fields().is_some());
    assert!(schema.type_by_name("Node").unwrap().fields().is_some());
    assert!(schema.type_by_name("Any").unwrap().fields().is_none());
    assert!(schema.type_by_name("Filter").unwrap().fields().is_none());

    Ok(())
}
