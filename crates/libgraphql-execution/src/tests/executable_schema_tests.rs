use crate::ExecutableSchemaBuildError;
use crate::FieldValue;
use crate::Middleware;
use crate::tests::test_utils::builder;

const SDL: &str = concat!(
    "interface Node { id: ID! }\n",
    "type User implements Node { id: ID! }\n",
    "union Anything = User\n",
    "scalar Url\n",
    "type Query { me: User }\n",
);

type Result<T> = std::result::Result<T, ExecutableSchemaBuildError>;

#[test]
fn resolvers_are_registered_by_type_and_field() -> Result<()> {
    let schema = builder(SDL)
        .sync_resolver("Query", "me", |_| Ok(FieldValue::Null))
        .build()?;

    let query_type = schema.schema().query_type();
    let user_type = schema.schema().type_id("User").unwrap();
    assert!(schema.resolver(query_type, "me").is_some());
    assert!(schema.resolver(user_type, "id").is_none());

    Ok(())
}

#[test]
fn resolver_for_unknown_type_is_rejected() {
    let err = builder(SDL)
        .sync_resolver("Nope", "me", |_| Ok(FieldValue::Null))
        .build()
        .unwrap_err();

    assert_eq!(err, ExecutableSchemaBuildError::UndefinedType {
        type_name: "Nope".to_string(),
    });
}

#[test]
fn resolver_for_unknown_field_is_rejected() {
    let err = builder(SDL)
        .sync_resolver("Query", "you", |_| Ok(FieldValue::Null))
        .build()
        .unwrap_err();

    assert_eq!(err, ExecutableSchemaBuildError::UndefinedField {
        field_name: "you".to_string(),
        type_name: "Query".to_string(),
    });
}

#[test]
fn resolver_on_interface_is_rejected() {
    let err = builder(SDL)
        .sync_resolver("Node", "id", |_| Ok(FieldValue::Null))
        .build()
        .unwrap_err();

    assert_eq!(err, ExecutableSchemaBuildError::NonObjectFieldOwner {
        type_name: "Node".to_string(),
    });
}

#[test]
fn field_middleware_on_unknown_field_is_rejected() {
    let err = builder(SDL)
        .field_middleware("User", "email", Middleware::pre_resolve("auth", |_| Ok(())))
        .build()
        .unwrap_err();

    assert!(matches!(err, ExecutableSchemaBuildError::UndefinedField { .. }));
}

#[test]
fn type_resolver_requires_abstract_type() -> Result<()> {
    builder(SDL)
        .type_resolver("Node", |_| Some("User".to_string()))
        .type_resolver("Anything", |_| Some("User".to_string()))
        .build()?;

    let err = builder(SDL)
        .type_resolver("User", |_| None)
        .build()
        .unwrap_err();
    assert_eq!(err, ExecutableSchemaBuildError::NonAbstractTypeResolver {
        type_name: "User".to_string(),
    });

    Ok(())
}

#[test]
fn scalar_serializer_requires_custom_scalar() -> Result<()> {
    let schema = builder(SDL)
        .scalar_serializer("Url", |value| Ok(value.clone()))
        .build()?;
    let url_type = schema.schema().type_id("Url").unwrap();
    assert!(schema.scalar_serializer(url_type).is_some());

    let err = builder(SDL)
        .scalar_serializer("Int", |value| Ok(value.clone()))
        .build()
        .unwrap_err();
    assert_eq!(err, ExecutableSchemaBuildError::NonScalarSerializer {
        type_name: "Int".to_string(),
    });

    Ok(())
}

#[test]
fn middleware_for_lists_schema_wide_then_field_specific() -> Result<()> {
    let schema = builder(SDL)
        .field_middleware("Query", "me", Middleware::pre_resolve("field", |_| Ok(())))
        .middleware(Middleware::pre_resolve("global-1", |_| Ok(())))
        .middleware(Middleware::post_resolve("global-2", |_, value| Ok(value)))
        .build()?;

    let query_type = schema.schema().query_type();
    let names = schema.middleware_for(query_type, "me")
        .map(|middleware| middleware.name())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["global-1", "global-2", "field"]);

    let user_type = schema.schema().type_id("User").unwrap();
    assert_eq!(schema.middleware_for(user_type, "id").count(), 2);

    Ok(())
}

#[test]
fn every_build_gets_a_distinct_schema_id() -> Result<()> {
    let first = builder(SDL).build()?;
    let second = builder(SDL).build()?;

    assert_ne!(first.schema_id(), second.schema_id());

    Ok(())
}
