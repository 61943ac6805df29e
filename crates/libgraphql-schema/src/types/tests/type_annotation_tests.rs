use crate::types::TypeAnnotation;
use crate::types::TypeId;

fn int_annot(nullable: bool) -> TypeAnnotation {
    TypeAnnotation::named(TypeId(3), "Int", nullable)
}

#[test]
fn display_named_annotations() {
    assert_eq!(int_annot(true).to_string(), "Int");
    assert_eq!(int_annot(false).to_string(), "Int!");
}

#[test]
fn display_nested_list_annotations() {
    let annot = TypeAnnotation::list(
        TypeAnnotation::list(int_annot(false), true),
        false,
    );
    assert_eq!(annot.to_string(), "[[Int!]]!");
}

#[test]
fn innermost_type_of_list() {
    let annot = TypeAnnotation::list(int_annot(false), false);
    assert!(annot.is_list());
    assert_eq!(annot.innermost_type_id(), TypeId(3));
    assert_eq!(annot.innermost_named_type_annotation().type_name(), "Int");
    assert!(!annot.innermost_named_type_annotation().nullable());
}

#[test]
fn to_nullable_only_strips_outermost_wrapper() {
    let annot = TypeAnnotation::list(int_annot(false), false);
    let nullable = annot.to_nullable();
    assert!(nullable.nullable());
    assert_eq!(nullable.to_string(), "[Int!]");
    assert!(!nullable.as_list_annotation().unwrap().inner_type_annotation().nullable());
}

#[test]
fn as_annotation_accessors() {
    assert!(int_annot(true).as_named_annotation().is_some());
    assert!(int_annot(true).as_list_annotation().is_none());
    let list = TypeAnnotation::list(int_annot(true), true);
    assert!(list.as_named_annotation().is_none());
}
