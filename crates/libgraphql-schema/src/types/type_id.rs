/// Stable index of a [`GraphQLType`](crate::types::GraphQLType) within the
/// type arena of the [`Schema`](crate::Schema) that allocated it.
///
/// Types refer to one another (fields to their return types, unions to their
/// members, objects to their interfaces) exclusively through `TypeId`s. This
/// lets cyclic type graphs live in a flat `Vec` without any self-references.
///
/// A `TypeId` is only meaningful for the schema that produced it.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TypeId(pub(crate) u32);
impl TypeId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}
impl std::fmt::Display for TypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
