use crate::loc;
use crate::types::TypeId;

/// Represents a
/// [union type](https://spec.graphql.org/October2021/#sec-Unions) defined
/// within some [`Schema`](crate::Schema).
#[derive(Clone, Debug, PartialEq)]
pub struct UnionType {
    pub(crate) def_location: loc::SourceLocation,
    pub(crate) description: Option<String>,
    pub(crate) members: Vec<TypeId>,
    pub(crate) name: String,
}
impl UnionType {
    pub fn def_location(&self) -> &loc::SourceLocation {
        &self.def_location
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// An ordered list of the [`TypeId`]s of each member of this union.
    ///
    /// The order retains the order members were listed on the union type in
    /// the schema. Members added by a type extension are appended in the order
    /// they were specified on that extension.
    pub fn members(&self) -> &[TypeId] {
        self.members.as_slice()
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}
