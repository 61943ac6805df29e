use crate::loc;
use crate::types::Field;
use crate::types::TypeId;
use indexmap::IndexMap;
use inherent::inherent;

/// Accessors shared by [`ObjectType`] and [`InterfaceType`].
pub trait ObjectOrInterfaceTypeTrait {
    fn def_location(&self) -> &loc::SourceLocation;
    fn description(&self) -> Option<&str>;
    fn field(&self, name: &str) -> Option<&Field>;
    fn fields(&self) -> &IndexMap<String, Field>;
    fn interfaces(&self) -> &[TypeId];
    fn name(&self) -> &str;
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ObjectOrInterfaceTypeData {
    pub(crate) def_location: loc::SourceLocation,
    pub(crate) description: Option<String>,
    pub(crate) fields: IndexMap<String, Field>,
    pub(crate) interfaces: Vec<TypeId>,
    pub(crate) name: String,
}

#[inherent]
impl ObjectOrInterfaceTypeTrait for ObjectOrInterfaceTypeData {
    pub fn def_location(&self) -> &loc::SourceLocation {
        &self.def_location
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Fields in the order they were defined (type extensions append).
    pub fn fields(&self) -> &IndexMap<String, Field> {
        &self.fields
    }

    pub fn interfaces(&self) -> &[TypeId] {
        self.interfaces.as_slice()
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

/// Represents an
/// [object type](https://spec.graphql.org/October2021/#sec-Objects) defined
/// within some [`Schema`](crate::Schema).
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectType(pub(crate) ObjectOrInterfaceTypeData);

#[inherent]
impl ObjectOrInterfaceTypeTrait for ObjectType {
    pub fn def_location(&self) -> &loc::SourceLocation {
        self.0.def_location()
    }

    pub fn description(&self) -> Option<&str> {
        self.0.description()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.0.field(name)
    }

    pub fn fields(&self) -> &IndexMap<String, Field> {
        self.0.fields()
    }

    /// The [`TypeId`]s of the interfaces this object declares it implements.
    pub fn interfaces(&self) -> &[TypeId] {
        self.0.interfaces()
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }
}

/// Represents an
/// [interface type](https://spec.graphql.org/October2021/#sec-Interfaces)
/// defined within some [`Schema`](crate::Schema).
#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceType(pub(crate) ObjectOrInterfaceTypeData);

#[inherent]
impl ObjectOrInterfaceTypeTrait for InterfaceType {
    pub fn def_location(&self) -> &loc::SourceLocation {
        self.0.def_location()
    }

    pub fn description(&self) -> Option<&str> {
        self.0.description()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.0.field(name)
    }

    pub fn fields(&self) -> &IndexMap<String, Field> {
        self.0.fields()
    }

    pub fn interfaces(&self) -> &[TypeId] {
        self.0.interfaces()
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }
}
