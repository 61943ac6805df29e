use crate::types::TypeId;

/// Represents the annotated type for a [`Field`](crate::types::Field) or a
/// [`Parameter`](crate::types::Parameter).
///
/// Named annotations refer to their type by [`TypeId`] (and carry the type's
/// name so that an annotation can be displayed without a schema at hand).
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum TypeAnnotation {
    List(ListTypeAnnotation),
    Named(NamedTypeAnnotation),
}
impl TypeAnnotation {
    /// Unwrap the [`ListTypeAnnotation`] if this annotation is one.
    pub fn as_list_annotation(&self) -> Option<&ListTypeAnnotation> {
        if let Self::List(annot) = self {
            Some(annot)
        } else {
            None
        }
    }

    /// Unwrap the [`NamedTypeAnnotation`] if this annotation is one.
    pub fn as_named_annotation(&self) -> Option<&NamedTypeAnnotation> {
        if let Self::Named(annot) = self {
            Some(annot)
        } else {
            None
        }
    }

    /// Recursively unwrap this [`TypeAnnotation`] and return the inner-most
    /// [`NamedTypeAnnotation`] from it.
    pub fn innermost_named_type_annotation(&self) -> &NamedTypeAnnotation {
        match self {
            Self::List(ListTypeAnnotation { inner, .. })
                => inner.innermost_named_type_annotation(),
            Self::Named(named_annot)
                => named_annot,
        }
    }

    pub fn innermost_type_id(&self) -> TypeId {
        self.innermost_named_type_annotation().type_id
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Build a list annotation wrapping `inner`.
    pub fn list(inner: TypeAnnotation, nullable: bool) -> Self {
        Self::List(ListTypeAnnotation {
            inner: Box::new(inner),
            nullable,
        })
    }

    /// Build a named annotation. `type_name` must be the name of the type
    /// `type_id` refers to.
    pub fn named(
        type_id: TypeId,
        type_name: impl Into<String>,
        nullable: bool,
    ) -> Self {
        Self::Named(NamedTypeAnnotation {
            nullable,
            type_id,
            type_name: type_name.into(),
        })
    }

    /// Indicates if this [`TypeAnnotation`] is [nullable or
    /// non-nullable](https://spec.graphql.org/October2021/#sec-Non-Null).
    pub fn nullable(&self) -> bool {
        match self {
            Self::List(ListTypeAnnotation { nullable, .. }) => *nullable,
            Self::Named(NamedTypeAnnotation { nullable, .. }) => *nullable,
        }
    }

    /// A copy of this annotation with the outermost non-null wrapper removed.
    pub fn to_nullable(&self) -> Self {
        match self {
            Self::List(list_annot) => Self::List(ListTypeAnnotation {
                nullable: true,
                ..list_annot.clone()
            }),
            Self::Named(named_annot) => Self::Named(NamedTypeAnnotation {
                nullable: true,
                ..named_annot.clone()
            }),
        }
    }
}
impl std::convert::From<ListTypeAnnotation> for TypeAnnotation {
    fn from(value: ListTypeAnnotation) -> Self {
        Self::List(value)
    }
}
impl std::convert::From<NamedTypeAnnotation> for TypeAnnotation {
    fn from(value: NamedTypeAnnotation) -> Self {
        Self::Named(value)
    }
}
impl std::fmt::Display for TypeAnnotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::List(list_annot) => write!(
                f,
                "[{}]{}",
                list_annot.inner,
                if list_annot.nullable { "" } else { "!" },
            ),

            Self::Named(named_annot) => write!(
                f,
                "{}{}",
                named_annot.type_name,
                if named_annot.nullable { "" } else { "!" },
            ),
        }
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ListTypeAnnotation {
    pub(crate) inner: Box<TypeAnnotation>,
    pub(crate) nullable: bool,
}
impl ListTypeAnnotation {
    pub fn inner_type_annotation(&self) -> &TypeAnnotation {
        &self.inner
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct NamedTypeAnnotation {
    pub(crate) nullable: bool,
    pub(crate) type_id: TypeId,
    pub(crate) type_name: String,
}
impl NamedTypeAnnotation {
    pub fn nullable(&self) -> bool {
        self.nullable
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &str {
        self.type_name.as_str()
    }
}
