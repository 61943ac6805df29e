use crate::ast;
use crate::loc;
use crate::schema::SchemaBuildError;
use crate::types::GraphQLType;
use crate::types::TypeAnnotation;
use crate::types::TypeId;
use std::collections::HashMap;

type Result<T> = std::result::Result<T, SchemaBuildError>;

const BUILTIN_SCALARS: [(&str, GraphQLType); 5] = [
    ("Boolean", GraphQLType::Bool),
    ("Float", GraphQLType::Float),
    ("ID", GraphQLType::ID),
    ("Int", GraphQLType::Int),
    ("String", GraphQLType::String),
];

/// Allocates the type arena for a [`Schema`](crate::Schema).
///
/// Names are reserved first (so that every type can refer to every other type
/// by [`TypeId`] regardless of definition order) and filled in afterwards.
#[derive(Debug)]
pub(crate) struct TypesMapBuilder {
    def_locations: Vec<loc::SourceLocation>,
    type_ids: HashMap<String, TypeId>,
    types: Vec<Option<GraphQLType>>,
}
impl TypesMapBuilder {
    pub fn new() -> Self {
        let mut builder = Self {
            def_locations: vec![],
            type_ids: HashMap::new(),
            types: vec![],
        };
        for (name, type_) in BUILTIN_SCALARS {
            let type_id = TypeId(builder.types.len() as u32);
            builder.def_locations.push(loc::SourceLocation::GraphQLBuiltIn);
            builder.type_ids.insert(name.to_string(), type_id);
            builder.types.push(Some(type_));
        }
        builder
    }

    /// Convert an AST type reference into a [`TypeAnnotation`], resolving each
    /// named type against the reserved names.
    pub fn annotation_from_ast(
        &self,
        ast_type: &ast::schema::Type,
        ref_location: &loc::SourceLocation,
    ) -> Result<TypeAnnotation> {
        self.annotation_from_ast_impl(ast_type, ref_location, /* nullable = */ true)
    }

    fn annotation_from_ast_impl(
        &self,
        ast_type: &ast::schema::Type,
        ref_location: &loc::SourceLocation,
        nullable: bool,
    ) -> Result<TypeAnnotation> {
        Ok(match ast_type {
            ast::schema::Type::ListType(inner) => TypeAnnotation::list(
                self.annotation_from_ast_impl(inner, ref_location, true)?,
                nullable,
            ),

            ast::schema::Type::NamedType(name) => TypeAnnotation::named(
                self.require(name, ref_location)?,
                name.as_str(),
                nullable,
            ),

            ast::schema::Type::NonNullType(inner) =>
                self.annotation_from_ast_impl(inner, ref_location, false)?,
        })
    }

    pub fn get(&self, type_id: TypeId) -> Option<&GraphQLType> {
        self.types.get(type_id.index()).and_then(|t| t.as_ref())
    }

    pub fn get_mut(&mut self, type_id: TypeId) -> Option<&mut GraphQLType> {
        self.types.get_mut(type_id.index()).and_then(|t| t.as_mut())
    }

    /// Hand back the finished arena. Every reserved slot must have been
    /// filled by now.
    pub fn into_arena(self) -> (Vec<GraphQLType>, HashMap<String, TypeId>) {
        let types = self.types
            .into_iter()
            .enumerate()
            .map(|(idx, type_)| type_.unwrap_or_else(
                || panic!("type slot #{idx} was reserved but never defined"),
            ))
            .collect();
        (types, self.type_ids)
    }

    pub fn lookup(&self, type_name: &str) -> Option<TypeId> {
        self.type_ids.get(type_name).copied()
    }

    pub fn require(
        &self,
        type_name: &str,
        ref_location: &loc::SourceLocation,
    ) -> Result<TypeId> {
        self.lookup(type_name).ok_or_else(|| SchemaBuildError::UndefinedType {
            location: ref_location.to_owned(),
            type_name: type_name.to_string(),
        })
    }

    pub fn reserve(
        &mut self,
        type_name: &str,
        type_loc: &loc::SourceLocation,
    ) -> Result<TypeId> {
        if type_name.starts_with("__") {
            return Err(SchemaBuildError::InvalidDunderPrefixedTypeName {
                def_location: type_loc.to_owned(),
                type_name: type_name.to_string(),
            });
        }

        if let Some(conflicting_id) = self.type_ids.get(type_name) {
            return Err(SchemaBuildError::DuplicateTypeDefinition {
                type_name: type_name.to_string(),
                def1: self.def_locations[conflicting_id.index()].to_owned(),
                def2: type_loc.to_owned(),
            });
        }

        let type_id = TypeId(self.types.len() as u32);
        self.def_locations.push(type_loc.to_owned());
        self.type_ids.insert(type_name.to_string(), type_id);
        self.types.push(None);
        Ok(type_id)
    }

    pub fn set(&mut self, type_id: TypeId, type_: GraphQLType) {
        self.types[type_id.index()] = Some(type_);
    }

    pub fn type_ids(&self) -> impl Iterator<Item = TypeId> {
        (0..self.types.len()).map(|idx| TypeId(idx as u32))
    }
}
