use crate::ast;
use crate::file_reader;
use crate::loc;
use crate::OperationKind;
use crate::schema::Schema;
use crate::types::EnumType;
use crate::types::EnumValue;
use crate::types::Field;
use crate::types::GraphQLType;
use crate::types::GraphQLTypeKind;
use crate::types::InputObjectType;
use crate::types::InterfaceType;
use crate::types::ObjectOrInterfaceTypeData;
use crate::types::ObjectType;
use crate::types::Parameter;
use crate::types::ScalarType;
use crate::types::TypeId;
use crate::types::TypesMapBuilder;
use crate::types::UnionType;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

type Result<T> = std::result::Result<T, SchemaBuildError>;

const BUILTIN_DIRECTIVE_NAMES: [&str; 6] = [
    "defer",
    "deprecated",
    "include",
    "skip",
    "specifiedBy",
    "stream",
];

#[derive(Debug)]
struct PendingTypeDef {
    file_path: Option<PathBuf>,
    type_def: ast::schema::TypeDefinition,
    type_id: TypeId,
}

#[derive(Debug)]
struct PendingTypeExtension {
    file_path: Option<PathBuf>,
    type_ext: ast::schema::TypeExtension,
}

#[derive(Clone, Debug)]
struct RootOperationDef {
    def_location: loc::SourceLocation,
    type_name: String,
}

/// Utility for building a [`Schema`].
///
/// Type-system documents may be loaded in any number of chunks (strings or
/// files). Type names are reserved as soon as they are seen so that types may
/// refer to one another in any order; all cross-type checks happen in
/// [`SchemaBuilder::build()`].
#[derive(Debug)]
pub struct SchemaBuilder {
    directive_defs: IndexMap<String, loc::SourceLocation>,
    mutation_type: Option<RootOperationDef>,
    pending_extensions: Vec<PendingTypeExtension>,
    pending_types: Vec<PendingTypeDef>,
    query_type: Option<RootOperationDef>,
    subscription_type: Option<RootOperationDef>,
    types_map_builder: TypesMapBuilder,
}
impl SchemaBuilder {
    pub fn build(mut self) -> Result<Schema> {
        for pending in std::mem::take(&mut self.pending_types) {
            let type_ = self.build_type(pending.file_path.as_deref(), pending.type_def)?;
            self.types_map_builder.set(pending.type_id, type_);
        }

        for pending in std::mem::take(&mut self.pending_extensions) {
            self.apply_type_extension(pending.file_path.as_deref(), pending.type_ext)?;
        }

        self.validate_types()?;

        let query_type = self.resolve_root_type(OperationKind::Query)?
            .ok_or(SchemaBuildError::NoQueryOperationTypeDefined)?;
        let mutation_type = self.resolve_root_type(OperationKind::Mutation)?;
        let subscription_type = self.resolve_root_type(OperationKind::Subscription)?;

        let possible_types = self.compute_possible_types();
        let (types, type_ids) = self.types_map_builder.into_arena();

        Ok(Schema {
            directive_names: self.directive_defs.into_keys().collect(),
            mutation_type,
            possible_types,
            query_type,
            subscription_type,
            type_ids,
            types,
        })
    }

    /// Load a single file and build a [`Schema`] from it.
    pub fn from_file(file_path: impl AsRef<Path>) -> Result<Schema> {
        Self::new().load_file(file_path)?.build()
    }

    pub fn from_files(file_paths: Vec<impl AsRef<Path>>) -> Result<Schema> {
        Self::new().load_files(file_paths)?.build()
    }

    /// Build a [`Schema`] from a single in-memory type-system document.
    pub fn from_str(file_path: Option<&Path>, content: &str) -> Result<Schema> {
        Self::new().load_str(file_path, content)?.build()
    }

    pub fn new() -> Self {
        Self {
            directive_defs: IndexMap::new(),
            mutation_type: None,
            pending_extensions: vec![],
            pending_types: vec![],
            query_type: None,
            subscription_type: None,
            types_map_builder: TypesMapBuilder::new(),
        }
    }

    pub fn load_file(self, file_path: impl AsRef<Path>) -> Result<Self> {
        self.load_files(vec![file_path])
    }

    pub fn load_files(mut self, file_paths: Vec<impl AsRef<Path>>) -> Result<Self> {
        for file_path in file_paths {
            let file_path = file_path.as_ref();
            let file_content = file_reader::read_schema_file(file_path)
                .map_err(|err| SchemaBuildError::SchemaFileReadError(
                    Box::new(err),
                ))?;
            self = self.load_str(Some(file_path), file_content.as_str())?;
        }
        Ok(self)
    }

    pub fn load_str(mut self, file_path: Option<&Path>, content: &str) -> Result<Self> {
        let ast_doc = ast::schema::parse(content)
            .map_err(|err| SchemaBuildError::ParseError {
                file: file_path.map(|p| p.to_path_buf()),
                err: err.to_string(),
            })?;

        for def in ast_doc.definitions {
            self.visit_ast_def(file_path, def)?;
        }

        Ok(self)
    }

    fn apply_type_extension(
        &mut self,
        file_path: Option<&Path>,
        type_ext: ast::schema::TypeExtension,
    ) -> Result<()> {
        use ast::schema::TypeExtension;
        let (name, position) = match &type_ext {
            TypeExtension::Enum(ext) => (ext.name.as_str(), ext.position),
            TypeExtension::InputObject(ext) => (ext.name.as_str(), ext.position),
            TypeExtension::Interface(ext) => (ext.name.as_str(), ext.position),
            TypeExtension::Object(ext) => (ext.name.as_str(), ext.position),
            TypeExtension::Scalar(ext) => (ext.name.as_str(), ext.position),
            TypeExtension::Union(ext) => (ext.name.as_str(), ext.position),
        };
        let name = name.to_string();
        let ext_loc = loc::SourceLocation::from_schema_ast_position(file_path, &position);
        let type_id = self.types_map_builder.lookup(&name).ok_or_else(|| {
            SchemaBuildError::ExtensionOfUndefinedType {
                extension_location: ext_loc.clone(),
                type_name: name.clone(),
            }
        })?;

        let existing_kind = self.type_at(type_id).type_kind();
        let invalid_extension = || SchemaBuildError::InvalidExtensionType {
            extension_location: ext_loc.clone(),
            type_kind: existing_kind,
            type_name: name.clone(),
        };

        match type_ext {
            TypeExtension::Enum(ext) => {
                let mut values = match self.types_map_builder.get(type_id) {
                    Some(GraphQLType::Enum(enum_type)) => enum_type.values.clone(),
                    _ => return Err(invalid_extension()),
                };
                Self::add_enum_values(file_path, &ext.name, &mut values, ext.values)?;
                if let Some(GraphQLType::Enum(enum_type)) = self.types_map_builder.get_mut(type_id) {
                    enum_type.values = values;
                }
            },

            TypeExtension::InputObject(ext) => {
                if !matches!(self.type_at(type_id), GraphQLType::InputObject(_)) {
                    return Err(invalid_extension());
                }
                let new_fields = self.build_parameters(file_path, &ext.name, ext.fields)?;
                if let Some(GraphQLType::InputObject(input_type)) = self.types_map_builder.get_mut(type_id) {
                    for (field_name, field) in new_fields {
                        if let Some(existing) = input_type.fields.get(&field_name) {
                            return Err(SchemaBuildError::DuplicateFieldDefinition {
                                field_def1: existing.def_location.clone(),
                                field_def2: field.def_location.clone(),
                                field_name,
                                type_name: ext.name,
                            });
                        }
                        input_type.fields.insert(field_name, field);
                    }
                }
            },

            TypeExtension::Interface(ext) => {
                if !matches!(self.type_at(type_id), GraphQLType::Interface(_)) {
                    return Err(invalid_extension());
                }
                let fields = self.build_fields(file_path, &ext.name, ext.fields)?;
                let interfaces = self.resolve_interfaces(&ext_loc, &ext.implements_interfaces)?;
                if let Some(GraphQLType::Interface(iface)) = self.types_map_builder.get_mut(type_id) {
                    Self::extend_object_or_interface(&mut iface.0, fields, interfaces)?;
                }
            },

            TypeExtension::Object(ext) => {
                if !matches!(self.type_at(type_id), GraphQLType::Object(_)) {
                    return Err(invalid_extension());
                }
                let fields = self.build_fields(file_path, &ext.name, ext.fields)?;
                let interfaces = self.resolve_interfaces(&ext_loc, &ext.implements_interfaces)?;
                if let Some(GraphQLType::Object(obj)) = self.types_map_builder.get_mut(type_id) {
                    Self::extend_object_or_interface(&mut obj.0, fields, interfaces)?;
                }
            },

            // Scalar extensions may only add directives, which are not
            // tracked on types.
            TypeExtension::Scalar(_) => {
                if !matches!(self.type_at(type_id), GraphQLType::Scalar(_)) {
                    return Err(invalid_extension());
                }
            },

            TypeExtension::Union(ext) => {
                if !matches!(self.type_at(type_id), GraphQLType::Union(_)) {
                    return Err(invalid_extension());
                }
                let new_members = self.resolve_union_members(&ext_loc, &ext.name, &ext.types)?;
                if let Some(GraphQLType::Union(union_type)) = self.types_map_builder.get_mut(type_id) {
                    for member in new_members {
                        if union_type.members.contains(&member) {
                            return Err(SchemaBuildError::DuplicateUnionMember {
                                location: ext_loc.clone(),
                                member_type_id: member,
                                type_name: ext.name,
                            });
                        }
                        union_type.members.push(member);
                    }
                }
            },
        }

        Ok(())
    }

    fn add_enum_values(
        file_path: Option<&Path>,
        enum_name: &str,
        values: &mut IndexMap<String, EnumValue>,
        ast_values: Vec<ast::schema::EnumValue>,
    ) -> Result<()> {
        for ast_value in ast_values {
            let def_location = loc::SourceLocation::from_schema_ast_position(
                file_path,
                &ast_value.position,
            );
            if let Some(existing) = values.get(&ast_value.name) {
                return Err(SchemaBuildError::DuplicateEnumValueDefinition {
                    enum_name: enum_name.to_string(),
                    value_def1: existing.def_location.clone(),
                    value_def2: def_location,
                    value_name: ast_value.name,
                });
            }
            values.insert(ast_value.name.clone(), EnumValue {
                def_location,
                description: ast_value.description,
                name: ast_value.name,
            });
        }
        Ok(())
    }

    fn build_fields(
        &self,
        file_path: Option<&Path>,
        type_name: &str,
        ast_fields: Vec<ast::schema::Field>,
    ) -> Result<IndexMap<String, Field>> {
        let mut fields = IndexMap::<String, Field>::new();
        for ast_field in ast_fields {
            let def_location = loc::SourceLocation::from_schema_ast_position(
                file_path,
                &ast_field.position,
            );
            if ast_field.name.starts_with("__") {
                return Err(SchemaBuildError::InvalidDunderPrefixedFieldName {
                    def_location,
                    field_name: ast_field.name,
                    type_name: type_name.to_string(),
                });
            }
            if let Some(existing) = fields.get(&ast_field.name) {
                return Err(SchemaBuildError::DuplicateFieldDefinition {
                    field_def1: existing.def_location.clone(),
                    field_def2: def_location,
                    field_name: ast_field.name,
                    type_name: type_name.to_string(),
                });
            }

            let type_annotation = self.types_map_builder.annotation_from_ast(
                &ast_field.field_type,
                &def_location,
            )?;
            let parameters = self.build_parameters(
                file_path,
                type_name,
                ast_field.arguments,
            )?;
            fields.insert(ast_field.name.clone(), Field {
                def_location,
                description: ast_field.description,
                name: ast_field.name,
                parameters,
                type_annotation,
            });
        }
        Ok(fields)
    }

    fn build_parameters(
        &self,
        file_path: Option<&Path>,
        owner_name: &str,
        input_values: Vec<ast::schema::InputValue>,
    ) -> Result<IndexMap<String, Parameter>> {
        let mut params = IndexMap::<String, Parameter>::new();
        for input_value in input_values {
            let def_location = loc::SourceLocation::from_schema_ast_position(
                file_path,
                &input_value.position,
            );
            if let Some(existing) = params.get(&input_value.name) {
                return Err(SchemaBuildError::DuplicateParameterDefinition {
                    owner_name: owner_name.to_string(),
                    param_def1: existing.def_location.clone(),
                    param_def2: def_location,
                    param_name: input_value.name,
                });
            }
            let type_annotation = self.types_map_builder.annotation_from_ast(
                &input_value.value_type,
                &def_location,
            )?;
            params.insert(input_value.name.clone(), Parameter {
                def_location,
                default_value: input_value.default_value,
                description: input_value.description,
                name: input_value.name,
                type_annotation,
            });
        }
        Ok(params)
    }

    fn build_type(
        &self,
        file_path: Option<&Path>,
        type_def: ast::schema::TypeDefinition,
    ) -> Result<GraphQLType> {
        use ast::schema::TypeDefinition;
        Ok(match type_def {
            TypeDefinition::Enum(def) => {
                let mut values = IndexMap::new();
                Self::add_enum_values(file_path, &def.name, &mut values, def.values)?;
                GraphQLType::Enum(EnumType {
                    def_location: loc::SourceLocation::from_schema_ast_position(
                        file_path,
                        &def.position,
                    ),
                    description: def.description,
                    name: def.name,
                    values,
                })
            },

            TypeDefinition::InputObject(def) => GraphQLType::InputObject(InputObjectType {
                def_location: loc::SourceLocation::from_schema_ast_position(
                    file_path,
                    &def.position,
                ),
                description: def.description,
                fields: self.build_parameters(file_path, &def.name, def.fields)?,
                name: def.name,
            }),

            TypeDefinition::Interface(def) => {
                let def_location = loc::SourceLocation::from_schema_ast_position(
                    file_path,
                    &def.position,
                );
                let interfaces = self.resolve_interfaces(&def_location, &def.implements_interfaces)?;
                GraphQLType::Interface(InterfaceType(ObjectOrInterfaceTypeData {
                    fields: self.build_fields(file_path, &def.name, def.fields)?,
                    def_location,
                    description: def.description,
                    interfaces,
                    name: def.name,
                }))
            },

            TypeDefinition::Object(def) => {
                let def_location = loc::SourceLocation::from_schema_ast_position(
                    file_path,
                    &def.position,
                );
                let interfaces = self.resolve_interfaces(&def_location, &def.implements_interfaces)?;
                GraphQLType::Object(ObjectType(ObjectOrInterfaceTypeData {
                    fields: self.build_fields(file_path, &def.name, def.fields)?,
                    def_location,
                    description: def.description,
                    interfaces,
                    name: def.name,
                }))
            },

            TypeDefinition::Scalar(def) => GraphQLType::Scalar(ScalarType {
                def_location: loc::SourceLocation::from_schema_ast_position(
                    file_path,
                    &def.position,
                ),
                description: def.description,
                name: def.name,
            }),

            TypeDefinition::Union(def) => {
                let def_location = loc::SourceLocation::from_schema_ast_position(
                    file_path,
                    &def.position,
                );
                let members = self.resolve_union_members(&def_location, &def.name, &def.types)?;
                GraphQLType::Union(UnionType {
                    def_location,
                    description: def.description,
                    members,
                    name: def.name,
                })
            },
        })
    }

    fn compute_possible_types(&self) -> HashMap<TypeId, Vec<TypeId>> {
        let mut possible_types = HashMap::<TypeId, Vec<TypeId>>::new();
        for type_id in self.types_map_builder.type_ids() {
            match self.type_at(type_id) {
                GraphQLType::Interface(_) => {
                    possible_types.entry(type_id).or_default();
                },

                GraphQLType::Object(obj) => {
                    possible_types.insert(type_id, vec![type_id]);
                    for iface_id in obj.interfaces() {
                        let implementors = possible_types.entry(*iface_id).or_default();
                        if !implementors.contains(&type_id) {
                            implementors.push(type_id);
                        }
                    }
                },

                GraphQLType::Union(union_type) => {
                    possible_types.insert(type_id, union_type.members().to_vec());
                },

                _ => (),
            }
        }
        possible_types
    }

    fn extend_object_or_interface(
        data: &mut ObjectOrInterfaceTypeData,
        fields: IndexMap<String, Field>,
        interfaces: Vec<TypeId>,
    ) -> Result<()> {
        for (field_name, field) in fields {
            if let Some(existing) = data.fields.get(&field_name) {
                return Err(SchemaBuildError::DuplicateFieldDefinition {
                    field_def1: existing.def_location.clone(),
                    field_def2: field.def_location.clone(),
                    field_name,
                    type_name: data.name.clone(),
                });
            }
            data.fields.insert(field_name, field);
        }
        for iface_id in interfaces {
            if !data.interfaces.contains(&iface_id) {
                data.interfaces.push(iface_id);
            }
        }
        Ok(())
    }

    fn resolve_interfaces(
        &self,
        ref_location: &loc::SourceLocation,
        interface_names: &[String],
    ) -> Result<Vec<TypeId>> {
        let mut interfaces = vec![];
        for iface_name in interface_names {
            let iface_id = self.types_map_builder.require(iface_name, ref_location)?;
            if !interfaces.contains(&iface_id) {
                interfaces.push(iface_id);
            }
        }
        Ok(interfaces)
    }

    fn resolve_root_type(&self, kind: OperationKind) -> Result<Option<TypeId>> {
        let explicit = match kind {
            OperationKind::Mutation => self.mutation_type.as_ref(),
            OperationKind::Query => self.query_type.as_ref(),
            OperationKind::Subscription => self.subscription_type.as_ref(),
        };

        let Some(root_def) = explicit else {
            let default_name = match kind {
                OperationKind::Mutation => "Mutation",
                OperationKind::Query => "Query",
                OperationKind::Subscription => "Subscription",
            };
            return Ok(self.types_map_builder.lookup(default_name).filter(
                |type_id| matches!(self.type_at(*type_id), GraphQLType::Object(_)),
            ));
        };

        let type_id = self.types_map_builder.require(
            &root_def.type_name,
            &root_def.def_location,
        )?;
        if !matches!(self.type_at(type_id), GraphQLType::Object(_)) {
            return Err(SchemaBuildError::InvalidRootOperationType {
                def_location: root_def.def_location.clone(),
                operation: kind,
                type_name: root_def.type_name.clone(),
            });
        }
        Ok(Some(type_id))
    }

    fn resolve_union_members(
        &self,
        ref_location: &loc::SourceLocation,
        union_name: &str,
        member_names: &[String],
    ) -> Result<Vec<TypeId>> {
        let mut members = vec![];
        for member_name in member_names {
            let member_id = self.types_map_builder.require(member_name, ref_location)?;
            if members.contains(&member_id) {
                return Err(SchemaBuildError::DuplicateUnionMember {
                    location: ref_location.clone(),
                    member_type_id: member_id,
                    type_name: union_name.to_string(),
                });
            }
            members.push(member_id);
        }
        Ok(members)
    }

    /// Types that were reserved but not yet built are only ever looked up
    /// after `build()` has filled every slot.
    fn type_at(&self, type_id: TypeId) -> &GraphQLType {
        static PLACEHOLDER: GraphQLType = GraphQLType::String;
        self.types_map_builder.get(type_id).unwrap_or(&PLACEHOLDER)
    }

    fn validate_types(&self) -> Result<()> {
        for type_id in self.types_map_builder.type_ids() {
            match self.type_at(type_id) {
                GraphQLType::InputObject(input_type) => {
                    for param in input_type.fields().values() {
                        self.validate_input_annotation(input_type.name(), param)?;
                    }
                },

                GraphQLType::Interface(iface) =>
                    self.validate_object_or_interface(&iface.0)?,

                GraphQLType::Object(obj) =>
                    self.validate_object_or_interface(&obj.0)?,

                GraphQLType::Union(union_type) => {
                    for member_id in union_type.members() {
                        let member = self.type_at(*member_id);
                        if !matches!(member, GraphQLType::Object(_)) {
                            return Err(SchemaBuildError::InvalidUnionMember {
                                location: union_type.def_location().clone(),
                                member_name: member.name().to_string(),
                                type_name: union_type.name().to_string(),
                            });
                        }
                    }
                },

                _ => (),
            }
        }
        Ok(())
    }

    fn validate_input_annotation(&self, owner_name: &str, param: &Parameter) -> Result<()> {
        let inner_type = self.type_at(param.type_annotation().innermost_type_id());
        if !inner_type.is_input_type() {
            return Err(SchemaBuildError::InvalidInputType {
                def_location: param.def_location().clone(),
                owner_name: owner_name.to_string(),
                param_name: param.name().to_string(),
                type_name: inner_type.name().to_string(),
            });
        }
        Ok(())
    }

    fn validate_object_or_interface(&self, data: &ObjectOrInterfaceTypeData) -> Result<()> {
        for field in data.fields.values() {
            let inner_type = self.type_at(field.type_annotation().innermost_type_id());
            if !inner_type.is_output_type() {
                return Err(SchemaBuildError::InvalidOutputFieldType {
                    def_location: field.def_location().clone(),
                    field_name: field.name().to_string(),
                    type_name: data.name.clone(),
                });
            }
            for param in field.parameters().values() {
                self.validate_input_annotation(
                    &format!("{}.{}", data.name, field.name()),
                    param,
                )?;
            }
        }

        for iface_id in &data.interfaces {
            let GraphQLType::Interface(iface) = self.type_at(*iface_id) else {
                return Err(SchemaBuildError::InvalidImplementedType {
                    def_location: data.def_location.clone(),
                    implemented_name: self.type_at(*iface_id).name().to_string(),
                    type_name: data.name.clone(),
                });
            };
            for iface_field_name in iface.fields().keys() {
                if !data.fields.contains_key(iface_field_name) {
                    return Err(SchemaBuildError::MissingInterfaceField {
                        def_location: data.def_location.clone(),
                        field_name: iface_field_name.clone(),
                        interface_name: iface.name().to_string(),
                        type_name: data.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn visit_ast_def(
        &mut self,
        file_path: Option<&Path>,
        def: ast::schema::Definition,
    ) -> Result<()> {
        use ast::schema::Definition;
        match def {
            Definition::DirectiveDefinition(directive_def) =>
                self.visit_ast_directive_def(file_path, directive_def),
            Definition::SchemaDefinition(schema_def) =>
                self.visit_ast_schemablock_def(file_path, schema_def),
            Definition::TypeDefinition(type_def) =>
                self.visit_ast_type_def(file_path, type_def),
            Definition::TypeExtension(type_ext) => {
                self.pending_extensions.push(PendingTypeExtension {
                    file_path: file_path.map(|p| p.to_path_buf()),
                    type_ext,
                });
                Ok(())
            },
        }
    }

    fn visit_ast_directive_def(
        &mut self,
        file_path: Option<&Path>,
        def: ast::schema::DirectiveDefinition,
    ) -> Result<()> {
        let location = loc::SourceLocation::from_schema_ast_position(
            file_path,
            &def.position,
        );

        if BUILTIN_DIRECTIVE_NAMES.contains(&def.name.as_str()) {
            return Err(SchemaBuildError::RedefinitionOfBuiltinDirective {
                directive_name: def.name,
                location,
            });
        }

        if let Some(existing) = self.directive_defs.get(&def.name) {
            return Err(SchemaBuildError::DuplicateDirectiveDefinition {
                directive_name: def.name,
                location1: existing.clone(),
                location2: location,
            });
        }

        self.directive_defs.insert(def.name, location);
        Ok(())
    }

    fn visit_ast_schemablock_def(
        &mut self,
        file_path: Option<&Path>,
        schema_def: ast::schema::SchemaDefinition,
    ) -> Result<()> {
        let def_location = loc::SourceLocation::from_schema_ast_position(
            file_path,
            &schema_def.position,
        );
        let roots = [
            (OperationKind::Query, schema_def.query),
            (OperationKind::Mutation, schema_def.mutation),
            (OperationKind::Subscription, schema_def.subscription),
        ];
        for (kind, type_name) in roots {
            let Some(type_name) = type_name else {
                continue;
            };
            let slot = match kind {
                OperationKind::Mutation => &mut self.mutation_type,
                OperationKind::Query => &mut self.query_type,
                OperationKind::Subscription => &mut self.subscription_type,
            };
            if let Some(existing) = slot {
                return Err(SchemaBuildError::DuplicateOperationDefinition {
                    location1: existing.def_location.clone(),
                    location2: def_location,
                    operation: kind,
                });
            }
            *slot = Some(RootOperationDef {
                def_location: def_location.clone(),
                type_name,
            });
        }
        Ok(())
    }

    fn visit_ast_type_def(
        &mut self,
        file_path: Option<&Path>,
        type_def: ast::schema::TypeDefinition,
    ) -> Result<()> {
        use ast::schema::TypeDefinition;
        let (name, position) = match &type_def {
            TypeDefinition::Enum(def) => (def.name.as_str(), def.position),
            TypeDefinition::InputObject(def) => (def.name.as_str(), def.position),
            TypeDefinition::Interface(def) => (def.name.as_str(), def.position),
            TypeDefinition::Object(def) => (def.name.as_str(), def.position),
            TypeDefinition::Scalar(def) => (def.name.as_str(), def.position),
            TypeDefinition::Union(def) => (def.name.as_str(), def.position),
        };
        let type_loc = loc::SourceLocation::from_schema_ast_position(file_path, &position);
        let type_id = self.types_map_builder.reserve(name, &type_loc)?;
        self.pending_types.push(PendingTypeDef {
            file_path: file_path.map(|p| p.to_path_buf()),
            type_def,
            type_id,
        });
        Ok(())
    }
}
impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SchemaBuildError {
    #[error("Multiple directives were defined with the name `@{directive_name}`")]
    DuplicateDirectiveDefinition {
        directive_name: String,
        location1: loc::SourceLocation,
        location2: loc::SourceLocation,
    },

    #[error("The `{enum_name}` enum defines the `{value_name}` value more than once")]
    DuplicateEnumValueDefinition {
        enum_name: String,
        value_def1: loc::SourceLocation,
        value_def2: loc::SourceLocation,
        value_name: String,
    },

    #[error("The `{type_name}` type defines the `{field_name}` field more than once")]
    DuplicateFieldDefinition {
        field_def1: loc::SourceLocation,
        field_def2: loc::SourceLocation,
        field_name: String,
        type_name: String,
    },

    #[error("The {operation} root operation type was declared more than once")]
    DuplicateOperationDefinition {
        location1: loc::SourceLocation,
        location2: loc::SourceLocation,
        operation: OperationKind,
    },

    #[error("`{owner_name}` defines the `{param_name}` parameter more than once")]
    DuplicateParameterDefinition {
        owner_name: String,
        param_def1: loc::SourceLocation,
        param_def2: loc::SourceLocation,
        param_name: String,
    },

    #[error("Multiple GraphQL types were defined with the name `{type_name}`")]
    DuplicateTypeDefinition {
        type_name: String,
        def1: loc::SourceLocation,
        def2: loc::SourceLocation,
    },

    #[error("The `{type_name}` union lists the same member type more than once")]
    DuplicateUnionMember {
        location: loc::SourceLocation,
        member_type_id: TypeId,
        type_name: String,
    },

    #[error("Attempted to extend `{type_name}`, which is not defined elsewhere")]
    ExtensionOfUndefinedType {
        extension_location: loc::SourceLocation,
        type_name: String,
    },

    #[error("Field names must not start with `__`: `{type_name}.{field_name}`")]
    InvalidDunderPrefixedFieldName {
        def_location: loc::SourceLocation,
        field_name: String,
        type_name: String,
    },

    #[error("Type names must not start with `__`: `{type_name}`")]
    InvalidDunderPrefixedTypeName {
        def_location: loc::SourceLocation,
        type_name: String,
    },

    #[error("Attempted to extend the {type_kind} type `{type_name}` with a different kind of extension")]
    InvalidExtensionType {
        extension_location: loc::SourceLocation,
        type_kind: GraphQLTypeKind,
        type_name: String,
    },

    #[error("`{type_name}` declares that it implements `{implemented_name}`, which is not an interface")]
    InvalidImplementedType {
        def_location: loc::SourceLocation,
        implemented_name: String,
        type_name: String,
    },

    #[error("The `{owner_name}.{param_name}` input has non-input type `{type_name}`")]
    InvalidInputType {
        def_location: loc::SourceLocation,
        owner_name: String,
        param_name: String,
        type_name: String,
    },

    #[error("The `{type_name}.{field_name}` field does not have an output type")]
    InvalidOutputFieldType {
        def_location: loc::SourceLocation,
        field_name: String,
        type_name: String,
    },

    #[error("The {operation} root operation type `{type_name}` must be an object type")]
    InvalidRootOperationType {
        def_location: loc::SourceLocation,
        operation: OperationKind,
        type_name: String,
    },

    #[error("The `{type_name}` union lists `{member_name}`, which is not an object type")]
    InvalidUnionMember {
        location: loc::SourceLocation,
        member_name: String,
        type_name: String,
    },

    #[error(
        "`{type_name}` implements `{interface_name}` but does not define its \
        `{field_name}` field"
    )]
    MissingInterfaceField {
        def_location: loc::SourceLocation,
        field_name: String,
        interface_name: String,
        type_name: String,
    },

    #[error("Attempted to build a schema that has no Query operation type defined")]
    NoQueryOperationTypeDefined,

    #[error("Error parsing schema document: {err}")]
    ParseError {
        file: Option<PathBuf>,
        err: String,
    },

    #[error("Attempted to redefine the builtin `@{directive_name}` directive")]
    RedefinitionOfBuiltinDirective {
        directive_name: String,
        location: loc::SourceLocation,
    },

    #[error("Failure while trying to read a schema file from disk")]
    SchemaFileReadError(Box<file_reader::SchemaFileError>),

    #[error("Reference to undefined type `{type_name}`")]
    UndefinedType {
        location: loc::SourceLocation,
        type_name: String,
    },
}
