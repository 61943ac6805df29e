use crate::ast;
use std::path::Path;
use std::path::PathBuf;

/// Very similar to graphql_parser's [Pos](graphql_parser::Pos), except it
/// includes an (optional) path to the file the position refers to.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FilePosition {
    pub col: usize,
    pub file: Option<PathBuf>,
    pub line: usize,
}
impl FilePosition {
    pub fn from_pos(file: Option<&Path>, pos: ast::Pos) -> Self {
        Self {
            col: pos.column,
            file: file.map(|f| f.to_path_buf()),
            line: pos.line,
        }
    }
}

/// Indicates where some type, field, or parameter was defined.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum SourceLocation {
    GraphQLBuiltIn,
    Schema(FilePosition),
}
impl SourceLocation {
    pub fn from_schema_ast_position(
        file_path: Option<&Path>,
        pos: &ast::Pos,
    ) -> Self {
        Self::Schema(FilePosition::from_pos(file_path, *pos))
    }

    pub fn file_position(&self) -> Option<&FilePosition> {
        match self {
            Self::GraphQLBuiltIn => None,
            Self::Schema(file_pos) => Some(file_pos),
        }
    }
}
