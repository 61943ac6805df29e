use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Read a schema file from disk as UTF-8 text.
pub fn read_schema_file(file_path: &Path) -> Result<String, SchemaFileError> {
    if !file_path.is_file() {
        return Err(SchemaFileError::NotAFile(file_path.to_path_buf()));
    }

    std::fs::read_to_string(file_path).map_err(|err| match err.kind() {
        ErrorKind::InvalidData => SchemaFileError::NotUtf8(file_path.to_path_buf()),
        kind => SchemaFileError::Io {
            file_path: file_path.to_path_buf(),
            kind,
            message: err.to_string(),
        },
    })
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum SchemaFileError {
    #[error("Unable to read schema file at {file_path:?}: {message}")]
    Io {
        file_path: PathBuf,
        kind: ErrorKind,
        message: String,
    },

    #[error("Path is not a file: {0:?}")]
    NotAFile(PathBuf),

    #[error("Schema file at {0:?} is not valid UTF-8")]
    NotUtf8(PathBuf),
}
