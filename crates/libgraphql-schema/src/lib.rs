pub mod ast;
pub mod file_reader;
pub mod loc;
mod operation_kind;
pub mod schema;
pub mod types;

pub use operation_kind::OperationKind;
pub use schema::Schema;
pub use schema::SchemaBuilder;
pub use schema::SchemaBuildError;
