mod compile_error;
mod compiled_operation;
mod directives;
mod operation_cache;
mod operation_compiler;

pub use compile_error::CompileError;
pub use compiled_operation::CompiledField;
pub use compiled_operation::CompiledOperation;
pub use compiled_operation::CompiledSelectionSet;
pub use compiled_operation::DeferredFragment;
pub use compiled_operation::ExecutionStrategy;
pub use compiled_operation::FieldKind;
pub use compiled_operation::StreamDirective;
pub use compiled_operation::TypedSelections;
pub use directives::directive_variable_names;
pub use operation_cache::CompileOutcome;
pub use operation_cache::OperationCache;
pub use operation_cache::OperationCacheKey;
pub use operation_compiler::OperationCompiler;
pub use operation_compiler::select_operation;

#[cfg(test)]
mod tests;
