mod operation_cache_tests;
mod operation_compiler_tests;
