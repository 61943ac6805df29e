mod executable_schema_tests;
pub(crate) mod test_utils;
