pub mod errors;
pub mod test_utils;
pub mod tracing;
