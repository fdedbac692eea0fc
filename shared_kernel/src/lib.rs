pub mod configuration;
pub mod tracing;
