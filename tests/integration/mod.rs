pub mod batch_integration;
pub mod pipeline_integration;
