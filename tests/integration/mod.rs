pub mod pipeline_integration;
