// Type definitions for the masking pipeline

pub mod layout;

pub use layout::*;
