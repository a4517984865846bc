// Type definitions for the anonymization engine

pub mod result;
pub mod text_match;

pub use result::*;
pub use text_match::*;
