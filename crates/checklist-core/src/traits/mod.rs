//! Core traits for checklist collaborators.

mod completion;
mod reader;

pub use completion::*;
pub use reader::*;
