//! Core types for checklist extraction.

mod block;
mod form;
mod item;
mod message;

pub use block::*;
pub use form::*;
pub use item::*;
pub use message::*;
