//! Core data types shared across the framework.

pub mod context;
pub mod definition;
pub mod unit;

pub use context::{LoadContext, LoadKind};
pub use definition::{Definition, DefinitionTable, EntryFactory};
pub use unit::UnitName;
