//! Core abstractions for the workflow converter
//!
//! This crate provides the node model, edge and trigger-rule types, the
//! mapper contract, and the shared template/EL utilities that all other
//! components depend on.

pub mod el;
mod error;
mod mapper;
mod node;
mod relation;
pub mod templates;
mod trigger;
mod workflow;

pub use error::ConvertError;
pub use mapper::{ArchiveCollector, FileCollector, Mapper};
pub use node::{normalize_task_name, NodeMap, ParsedNode};
pub use relation::{Relation, RelationSet};
pub use trigger::TriggerRule;
pub use workflow::ParsedWorkflow;

/// Result type for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;
