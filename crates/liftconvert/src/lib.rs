//! Conversion engine: workflow XML parsing, relation building,
//! trigger-rule resolution, and generated-program emission.
//!
//! The three phases run strictly in sequence: the parser owns the graph
//! while it is being built and hands it off read-only; the relation and
//! trigger passes are pure consumers returning their own results.

mod converter;
mod parser;
mod properties;
mod registry;
mod relations;
mod triggers;

pub use converter::{Converter, ConverterOptions};
pub use parser::WorkflowParser;
pub use properties::load_property_file;
pub use registry::{MapperFactory, MapperInput, MapperRegistry, UNKNOWN_ACTION};
pub use relations::build_relations;
pub use triggers::resolve_trigger_rules;
