use crate::error::ConvertError;
use crate::mapper::Mapper;
use std::collections::HashMap;

/// Replace characters that are not valid in a task identifier.
///
/// Must be applied to every name at parse time, both where nodes are
/// declared and where they are referenced, so that lookups always agree.
pub fn normalize_task_name(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// One parsed control-flow vertex, bound to its translation mapper.
///
/// Built exactly once by the parser and read-only afterwards; trigger
/// classification lives in a separate annotation map, not on the node.
pub struct ParsedNode {
    name: String,
    mapper: Box<dyn Mapper>,
    downstream_names: Vec<String>,
    error_name: Option<String>,
}

impl ParsedNode {
    pub fn new(mapper: Box<dyn Mapper>) -> Self {
        Self {
            name: mapper.name().to_string(),
            mapper,
            downstream_names: Vec::new(),
            error_name: None,
        }
    }

    pub fn add_downstream_node_name(&mut self, name: impl Into<String>) {
        self.downstream_names.push(name.into());
    }

    pub fn set_error_node_name(&mut self, name: impl Into<String>) {
        self.error_name = Some(name.into());
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mapper(&self) -> &dyn Mapper {
        self.mapper.as_ref()
    }

    pub fn downstream_names(&self) -> &[String] {
        &self.downstream_names
    }

    pub fn error_name(&self) -> Option<&str> {
        self.error_name.as_deref()
    }

    /// First primitive unit of this node; inbound edges resolve here.
    pub fn first_task_id(&self) -> String {
        self.mapper.first_task_id()
    }

    /// Last primitive unit of this node; outbound edges resolve here.
    pub fn last_task_id(&self) -> String {
        self.mapper.last_task_id()
    }
}

impl std::fmt::Debug for ParsedNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedNode")
            .field("name", &self.name)
            .field("mapper_type", &self.mapper.mapper_type())
            .field("downstream_names", &self.downstream_names)
            .field("error_name", &self.error_name)
            .finish()
    }
}

/// Insertion-ordered node map.
///
/// Iteration follows insertion order so the emitted program reads in the
/// same order as the source workflow; correctness never depends on it.
/// Duplicate names are rejected rather than overwritten, since a silent
/// overwrite would corrupt relation resolution.
#[derive(Debug, Default)]
pub struct NodeMap {
    order: Vec<String>,
    index: HashMap<String, ParsedNode>,
}

impl NodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: ParsedNode) -> Result<(), ConvertError> {
        let name = node.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ConvertError::DuplicateName(name));
        }
        self.order.push(name.clone());
        self.index.insert(name, node);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ParsedNode> {
        self.index.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParsedNode> {
        self.order.iter().filter_map(|name| self.index.get(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
