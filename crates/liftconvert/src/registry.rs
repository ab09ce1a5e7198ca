use liftcore::{ConvertError, Mapper};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Everything a factory needs to build a mapper for one source node.
pub struct MapperInput<'a, 'input: 'a> {
    /// The element the mapper translates: the action sub-element for
    /// action nodes (e.g. `<ssh>`), the control element itself otherwise.
    pub element: roxmltree::Node<'a, 'input>,
    /// Normalized task name the mapper is bound to.
    pub name: String,
    pub dag_name: &'a str,
    pub params: &'a HashMap<String, String>,
    pub input_directory: &'a Path,
    pub output_directory: &'a Path,
}

impl MapperInput<'_, '_> {
    /// Trimmed text of the first child element with the given tag.
    pub fn child_text(&self, tag: &str) -> Option<String> {
        self.element
            .children()
            .find(|n| n.is_element() && n.tag_name().name() == tag)
            .and_then(|n| n.text())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }

    /// Trimmed texts of all child elements with the given tag.
    pub fn child_texts(&self, tag: &str) -> Vec<String> {
        self.element
            .children()
            .filter(|n| n.is_element() && n.tag_name().name() == tag)
            .filter_map(|n| n.text())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Like `child_text`, with expression-language references resolved
    /// against the job parameters.
    pub fn resolved_child_text(&self, tag: &str) -> Option<String> {
        self.child_text(tag)
            .map(|t| liftcore::el::replace_el_with_var(&t, self.params))
    }

    /// Like `child_texts`, with expression-language references resolved.
    pub fn resolved_child_texts(&self, tag: &str) -> Vec<String> {
        self.child_texts(tag)
            .into_iter()
            .map(|t| liftcore::el::replace_el_with_var(&t, self.params))
            .collect()
    }

    /// Mandatory variant of `resolved_child_text`.
    pub fn require_child_text(&self, tag: &str) -> Result<String, ConvertError> {
        self.resolved_child_text(tag)
            .ok_or_else(|| ConvertError::MissingChild {
                node: self.name.clone(),
                child: tag.to_string(),
            })
    }
}

/// Factory trait for creating mapper instances
pub trait MapperFactory: Send + Sync {
    /// Create a mapper bound to the given source element.
    fn create(&self, input: &MapperInput<'_, '_>) -> Result<Box<dyn Mapper>, ConvertError>;

    /// Tag this factory handles.
    fn mapper_type(&self) -> &str;

    /// Capability query: nodes of this type may expand into a
    /// preparation pre-step. Returns the pre-step mapper when the source
    /// element actually carries preparation work, `None` otherwise.
    fn prepare_step(
        &self,
        _input: &MapperInput<'_, '_>,
    ) -> Result<Option<Box<dyn Mapper>>, ConvertError> {
        Ok(None)
    }
}

/// Tag registered for the mandatory action fallback mapper.
pub const UNKNOWN_ACTION: &str = "unknown";

/// Registry of available mapper types.
///
/// Two independent maps: a fixed control-node registry (start, end,
/// kill, fork, join, decision) and an extensible action registry. The
/// action registry must contain an `"unknown"` entry; unrecognized
/// action sub-types degrade to it instead of failing the conversion.
pub struct MapperRegistry {
    control: HashMap<String, Arc<dyn MapperFactory>>,
    action: HashMap<String, Arc<dyn MapperFactory>>,
}

impl MapperRegistry {
    pub fn new() -> Self {
        Self {
            control: HashMap::new(),
            action: HashMap::new(),
        }
    }

    /// Register a control-node factory under a fixed role tag.
    pub fn register_control(&mut self, tag: &str, factory: Arc<dyn MapperFactory>) {
        tracing::debug!(tag, "registering control mapper");
        self.control.insert(tag.to_string(), factory);
    }

    /// Register an action factory under its sub-type tag.
    pub fn register_action(&mut self, factory: Arc<dyn MapperFactory>) {
        let tag = factory.mapper_type().to_string();
        tracing::debug!(tag = %tag, "registering action mapper");
        self.action.insert(tag, factory);
    }

    /// Look up a control factory; control tags are a closed set, so a
    /// miss is a configuration error.
    pub fn control(&self, tag: &str) -> Result<&Arc<dyn MapperFactory>, ConvertError> {
        self.control
            .get(tag)
            .ok_or_else(|| ConvertError::UnknownControlType(tag.to_string()))
    }

    /// Look up an action factory, degrading to the `"unknown"` fallback
    /// for unrecognized sub-types.
    pub fn action(&self, tag: &str) -> Result<&Arc<dyn MapperFactory>, ConvertError> {
        if let Some(factory) = self.action.get(tag) {
            return Ok(factory);
        }
        tracing::warn!(tag, "no mapper for action type, using fallback");
        self.action
            .get(UNKNOWN_ACTION)
            .ok_or_else(|| ConvertError::UnknownControlType(UNKNOWN_ACTION.to_string()))
    }
}

impl Default for MapperRegistry {
    fn default() -> Self {
        Self::new()
    }
}
