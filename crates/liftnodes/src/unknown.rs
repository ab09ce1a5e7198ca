use liftcore::{templates, ConvertError, Mapper, TriggerRule};
use liftconvert::{MapperFactory, MapperInput, UNKNOWN_ACTION};
use minijinja::context;
use std::collections::BTreeSet;

/// Fallback for action sub-types with no registered mapper.
///
/// Partial translatability must not block the rest of the graph: the
/// node keeps its place in the control flow and renders a clearly
/// marked placeholder fragment instead of failing the conversion.
pub struct UnknownMapper {
    name: String,
    action_type: String,
}

impl UnknownMapper {
    pub fn new(name: impl Into<String>, action_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action_type: action_type.into(),
        }
    }
}

impl Mapper for UnknownMapper {
    fn mapper_type(&self) -> &str {
        UNKNOWN_ACTION
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn convert_to_text(&self, trigger_rule: TriggerRule) -> Result<String, ConvertError> {
        templates::render_template(
            "unknown.tpl",
            context! {
                task_id => self.name,
                trigger_rule => trigger_rule.as_str(),
                action_type => self.action_type,
            },
        )
    }

    fn required_imports(&self) -> BTreeSet<String> {
        BTreeSet::from(["from airflow.operators import dummy_operator".to_string()])
    }
}

pub struct UnknownMapperFactory;

impl MapperFactory for UnknownMapperFactory {
    fn create(&self, input: &MapperInput<'_, '_>) -> Result<Box<dyn Mapper>, ConvertError> {
        Ok(Box::new(UnknownMapper::new(
            input.name.clone(),
            input.element.tag_name().name(),
        )))
    }

    fn mapper_type(&self) -> &str {
        UNKNOWN_ACTION
    }
}
