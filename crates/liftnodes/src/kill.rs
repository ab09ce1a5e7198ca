use liftcore::{templates, ConvertError, Mapper, TriggerRule};
use liftconvert::{MapperFactory, MapperInput};
use minijinja::context;
use std::collections::BTreeSet;

/// Kill nodes terminate the workflow in an error state.
///
/// The message child is diagnostic text only; it never affects control
/// flow. The emitted task echoes it and exits non-zero.
pub struct KillMapper {
    name: String,
    message: String,
}

impl KillMapper {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl Mapper for KillMapper {
    fn mapper_type(&self) -> &str {
        "kill"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn convert_to_text(&self, trigger_rule: TriggerRule) -> Result<String, ConvertError> {
        templates::render_template(
            "kill.tpl",
            context! {
                task_id => self.name,
                trigger_rule => trigger_rule.as_str(),
                message => self.message,
            },
        )
    }

    fn required_imports(&self) -> BTreeSet<String> {
        BTreeSet::from(["from airflow.operators import bash_operator".to_string()])
    }
}

pub struct KillMapperFactory;

impl MapperFactory for KillMapperFactory {
    fn create(&self, input: &MapperInput<'_, '_>) -> Result<Box<dyn Mapper>, ConvertError> {
        let message = input
            .resolved_child_text("message")
            .unwrap_or_else(|| "workflow failed".to_string());
        Ok(Box::new(KillMapper::new(input.name.clone(), message)))
    }

    fn mapper_type(&self) -> &str {
        "kill"
    }
}
