use liftcore::{templates, ConvertError, Mapper, TriggerRule};
use liftconvert::{MapperFactory, MapperInput};
use minijinja::context;
use std::collections::BTreeSet;

/// No-op mapper for control nodes (start, end, fork, join).
///
/// These nodes carry no work of their own; they exist purely to shape
/// control flow, so they translate to tasks that always complete.
pub struct DummyMapper {
    name: String,
}

impl DummyMapper {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Mapper for DummyMapper {
    fn mapper_type(&self) -> &str {
        "dummy"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn convert_to_text(&self, trigger_rule: TriggerRule) -> Result<String, ConvertError> {
        templates::render_template(
            "dummy.tpl",
            context! {
                task_id => self.name,
                trigger_rule => trigger_rule.as_str(),
            },
        )
    }

    fn required_imports(&self) -> BTreeSet<String> {
        BTreeSet::from(["from airflow.operators import dummy_operator".to_string()])
    }
}

pub struct DummyMapperFactory;

impl MapperFactory for DummyMapperFactory {
    fn create(&self, input: &MapperInput<'_, '_>) -> Result<Box<dyn Mapper>, ConvertError> {
        Ok(Box::new(DummyMapper::new(input.name.clone())))
    }

    fn mapper_type(&self) -> &str {
        "dummy"
    }
}
