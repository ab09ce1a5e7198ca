use liftcore::{normalize_task_name, templates, ConvertError, Mapper, TriggerRule};
use liftconvert::{MapperFactory, MapperInput};
use minijinja::context;
use std::collections::BTreeSet;

/// Sub-workflow action: hands control to another converted workflow.
///
/// The referenced application is expected to be converted separately;
/// its program name is derived from the application path's basename the
/// same way the default output name is derived for the parent.
pub struct SubworkflowMapper {
    name: String,
    sub_dag_id: String,
}

impl SubworkflowMapper {
    fn from_input(input: &MapperInput<'_, '_>) -> Result<Self, ConvertError> {
        let app_path = input.require_child_text("app-path")?;
        let basename = app_path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&app_path);
        Ok(Self {
            name: input.name.clone(),
            sub_dag_id: normalize_task_name(basename),
        })
    }
}

impl Mapper for SubworkflowMapper {
    fn mapper_type(&self) -> &str {
        "sub-workflow"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn convert_to_text(&self, trigger_rule: TriggerRule) -> Result<String, ConvertError> {
        templates::render_template(
            "subwf.tpl",
            context! {
                task_id => self.name,
                trigger_rule => trigger_rule.as_str(),
                sub_dag_id => self.sub_dag_id,
            },
        )
    }

    fn required_imports(&self) -> BTreeSet<String> {
        BTreeSet::from(["from airflow.operators import dagrun_operator".to_string()])
    }
}

pub struct SubworkflowMapperFactory;

impl MapperFactory for SubworkflowMapperFactory {
    fn create(&self, input: &MapperInput<'_, '_>) -> Result<Box<dyn Mapper>, ConvertError> {
        Ok(Box::new(SubworkflowMapper::from_input(input)?))
    }

    fn mapper_type(&self) -> &str {
        "sub-workflow"
    }
}
