use crate::prepare::{prepare_command, PrepareMapper};
use liftcore::{templates, ConvertError, Mapper, TriggerRule};
use liftconvert::{MapperFactory, MapperInput};
use minijinja::context;
use std::collections::BTreeSet;

/// Spark job action.
pub struct SparkMapper {
    name: String,
    job_name: String,
    main_class: Option<String>,
    main_jar: Option<String>,
    arguments: Vec<String>,
}

impl SparkMapper {
    fn from_input(input: &MapperInput<'_, '_>) -> Result<Self, ConvertError> {
        Ok(Self {
            name: input.name.clone(),
            job_name: input
                .resolved_child_text("name")
                .unwrap_or_else(|| input.name.clone()),
            main_class: input.resolved_child_text("class"),
            main_jar: input.resolved_child_text("jar"),
            arguments: input.resolved_child_texts("arg"),
        })
    }
}

impl Mapper for SparkMapper {
    fn mapper_type(&self) -> &str {
        "spark"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn convert_to_text(&self, trigger_rule: TriggerRule) -> Result<String, ConvertError> {
        templates::render_template(
            "spark.tpl",
            context! {
                task_id => self.name,
                trigger_rule => trigger_rule.as_str(),
                job_name => self.job_name,
                main_class => self.main_class,
                main_jar => self.main_jar,
                arguments => serde_json::to_string(&self.arguments)?,
            },
        )
    }

    fn required_imports(&self) -> BTreeSet<String> {
        BTreeSet::from(
            [
                "from airflow.contrib.operators import dataproc_operator",
                "from airflow.utils import dates",
            ]
            .map(String::from),
        )
    }
}

pub struct SparkMapperFactory;

impl MapperFactory for SparkMapperFactory {
    fn create(&self, input: &MapperInput<'_, '_>) -> Result<Box<dyn Mapper>, ConvertError> {
        Ok(Box::new(SparkMapper::from_input(input)?))
    }

    fn mapper_type(&self) -> &str {
        "spark"
    }

    fn prepare_step(
        &self,
        input: &MapperInput<'_, '_>,
    ) -> Result<Option<Box<dyn Mapper>>, ConvertError> {
        Ok(prepare_command(input).map(|command| {
            Box::new(PrepareMapper::new(input.name.clone(), command)) as Box<dyn Mapper>
        }))
    }
}
