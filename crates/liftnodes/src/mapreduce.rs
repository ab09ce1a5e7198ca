use crate::pig::python_list;
use crate::prepare::{prepare_command, PrepareMapper};
use liftcore::{
    el, templates, ArchiveCollector, ConvertError, FileCollector, Mapper, TriggerRule,
};
use liftconvert::{MapperFactory, MapperInput};
use minijinja::context;
use std::collections::{BTreeMap, BTreeSet};

/// MapReduce job action.
///
/// The job is described entirely by its configuration block; `<param>`
/// children become plain job arguments.
#[derive(Debug)]
pub struct MapReduceMapper {
    name: String,
    name_node: String,
    properties: BTreeMap<String, String>,
    arguments: Vec<String>,
    files: Vec<String>,
    archives: Vec<String>,
}

impl MapReduceMapper {
    fn from_input(input: &MapperInput<'_, '_>) -> Result<Self, ConvertError> {
        let name_node = input.require_child_text("name-node")?;

        let mut properties = BTreeMap::new();
        if let Some(configuration) = input
            .element
            .children()
            .find(|n| n.is_element() && n.tag_name().name() == "configuration")
        {
            for property in configuration
                .children()
                .filter(|n| n.is_element() && n.tag_name().name() == "property")
            {
                let text_of = |tag: &str| {
                    property
                        .children()
                        .find(|n| n.is_element() && n.tag_name().name() == tag)
                        .and_then(|n| n.text())
                        .map(|t| el::replace_el_with_var(t.trim(), input.params))
                };
                if let (Some(key), Some(value)) = (text_of("name"), text_of("value")) {
                    properties.insert(key, value);
                }
            }
        }

        Ok(Self {
            name: input.name.clone(),
            name_node,
            properties,
            arguments: input.resolved_child_texts("param"),
            files: Vec::new(),
            archives: Vec::new(),
        })
    }
}

impl Mapper for MapReduceMapper {
    fn mapper_type(&self) -> &str {
        "map-reduce"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn convert_to_text(&self, trigger_rule: TriggerRule) -> Result<String, ConvertError> {
        let mut properties = self.properties.clone();
        properties.insert("fs.defaultFS".to_string(), self.name_node.clone());

        templates::render_template(
            "mapreduce.tpl",
            context! {
                task_id => self.name,
                trigger_rule => trigger_rule.as_str(),
                properties => serde_json::to_string(&properties)?,
                arguments => serde_json::to_string(&self.arguments)?,
                files => python_list(&self.files)?,
                archives => python_list(&self.archives)?,
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

    fn as_file_collector(&mut self) -> Option<&mut dyn FileCollector> {
        Some(self)
    }

    fn as_archive_collector(&mut self) -> Option<&mut dyn ArchiveCollector> {
        Some(self)
    }
}

impl FileCollector for MapReduceMapper {
    fn add_file(&mut self, path: String) {
        self.files.push(path);
    }
}

impl ArchiveCollector for MapReduceMapper {
    fn add_archive(&mut self, path: String) {
        self.archives.push(path);
    }
}

pub struct MapReduceMapperFactory;

impl MapperFactory for MapReduceMapperFactory {
    fn create(&self, input: &MapperInput<'_, '_>) -> Result<Box<dyn Mapper>, ConvertError> {
        Ok(Box::new(MapReduceMapper::from_input(input)?))
    }

    fn mapper_type(&self) -> &str {
        "map-reduce"
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
