use crate::prepare::{prepare_command, PrepareMapper};
use liftcore::{
    templates, ArchiveCollector, ConvertError, FileCollector, Mapper, TriggerRule,
};
use liftconvert::{MapperFactory, MapperInput};
use minijinja::context;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;

/// Pig script action.
///
/// The script itself is an asset of the workflow directory and is copied
/// next to the generated program during emission.
pub struct PigMapper {
    name: String,
    script: String,
    variables: BTreeMap<String, String>,
    files: Vec<String>,
    archives: Vec<String>,
}

impl PigMapper {
    fn from_input(input: &MapperInput<'_, '_>) -> Result<Self, ConvertError> {
        let script = input.require_child_text("script")?;

        // <param> children are key=value pairs handed to the script.
        let mut variables = BTreeMap::new();
        for param in input.resolved_child_texts("param") {
            if let Some((key, value)) = param.split_once('=') {
                variables.insert(key.to_string(), value.to_string());
            }
        }

        Ok(Self {
            name: input.name.clone(),
            script,
            variables,
            files: Vec::new(),
            archives: Vec::new(),
        })
    }
}

impl Mapper for PigMapper {
    fn mapper_type(&self) -> &str {
        "pig"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn convert_to_text(&self, trigger_rule: TriggerRule) -> Result<String, ConvertError> {
        templates::render_template(
            "pig.tpl",
            context! {
                task_id => self.name,
                trigger_rule => trigger_rule.as_str(),
                script_uri => self.script,
                variables => serde_json::to_string(&self.variables)?,
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

    fn copy_extra_assets(
        &self,
        input_directory: &Path,
        output_directory: &Path,
    ) -> Result<(), ConvertError> {
        let source = input_directory.join(&self.script);
        if source.exists() {
            let target = output_directory.join(&self.script);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(&source, &target)?;
            debug!(script = %self.script, "copied pig script");
        }
        Ok(())
    }

    fn as_file_collector(&mut self) -> Option<&mut dyn FileCollector> {
        Some(self)
    }

    fn as_archive_collector(&mut self) -> Option<&mut dyn ArchiveCollector> {
        Some(self)
    }
}

impl FileCollector for PigMapper {
    fn add_file(&mut self, path: String) {
        self.files.push(path);
    }
}

impl ArchiveCollector for PigMapper {
    fn add_archive(&mut self, path: String) {
        self.archives.push(path);
    }
}

/// Render a list of strings as a Python list literal, or nothing when
/// empty so the template can drop the argument entirely.
pub(crate) fn python_list(items: &[String]) -> Result<Option<String>, ConvertError> {
    if items.is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::to_string(items)?))
    }
}

pub struct PigMapperFactory;

impl MapperFactory for PigMapperFactory {
    fn create(&self, input: &MapperInput<'_, '_>) -> Result<Box<dyn Mapper>, ConvertError> {
        Ok(Box::new(PigMapper::from_input(input)?))
    }

    fn mapper_type(&self) -> &str {
        "pig"
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
