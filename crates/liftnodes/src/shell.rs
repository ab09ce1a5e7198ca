use liftcore::{templates, ConvertError, Mapper, TriggerRule};
use liftconvert::{MapperFactory, MapperInput};
use minijinja::context;
use std::collections::BTreeSet;

/// Shell action: one executable plus its arguments, run as a local
/// shell command by the generated task.
pub struct ShellMapper {
    name: String,
    command: String,
}

impl ShellMapper {
    fn from_input(input: &MapperInput<'_, '_>) -> Result<Self, ConvertError> {
        let mut command = input.require_child_text("exec")?;
        for arg in input.resolved_child_texts("argument") {
            command.push(' ');
            command.push_str(&arg);
        }
        Ok(Self {
            name: input.name.clone(),
            command,
        })
    }
}

impl Mapper for ShellMapper {
    fn mapper_type(&self) -> &str {
        "shell"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn convert_to_text(&self, trigger_rule: TriggerRule) -> Result<String, ConvertError> {
        templates::render_template(
            "shell.tpl",
            context! {
                task_id => self.name,
                trigger_rule => trigger_rule.as_str(),
                command => self.command,
            },
        )
    }

    fn required_imports(&self) -> BTreeSet<String> {
        BTreeSet::from(["from airflow.operators import bash_operator".to_string()])
    }
}

pub struct ShellMapperFactory;

impl MapperFactory for ShellMapperFactory {
    fn create(&self, input: &MapperInput<'_, '_>) -> Result<Box<dyn Mapper>, ConvertError> {
        Ok(Box::new(ShellMapper::from_input(input)?))
    }

    fn mapper_type(&self) -> &str {
        "shell"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;

    #[test]
    fn builds_command_with_substituted_arguments() {
        let xml = r#"<shell>
            <exec>java</exec>
            <argument>-jar</argument>
            <argument>${appDir}/report.jar</argument>
        </shell>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let params = HashMap::from([("appDir".to_string(), "/opt/app".to_string())]);
        let input = MapperInput {
            element: doc.root_element(),
            name: "shell_node".to_string(),
            dag_name: "demo",
            params: &params,
            input_directory: Path::new("/in"),
            output_directory: Path::new("/out"),
        };
        let mapper = ShellMapper::from_input(&input).unwrap();
        assert_eq!(mapper.command, "java -jar /opt/app/report.jar");
    }
}
