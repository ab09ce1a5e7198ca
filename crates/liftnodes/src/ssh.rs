use liftcore::{templates, ConvertError, Mapper, TriggerRule};
use liftconvert::{MapperFactory, MapperInput};
use minijinja::context;
use std::collections::BTreeSet;

/// Remote shell action: runs a command on another host over SSH.
#[derive(Debug)]
pub struct SshMapper {
    name: String,
    user: String,
    host: String,
    command: String,
}

impl SshMapper {
    fn from_input(input: &MapperInput<'_, '_>) -> Result<Self, ConvertError> {
        let host_text = input.require_child_text("host")?;
        // The source format writes the target as user@host.
        let (user, host) = match host_text.split_once('@') {
            Some((user, host)) => (user.to_string(), host.to_string()),
            None => (String::new(), host_text),
        };

        let mut command = input.require_child_text("command")?;
        for arg in input.resolved_child_texts("args") {
            command.push(' ');
            command.push_str(&arg);
        }

        Ok(Self {
            name: input.name.clone(),
            user,
            host,
            command,
        })
    }
}

impl Mapper for SshMapper {
    fn mapper_type(&self) -> &str {
        "ssh"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn convert_to_text(&self, trigger_rule: TriggerRule) -> Result<String, ConvertError> {
        templates::render_template(
            "ssh.tpl",
            context! {
                task_id => self.name,
                trigger_rule => trigger_rule.as_str(),
                user => self.user,
                host => self.host,
                command => self.command,
            },
        )
    }

    fn required_imports(&self) -> BTreeSet<String> {
        BTreeSet::from(
            [
                "from airflow.contrib.hooks import ssh_hook",
                "from airflow.contrib.operators import ssh_operator",
            ]
            .map(String::from),
        )
    }
}

pub struct SshMapperFactory;

impl MapperFactory for SshMapperFactory {
    fn create(&self, input: &MapperInput<'_, '_>) -> Result<Box<dyn Mapper>, ConvertError> {
        Ok(Box::new(SshMapper::from_input(input)?))
    }

    fn mapper_type(&self) -> &str {
        "ssh"
    }
}
