use crate::fs::shell_quote;
use liftcore::{el, templates, ConvertError, Mapper, TriggerRule};
use liftconvert::MapperInput;
use minijinja::context;
use std::collections::BTreeSet;

/// Build the filesystem preparation command an action element declares,
/// if any. Only `delete` and `mkdir` operations are part of the prepare
/// vocabulary; anything else is ignored.
pub(crate) fn prepare_command(input: &MapperInput<'_, '_>) -> Option<String> {
    let prepare = input
        .element
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "prepare")?;

    let mut ops = Vec::new();
    for node in prepare.children().filter(|n| n.is_element()) {
        let Some(path) = node.attribute("path") else {
            continue;
        };
        let path = shell_quote(&el::replace_el_with_var(path, input.params));
        match node.tag_name().name() {
            "delete" => ops.push(format!("fs -rm -r {path}")),
            "mkdir" => ops.push(format!("fs -mkdir {path}")),
            _ => {}
        }
    }

    if ops.is_empty() {
        None
    } else {
        Some(ops.join("; "))
    }
}

/// Pre-step inserted ahead of an action that declares preparation work.
///
/// The pre-step keeps the source node's name so upstream edges resolve
/// to it; the action itself moves to the prepared-variant name and the
/// pair is chained through an ordinary downstream edge.
pub struct PrepareMapper {
    name: String,
    command: String,
}

impl PrepareMapper {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
        }
    }
}

impl Mapper for PrepareMapper {
    fn mapper_type(&self) -> &str {
        "prepare"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn convert_to_text(&self, trigger_rule: TriggerRule) -> Result<String, ConvertError> {
        templates::render_template(
            "prepare.tpl",
            context! {
                task_id => self.name,
                trigger_rule => trigger_rule.as_str(),
                command => self.command,
            },
        )
    }

    fn required_imports(&self) -> BTreeSet<String> {
        BTreeSet::from(
            ["from airflow.operators import bash_operator", "import shlex"].map(String::from),
        )
    }
}
