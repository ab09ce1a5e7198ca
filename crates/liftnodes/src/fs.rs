use liftcore::{el, templates, ConvertError, Mapper, Relation, TriggerRule};
use liftconvert::{MapperFactory, MapperInput};
use minijinja::context;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

const FS_OP_MKDIR: &str = "mkdir";
const FS_OP_DELETE: &str = "delete";
const FS_OP_MOVE: &str = "move";
const FS_OP_CHMOD: &str = "chmod";
const FS_OP_TOUCHZ: &str = "touchz";
const FS_OP_CHGRP: &str = "chgrp";
const FS_OP_SETREP: &str = "setrep";

/// Quote a string for a POSIX shell, like Python's `shlex.quote`.
pub(crate) fn shell_quote(s: &str) -> String {
    let safe = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c));
    if safe {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r#"'"'"'"#))
    }
}

fn bool_attr(node: roxmltree::Node<'_, '_>, attribute: &str) -> bool {
    matches!(node.attribute(attribute), Some(v) if v != "false")
}

fn required_path<'a>(
    node: roxmltree::Node<'a, '_>,
    attribute: &str,
) -> Result<&'a str, ConvertError> {
    node.attribute(attribute)
        .ok_or_else(|| ConvertError::MissingAttribute {
            element: node.tag_name().name().to_string(),
            attribute: attribute.to_string(),
        })
}

fn has_child(node: roxmltree::Node<'_, '_>, tag: &str) -> bool {
    node.children()
        .any(|n| n.is_element() && n.tag_name().name() == tag)
}

/// Build the filesystem shell command for one fs operation element.
fn fs_operation_command(
    node: roxmltree::Node<'_, '_>,
    params: &HashMap<String, String>,
) -> Result<Option<String>, ConvertError> {
    let resolve = |raw: &str| el::replace_el_with_var(raw, params);
    let command = match node.tag_name().name() {
        FS_OP_MKDIR => format!("fs -mkdir {}", shell_quote(&resolve(required_path(node, "path")?))),
        FS_OP_DELETE => {
            let mut command =
                format!("fs -rm -r {}", shell_quote(&resolve(required_path(node, "path")?)));
            if bool_attr(node, "skip-trash") {
                command.push_str(" -skipTrash");
            }
            command
        }
        FS_OP_MOVE => format!(
            "fs -mv {} {}",
            shell_quote(&resolve(required_path(node, "source")?)),
            shell_quote(&resolve(required_path(node, "target")?)),
        ),
        FS_OP_CHMOD => {
            let recursive = if has_child(node, "recursive") { "-R " } else { "" };
            format!(
                "fs -chmod {}{} {}",
                recursive,
                shell_quote(&resolve(required_path(node, "path")?)),
                shell_quote(required_path(node, "permissions")?),
            )
        }
        FS_OP_TOUCHZ => {
            format!("fs -touchz {}", shell_quote(&resolve(required_path(node, "path")?)))
        }
        FS_OP_CHGRP => {
            let recursive = if has_child(node, "recursive") { "-R " } else { "" };
            format!(
                "fs -chgrp {}{} {}",
                recursive,
                shell_quote(&resolve(required_path(node, "path")?)),
                shell_quote(required_path(node, "group")?),
            )
        }
        FS_OP_SETREP => format!(
            "fs -setrep {} {}",
            shell_quote(required_path(node, "replication-factor")?),
            shell_quote(&resolve(required_path(node, "path")?)),
        ),
        _ => return Ok(None),
    };
    Ok(Some(command))
}

#[derive(Debug, Clone, Serialize)]
struct SubOperator {
    task_id: String,
    command: String,
}

/// Filesystem action: an ordered list of shell-level operations.
///
/// Each operation becomes its own primitive unit, chained sequentially;
/// the node's boundary units are the first and last sub-operator, so
/// inbound and outbound edges attach to the right ends of the chain. An
/// empty fs action degrades to a single placeholder unit.
#[derive(Debug)]
pub struct FsMapper {
    name: String,
    sub_ops: Vec<SubOperator>,
}

impl FsMapper {
    fn from_input(input: &MapperInput<'_, '_>) -> Result<Self, ConvertError> {
        let mut sub_ops = Vec::new();
        for (index, node) in input
            .element
            .children()
            .filter(|n| n.is_element())
            .enumerate()
        {
            let command = fs_operation_command(node, input.params)?.ok_or_else(|| {
                ConvertError::UnknownFsOperation {
                    node: input.name.clone(),
                    op: node.tag_name().name().to_string(),
                }
            })?;
            sub_ops.push(SubOperator {
                task_id: format!("{}_fs_{}", input.name, index),
                command,
            });
        }
        Ok(Self {
            name: input.name.clone(),
            sub_ops,
        })
    }

    fn task_ids(&self) -> Vec<String> {
        self.sub_ops.iter().map(|op| op.task_id.clone()).collect()
    }
}

impl Mapper for FsMapper {
    fn mapper_type(&self) -> &str {
        "fs"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn convert_to_text(&self, trigger_rule: TriggerRule) -> Result<String, ConvertError> {
        if self.sub_ops.is_empty() {
            return templates::render_template(
                "dummy.tpl",
                context! {
                    task_id => self.name,
                    trigger_rule => trigger_rule.as_str(),
                },
            );
        }

        let mut rendered = Vec::with_capacity(self.sub_ops.len());
        for (index, op) in self.sub_ops.iter().enumerate() {
            // Only the chain's entry point takes the node's trigger rule;
            // the rest run whenever their predecessor finished.
            let rule = (index == 0).then(|| trigger_rule.as_str());
            let text = templates::render_template(
                "fs_op.tpl",
                context! {
                    task_id => op.task_id,
                    trigger_rule => rule,
                    command => op.command,
                },
            )?;
            rendered.push(context! { rendered_template => text });
        }

        templates::render_template(
            "fs.tpl",
            context! {
                sub_ops => rendered,
                relations => Relation::chain(&self.task_ids()),
            },
        )
    }

    fn required_imports(&self) -> BTreeSet<String> {
        BTreeSet::from(
            [
                "from airflow.operators import bash_operator",
                "from airflow.operators import dummy_operator",
                "import shlex",
            ]
            .map(String::from),
        )
    }

    fn first_task_id(&self) -> String {
        self.sub_ops
            .first()
            .map(|op| op.task_id.clone())
            .unwrap_or_else(|| self.name.clone())
    }

    fn last_task_id(&self) -> String {
        self.sub_ops
            .last()
            .map(|op| op.task_id.clone())
            .unwrap_or_else(|| self.name.clone())
    }
}

pub struct FsMapperFactory;

impl MapperFactory for FsMapperFactory {
    fn create(&self, input: &MapperInput<'_, '_>) -> Result<Box<dyn Mapper>, ConvertError> {
        Ok(Box::new(FsMapper::from_input(input)?))
    }

    fn mapper_type(&self) -> &str {
        "fs"
    }
}
