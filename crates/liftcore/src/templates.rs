//! Embedded fragment templates.
//!
//! Every target-language fragment is rendered from one of these
//! templates; mappers reference them by file name. The sources are
//! compiled into the binary so a conversion never depends on a template
//! directory being present at runtime.

use crate::error::ConvertError;
use minijinja::Environment;
use serde::Serialize;
use std::sync::OnceLock;

static TEMPLATE_SOURCES: &[(&str, &str)] = &[
    ("dag.tpl", include_str!("../templates/dag.tpl")),
    ("relations.tpl", include_str!("../templates/relations.tpl")),
    ("dummy.tpl", include_str!("../templates/dummy.tpl")),
    ("unknown.tpl", include_str!("../templates/unknown.tpl")),
    ("kill.tpl", include_str!("../templates/kill.tpl")),
    ("decision.tpl", include_str!("../templates/decision.tpl")),
    ("ssh.tpl", include_str!("../templates/ssh.tpl")),
    ("shell.tpl", include_str!("../templates/shell.tpl")),
    ("pig.tpl", include_str!("../templates/pig.tpl")),
    ("spark.tpl", include_str!("../templates/spark.tpl")),
    ("mapreduce.tpl", include_str!("../templates/mapreduce.tpl")),
    ("subwf.tpl", include_str!("../templates/subwf.tpl")),
    ("fs.tpl", include_str!("../templates/fs.tpl")),
    ("fs_op.tpl", include_str!("../templates/fs_op.tpl")),
    ("prepare.tpl", include_str!("../templates/prepare.tpl")),
];

fn environment() -> &'static Environment<'static> {
    static ENV: OnceLock<Environment<'static>> = OnceLock::new();
    ENV.get_or_init(|| {
        let mut env = Environment::new();
        // Fragments are concatenated into one file; the trailing newline
        // of each template is load-bearing.
        env.set_keep_trailing_newline(true);
        for (name, source) in TEMPLATE_SOURCES {
            env.add_template(name, source)
                .expect("embedded template must parse");
        }
        env
    })
}

/// Render one of the embedded templates with the given context.
pub fn render_template(name: &str, ctx: impl Serialize) -> Result<String, ConvertError> {
    let template = environment().get_template(name)?;
    Ok(template.render(ctx)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn all_embedded_templates_are_registered() {
        for (name, _) in TEMPLATE_SOURCES {
            assert!(environment().get_template(name).is_ok(), "missing {name}");
        }
    }

    #[test]
    fn dummy_template_renders_task() {
        let text = render_template(
            "dummy.tpl",
            context! { task_id => "end_node", trigger_rule => "all_success" },
        )
        .unwrap();
        assert!(text.contains("end_node"));
        assert!(text.contains("all_success"));
    }
}
