use liftcore::{el, normalize_task_name, templates, ConvertError, Mapper, TriggerRule};
use liftconvert::{MapperFactory, MapperInput};
use minijinja::context;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

/// Helper module shipped next to the generated program; evaluates the
/// case predicates at run time since the converter never does.
const EL_HELPERS: &str = r#""""Branch helpers for generated workflow programs."""


def first_matching_case(switch, default, params):
    """Return the first branch whose predicate evaluates truthy."""
    for predicate, target in switch:
        try:
            if eval(predicate, {"params": params}):
                return target
        except Exception:
            continue
    return default
"#;

#[derive(Debug, Clone, Serialize)]
struct Case {
    predicate: String,
    target: String,
}

/// Decision nodes are a switch-case over opaque predicates.
///
/// Predicates pass through to the generated program untouched apart from
/// parameter substitution; evaluation is deferred to the emitted target
/// code.
#[derive(Debug)]
pub struct DecisionMapper {
    name: String,
    cases: Vec<Case>,
    default: String,
}

impl DecisionMapper {
    fn from_input(input: &MapperInput<'_, '_>) -> Result<Self, ConvertError> {
        let switch = input
            .element
            .children()
            .find(|n| n.is_element() && n.tag_name().name() == "switch")
            .ok_or_else(|| ConvertError::MissingChild {
                node: input.name.clone(),
                child: "switch".to_string(),
            })?;

        let mut cases = Vec::new();
        let mut default = None;
        for branch in switch.children().filter(|n| n.is_element()) {
            let Some(target) = branch.attribute("to").map(normalize_task_name) else {
                continue;
            };
            if branch.tag_name().name() == "default" {
                default = Some(target);
            } else {
                let predicate = branch
                    .text()
                    .map(|t| el::replace_el_with_var(t.trim(), input.params))
                    .unwrap_or_default();
                cases.push(Case { predicate, target });
            }
        }

        // Lenient like the source format: a missing default falls back
        // to the last case target.
        let default = default
            .or_else(|| cases.last().map(|c| c.target.clone()))
            .unwrap_or_default();

        Ok(Self {
            name: input.name.clone(),
            cases,
            default,
        })
    }
}

impl Mapper for DecisionMapper {
    fn mapper_type(&self) -> &str {
        "decision"
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn convert_to_text(&self, trigger_rule: TriggerRule) -> Result<String, ConvertError> {
        templates::render_template(
            "decision.tpl",
            context! {
                task_id => self.name,
                trigger_rule => trigger_rule.as_str(),
                cases => self.cases,
                default => self.default,
            },
        )
    }

    fn required_imports(&self) -> BTreeSet<String> {
        BTreeSet::from(
            [
                "import functools",
                "import el_helpers",
                "from airflow.operators import python_operator",
            ]
            .map(String::from),
        )
    }

    fn copy_extra_assets(
        &self,
        _input_directory: &Path,
        output_directory: &Path,
    ) -> Result<(), ConvertError> {
        std::fs::write(output_directory.join("el_helpers.py"), EL_HELPERS)?;
        Ok(())
    }
}

pub struct DecisionMapperFactory;

impl MapperFactory for DecisionMapperFactory {
    fn create(&self, input: &MapperInput<'_, '_>) -> Result<Box<dyn Mapper>, ConvertError> {
        Ok(Box::new(DecisionMapper::from_input(input)?))
    }

    fn mapper_type(&self) -> &str {
        "decision"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn input_fixture<'a, 'input>(
        doc: &'a roxmltree::Document<'input>,
        params: &'a HashMap<String, String>,
    ) -> MapperInput<'a, 'input> {
        MapperInput {
            element: doc.root_element(),
            name: "decision_node".to_string(),
            dag_name: "demo",
            params,
            input_directory: Path::new("/in"),
            output_directory: Path::new("/out"),
        }
    }

    #[test]
    fn extracts_cases_and_default() {
        let xml = r#"<decision name="decision-node">
            <switch>
                <case to="first-task">${firstNotNull('a', 'b')}</case>
                <case to="second-task">${1 gt 2}</case>
                <default to="end-node"/>
            </switch>
        </decision>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let params = HashMap::new();
        let mapper = DecisionMapper::from_input(&input_fixture(&doc, &params)).unwrap();

        assert_eq!(mapper.cases.len(), 2);
        assert_eq!(mapper.cases[0].target, "first_task");
        assert_eq!(mapper.default, "end_node");
    }

    #[test]
    fn missing_switch_is_structural_error() {
        let xml = r#"<decision name="decision-node"/>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let params = HashMap::new();
        let err = DecisionMapper::from_input(&input_fixture(&doc, &params)).unwrap_err();
        assert!(matches!(err, ConvertError::MissingChild { child, .. } if child == "switch"));
    }
}
