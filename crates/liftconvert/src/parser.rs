use crate::registry::{MapperInput, MapperRegistry};
use liftcore::{el, normalize_task_name, ConvertError, Mapper, ParsedNode, ParsedWorkflow};
use roxmltree::{Document, Node as XmlNode, NodeId};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Parses the workflow XML into the node graph.
///
/// One parser instance corresponds to one workflow. Each source node is
/// routed to a per-type builder which normalizes every name it touches,
/// instantiates the node's mapper through the registry, and records the
/// node's outgoing edges. Trigger classification is deliberately *not*
/// done here; it needs the complete edge set.
pub struct WorkflowParser<'a> {
    registry: &'a MapperRegistry,
    params: &'a HashMap<String, String>,
    dag_name: String,
    input_directory: PathBuf,
    output_directory: PathBuf,
    workflow: ParsedWorkflow,
    /// Elements already folded into the graph by fork recursion; checked
    /// before parsing any element so sub-trees are never parsed twice.
    visited: HashSet<NodeId>,
}

impl<'a> WorkflowParser<'a> {
    pub fn new(
        registry: &'a MapperRegistry,
        params: &'a HashMap<String, String>,
        dag_name: impl Into<String>,
        input_directory: impl Into<PathBuf>,
        output_directory: impl Into<PathBuf>,
    ) -> Self {
        let dag_name = dag_name.into();
        Self {
            registry,
            params,
            workflow: ParsedWorkflow::new(dag_name.clone()),
            dag_name,
            input_directory: input_directory.into(),
            output_directory: output_directory.into(),
            visited: HashSet::new(),
        }
    }

    /// Parse the workflow document and hand back the completed graph.
    pub fn parse(mut self, xml: &str) -> Result<ParsedWorkflow, ConvertError> {
        let document = Document::parse(xml)?;
        let root = document.root_element();

        for node in root.children().filter(XmlNode::is_element) {
            if self.visited.insert(node.id()) {
                self.parse_node(root, node)?;
            }
        }

        self.validate_references()?;
        Ok(self.workflow)
    }

    /// Route one source element to its per-type builder. Unrecognized
    /// root-level tags are skipped so newer schema versions still convert.
    fn parse_node(
        &mut self,
        root: XmlNode<'_, '_>,
        node: XmlNode<'_, '_>,
    ) -> Result<(), ConvertError> {
        match node.tag_name().name() {
            "start" => self.parse_start_node(node),
            "action" => self.parse_action_node(node),
            "kill" => self.parse_kill_node(node),
            "end" => self.parse_end_node(node),
            "fork" => self.parse_fork_node(root, node),
            "join" => self.parse_join_node(node),
            "decision" => self.parse_decision_node(node),
            other => {
                debug!(tag = other, "skipping unrecognized element");
                Ok(())
            }
        }
    }

    /// The start node is unnamed in the source format, so it receives a
    /// generated name; the random suffix makes collisions with user
    /// nodes negligible.
    fn parse_start_node(&mut self, start_node: XmlNode<'_, '_>) -> Result<(), ConvertError> {
        let to = name_ref_attr(start_node, "to")?;
        let name = format!(
            "start_node_{}",
            &Uuid::new_v4().simple().to_string()[..4]
        );

        let factory = self.registry.control("start")?;
        let mapper = factory.create(&self.mapper_input(start_node, name.clone()))?;

        let mut node = ParsedNode::new(mapper);
        node.add_downstream_node_name(to);

        info!(name = %node.name(), "parsed start node");
        self.insert_node(node)
    }

    /// Action nodes trigger a unit of real work. They must carry both a
    /// success edge and a failure edge; the action sub-type is the tag of
    /// the first child element.
    fn parse_action_node(&mut self, action_node: XmlNode<'_, '_>) -> Result<(), ConvertError> {
        let name = name_ref_attr(action_node, "name")?;

        let action_element = action_node
            .children()
            .find(|n| n.is_element())
            .ok_or_else(|| ConvertError::MissingChild {
                node: name.clone(),
                child: "action type".to_string(),
            })?;
        let action_type = action_element.tag_name().name().to_string();

        let ok_to = name_ref_attr(
            child_element(action_node, "ok").ok_or_else(|| ConvertError::MissingChild {
                node: name.clone(),
                child: "ok".to_string(),
            })?,
            "to",
        )?;
        let error_to = name_ref_attr(
            child_element(action_node, "error").ok_or_else(|| ConvertError::MissingChild {
                node: name.clone(),
                child: "error".to_string(),
            })?,
            "to",
        )?;

        let factory = self.registry.action(&action_type)?.clone();

        // A node whose mapper declares preparation work expands into two
        // model nodes: the pre-step keeps the source name (so upstream
        // references resolve to it) and the action itself moves to the
        // prepared-variant name, chained through a plain downstream edge.
        let prepare_mapper =
            factory.prepare_step(&self.mapper_input(action_element, name.clone()))?;
        let task_name = match prepare_mapper {
            Some(_) => format!("{name}_prepared"),
            None => name.clone(),
        };

        let mut mapper = factory.create(&self.mapper_input(action_element, task_name.clone()))?;
        self.attach_file_refs(action_node, &name, mapper.as_mut())?;
        self.attach_archive_refs(action_node, &name, mapper.as_mut())?;

        let mut node = ParsedNode::new(mapper);
        node.add_downstream_node_name(ok_to);
        node.set_error_node_name(error_to);

        info!(name = %name, action_type = %action_type, "parsed action node");

        if let Some(prepare) = prepare_mapper {
            let mut pre_node = ParsedNode::new(prepare);
            pre_node.add_downstream_node_name(task_name);
            self.insert_node(pre_node)?;
        }
        self.insert_node(node)
    }

    /// A workflow transitioning to a kill node finishes in an error; the
    /// message child only feeds diagnostic text.
    fn parse_kill_node(&mut self, kill_node: XmlNode<'_, '_>) -> Result<(), ConvertError> {
        let name = name_ref_attr(kill_node, "name")?;
        let factory = self.registry.control("kill")?;
        let mapper = factory.create(&self.mapper_input(kill_node, name.clone()))?;

        info!(name = %name, "parsed kill node");
        self.insert_node(ParsedNode::new(mapper))
    }

    /// Reaching the end node means the workflow completed successfully.
    fn parse_end_node(&mut self, end_node: XmlNode<'_, '_>) -> Result<(), ConvertError> {
        let name = name_ref_attr(end_node, "name")?;
        let factory = self.registry.control("end")?;
        let mapper = factory.create(&self.mapper_input(end_node, name.clone()))?;

        info!(name = %name, "parsed end node");
        self.insert_node(ParsedNode::new(mapper))
    }

    /// Fork nodes fan out into parallel paths. Each referenced path head
    /// is parsed in place so its whole sub-tree is in the graph before
    /// the root-level iteration moves on; the visited set keeps those
    /// sub-trees from being parsed a second time.
    fn parse_fork_node(
        &mut self,
        root: XmlNode<'_, '_>,
        fork_node: XmlNode<'_, '_>,
    ) -> Result<(), ConvertError> {
        let name = name_ref_attr(fork_node, "name")?;
        let factory = self.registry.control("fork")?;
        let mapper = factory.create(&self.mapper_input(fork_node, name.clone()))?;

        let mut paths = Vec::new();
        for path in fork_node.children().filter(|n| n.is_element()) {
            if path.tag_name().name() == "path" {
                paths.push(name_ref_attr(path, "start")?);
            }
        }

        let mut node = ParsedNode::new(mapper);
        for target in &paths {
            node.add_downstream_node_name(target.clone());
            debug!(fork = %name, downstream = %target, "added fork path");
        }

        info!(name = %name, paths = paths.len(), "parsed fork node");
        self.insert_node(node)?;

        for target in paths {
            if let Some(element) = find_node_by_name(root, &target) {
                if self.visited.insert(element.id()) {
                    self.parse_node(root, element)?;
                }
            }
            // A missing path head surfaces as a dangling reference once
            // the whole document has been walked.
        }
        Ok(())
    }

    /// Join nodes converge the paths of the matching fork; the awaiting
    /// semantics come entirely out of the trigger-rule pass.
    fn parse_join_node(&mut self, join_node: XmlNode<'_, '_>) -> Result<(), ConvertError> {
        let name = name_ref_attr(join_node, "name")?;
        let to = name_ref_attr(join_node, "to")?;

        let factory = self.registry.control("join")?;
        let mapper = factory.create(&self.mapper_input(join_node, name.clone()))?;

        let mut node = ParsedNode::new(mapper);
        node.add_downstream_node_name(to);

        info!(name = %name, "parsed join node");
        self.insert_node(node)
    }

    /// Decision nodes behave like a switch-case: predicates are opaque
    /// strings evaluated by the generated program, never here. Any switch
    /// child carrying a `to` attribute becomes a branch; a decision
    /// without exactly one default is accepted but flagged.
    fn parse_decision_node(&mut self, decision_node: XmlNode<'_, '_>) -> Result<(), ConvertError> {
        let name = name_ref_attr(decision_node, "name")?;
        let switch =
            child_element(decision_node, "switch").ok_or_else(|| ConvertError::MissingChild {
                node: name.clone(),
                child: "switch".to_string(),
            })?;

        let factory = self.registry.control("decision")?;
        let mapper = factory.create(&self.mapper_input(decision_node, name.clone()))?;

        let mut node = ParsedNode::new(mapper);
        let mut defaults = 0;
        for case in switch.children().filter(|n| n.is_element()) {
            if case.tag_name().name() == "default" {
                defaults += 1;
            }
            if case.has_attribute("to") {
                node.add_downstream_node_name(name_ref_attr(case, "to")?);
            }
        }
        if defaults != 1 {
            warn!(name = %name, defaults, "decision node does not have exactly one default branch");
        }

        info!(name = %name, "parsed decision node");
        self.insert_node(node)
    }

    /// Attach `<file>` references through the explicit capability cast; a
    /// mapper without the capability is a configuration error, not a
    /// silent no-op.
    fn attach_file_refs(
        &self,
        action_node: XmlNode<'_, '_>,
        name: &str,
        mapper: &mut dyn Mapper,
    ) -> Result<(), ConvertError> {
        let paths = child_texts(action_node, "file");
        if paths.is_empty() {
            return Ok(());
        }
        let collector =
            mapper
                .as_file_collector()
                .ok_or_else(|| ConvertError::UnsupportedCapability {
                    node: name.to_string(),
                    capability: "file".to_string(),
                })?;
        for path in paths {
            collector.add_file(el::replace_el_with_var(&path, self.params));
        }
        Ok(())
    }

    /// Same contract as `attach_file_refs`, for `<archive>` references.
    fn attach_archive_refs(
        &self,
        action_node: XmlNode<'_, '_>,
        name: &str,
        mapper: &mut dyn Mapper,
    ) -> Result<(), ConvertError> {
        let paths = child_texts(action_node, "archive");
        if paths.is_empty() {
            return Ok(());
        }
        let collector =
            mapper
                .as_archive_collector()
                .ok_or_else(|| ConvertError::UnsupportedCapability {
                    node: name.to_string(),
                    capability: "archive".to_string(),
                })?;
        for path in paths {
            collector.add_archive(el::replace_el_with_var(&path, self.params));
        }
        Ok(())
    }

    fn mapper_input<'d, 'input>(
        &'d self,
        element: XmlNode<'d, 'input>,
        name: String,
    ) -> MapperInput<'d, 'input> {
        MapperInput {
            element,
            name,
            dag_name: &self.dag_name,
            params: self.params,
            input_directory: &self.input_directory,
            output_directory: &self.output_directory,
        }
    }

    /// Insert a completed node, folding its mapper's import set into the
    /// workflow-wide dependency set.
    fn insert_node(&mut self, node: ParsedNode) -> Result<(), ConvertError> {
        self.workflow
            .dependencies
            .extend(node.mapper().required_imports());
        self.workflow.nodes.insert(node)
    }

    /// Every name referenced by an edge must resolve once parsing is
    /// done; anything else would silently drop control flow later.
    fn validate_references(&self) -> Result<(), ConvertError> {
        for node in self.workflow.nodes.iter() {
            for downstream in node.downstream_names() {
                if !self.workflow.nodes.contains(downstream) {
                    return Err(ConvertError::DanglingReference {
                        node: node.name().to_string(),
                        target: downstream.clone(),
                    });
                }
            }
            if let Some(error_name) = node.error_name() {
                if !self.workflow.nodes.contains(error_name) {
                    return Err(ConvertError::DanglingReference {
                        node: node.name().to_string(),
                        target: error_name.to_string(),
                    });
                }
                if node.downstream_names().iter().any(|d| d == error_name) {
                    warn!(
                        name = %node.name(),
                        target = %error_name,
                        "error edge points at one of the node's own success targets"
                    );
                }
            }
        }
        Ok(())
    }
}

/// Fetch and normalize a name-valued attribute (`name`, `to`, `error`,
/// `start`). Normalization happens here, at the single point where names
/// enter the system, so declarations and references always agree.
fn name_ref_attr(node: XmlNode<'_, '_>, attribute: &str) -> Result<String, ConvertError> {
    node.attribute(attribute)
        .map(normalize_task_name)
        .ok_or_else(|| ConvertError::MissingAttribute {
            element: node.tag_name().name().to_string(),
            attribute: attribute.to_string(),
        })
}

fn child_element<'a, 'input>(
    node: XmlNode<'a, 'input>,
    tag: &str,
) -> Option<XmlNode<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == tag)
}

fn child_texts(node: XmlNode<'_, '_>, tag: &str) -> Vec<String> {
    node.children()
        .filter(|n| n.is_element() && n.tag_name().name() == tag)
        .filter_map(|n| n.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Locate a root-level node by its (normalized) name attribute.
fn find_node_by_name<'a, 'input>(
    root: XmlNode<'a, 'input>,
    name: &str,
) -> Option<XmlNode<'a, 'input>> {
    root.children().find(|n| {
        n.is_element()
            && n.attribute("name")
                .map(|raw| normalize_task_name(raw) == name)
                .unwrap_or(false)
    })
}
