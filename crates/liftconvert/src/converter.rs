use crate::parser::WorkflowParser;
use crate::properties::load_property_file;
use crate::registry::MapperRegistry;
use crate::relations::build_relations;
use crate::triggers::resolve_trigger_rules;
use liftcore::{templates, ConvertError, ParsedWorkflow, Relation, RelationSet, TriggerRule};
use minijinja::context;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use tracing::info;

const INDENT: usize = 4;

/// Options for one conversion run, straight from the CLI surface.
pub struct ConverterOptions {
    /// Output program name; defaults to the input directory's basename.
    pub dag_name: Option<String>,
    pub input_directory: PathBuf,
    pub output_directory: PathBuf,
    /// Substituted for the `user.name` parameter; defaults to `$USER`.
    pub user: Option<String>,
    pub start_days_ago: u32,
    pub schedule_interval: u32,
}

/// Drives one whole conversion: load parameters, parse the graph, run
/// the relation and trigger passes, render, and write the output file.
///
/// The three phases run strictly in sequence over the in-memory graph;
/// any structural error aborts before an output artifact exists.
pub struct Converter {
    dag_name: String,
    input_directory: PathBuf,
    output_directory: PathBuf,
    start_days_ago: u32,
    schedule_interval: u32,
    params: HashMap<String, String>,
}

impl Converter {
    pub fn new(options: ConverterOptions) -> Result<Self, ConvertError> {
        let dag_name = match options.dag_name {
            Some(name) => name,
            None => options
                .input_directory
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "workflow".to_string()),
        };

        let user = options
            .user
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_else(|| "airflow".to_string());
        let mut params = HashMap::from([("user.name".to_string(), user)]);
        load_property_file(&options.input_directory.join("job.properties"), &mut params)?;
        load_property_file(
            &options.input_directory.join("configuration.properties"),
            &mut params,
        )?;

        Ok(Self {
            dag_name,
            input_directory: options.input_directory,
            output_directory: options.output_directory,
            start_days_ago: options.start_days_ago,
            schedule_interval: options.schedule_interval,
            params,
        })
    }

    pub fn dag_name(&self) -> &str {
        &self.dag_name
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    /// Run the full conversion and return the generated file's path.
    pub fn convert(&self, registry: &MapperRegistry) -> Result<PathBuf, ConvertError> {
        let workflow_path = self.input_directory.join("workflow.xml");
        info!(path = %workflow_path.display(), "reading workflow");
        let xml = std::fs::read_to_string(&workflow_path)?;

        let parser = WorkflowParser::new(
            registry,
            &self.params,
            &self.dag_name,
            &self.input_directory,
            &self.output_directory,
        );
        let workflow = parser.parse(&xml)?;
        let relations = build_relations(&workflow.nodes);
        let trigger_rules = resolve_trigger_rules(&workflow.nodes);

        // Render the whole program before touching the output directory,
        // so a failed conversion leaves no partial artifact behind.
        let text = self.render_dag(&workflow, &relations, &trigger_rules)?;

        self.recreate_output_directory()?;
        let output_path = self.output_directory.join(format!("{}.py", self.dag_name));
        std::fs::write(&output_path, text)?;
        info!(path = %output_path.display(), "saved generated DAG");

        for node in workflow.nodes.iter() {
            node.mapper()
                .copy_extra_assets(&self.input_directory, &self.output_directory)?;
        }

        Ok(output_path)
    }

    /// Assemble the generated program: imports, parameter block, DAG
    /// header, one fragment per node in insertion order, then the
    /// control-flow link statements.
    fn render_dag(
        &self,
        workflow: &ParsedWorkflow,
        relations: &RelationSet,
        trigger_rules: &BTreeMap<String, TriggerRule>,
    ) -> Result<String, ConvertError> {
        let mut out = String::new();

        for dependency in &workflow.dependencies {
            out.push_str(dependency);
            out.push('\n');
        }
        out.push('\n');

        let ordered_params: BTreeMap<&String, &String> = self.params.iter().collect();
        out.push_str("PARAMS = ");
        out.push_str(&serde_json::to_string_pretty(&ordered_params)?);
        out.push_str("\n\n");

        out.push_str(&templates::render_template(
            "dag.tpl",
            context! {
                dag_name => workflow.dag_name,
                schedule_interval => self.schedule_interval,
                start_days_ago => self.start_days_ago,
            },
        )?);

        for node in workflow.nodes.iter() {
            let rule = trigger_rules
                .get(node.name())
                .copied()
                .unwrap_or(TriggerRule::Dummy);
            let fragment = node.mapper().convert_to_text(rule)?;
            out.push_str(&indent(&fragment, INDENT));
            info!(name = %node.name(), "wrote fragment");
        }
        out.push('\n');

        let links: Vec<&Relation> = relations.iter().collect();
        let rendered = templates::render_template("relations.tpl", context! { relations => links })?;
        out.push_str(&indent(&rendered, INDENT));

        Ok(out)
    }

    /// The output directory is recreated wholesale; stale artifacts from
    /// a previous conversion must not survive.
    fn recreate_output_directory(&self) -> Result<(), ConvertError> {
        match std::fs::remove_dir_all(&self.output_directory) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        std::fs::create_dir_all(&self.output_directory)?;
        Ok(())
    }
}

/// Indent every non-empty line by the given number of spaces.
fn indent(text: &str, spaces: usize) -> String {
    let pad = " ".repeat(spaces);
    let mut out = String::new();
    for line in text.lines() {
        if !line.is_empty() {
            out.push_str(&pad);
            out.push_str(line);
        }
        out.push('\n');
    }
    out
}
