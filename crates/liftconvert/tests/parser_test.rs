// crates/liftconvert/tests/parser_test.rs

use liftconvert::{
    build_relations, resolve_trigger_rules, MapperRegistry, WorkflowParser,
};
use liftcore::{ConvertError, ParsedWorkflow, Relation, TriggerRule};
use std::collections::HashMap;
use std::path::Path;

fn registry() -> MapperRegistry {
    let mut registry = MapperRegistry::new();
    liftnodes::register_all(&mut registry);
    registry
}

fn parse(xml: &str) -> Result<ParsedWorkflow, ConvertError> {
    let registry = registry();
    let params = HashMap::new();
    let parser = WorkflowParser::new(&registry, &params, "demo", Path::new("/in"), Path::new("/out"));
    parser.parse(xml)
}

fn parse_ok(xml: &str) -> ParsedWorkflow {
    parse(xml).expect("workflow should parse")
}

/// The linear scenario from the conversion contract: start -> A,
/// A{ok->B, error->K}, B{ok->end, error->K}.
const LINEAR_WORKFLOW: &str = r#"
<workflow-app xmlns="uri:oozie:workflow:0.5" name="linear-demo">
    <start to="task-a"/>
    <action name="task-a">
        <shell><exec>date</exec></shell>
        <ok to="task-b"/>
        <error to="fail"/>
    </action>
    <action name="task-b">
        <shell><exec>hostname</exec></shell>
        <ok to="end-node"/>
        <error to="fail"/>
    </action>
    <kill name="fail">
        <message>workflow failed</message>
    </kill>
    <end name="end-node"/>
</workflow-app>
"#;

#[test]
fn parses_all_node_types_with_normalized_names() {
    let workflow = parse_ok(LINEAR_WORKFLOW);

    assert!(workflow.nodes.contains("task_a"));
    assert!(workflow.nodes.contains("task_b"));
    assert!(workflow.nodes.contains("fail"));
    assert!(workflow.nodes.contains("end_node"));

    let start_name = workflow
        .nodes
        .names()
        .find(|n| n.starts_with("start_node_"))
        .expect("start node gets a generated name");
    let start = workflow.nodes.get(start_name).unwrap();
    assert_eq!(start.downstream_names(), ["task_a"]);
}

#[test]
fn action_edges_are_recorded() {
    let workflow = parse_ok(LINEAR_WORKFLOW);

    let a = workflow.nodes.get("task_a").unwrap();
    assert_eq!(a.downstream_names(), ["task_b"]);
    assert_eq!(a.error_name(), Some("fail"));

    let b = workflow.nodes.get("task_b").unwrap();
    assert_eq!(b.downstream_names(), ["end_node"]);
    assert_eq!(b.error_name(), Some("fail"));
}

#[test]
fn relations_cover_every_edge_exactly_once() {
    let workflow = parse_ok(LINEAR_WORKFLOW);
    let relations = build_relations(&workflow.nodes);

    for (from, to) in [
        ("task_a", "task_b"),
        ("task_a", "fail"),
        ("task_b", "end_node"),
        ("task_b", "fail"),
    ] {
        assert!(
            relations.contains(&Relation::new(from, to)),
            "missing relation {from} -> {to}"
        );
    }
    // start -> task_a plus the four above
    assert_eq!(relations.len(), 5);
}

#[test]
fn relation_rebuild_is_idempotent() {
    let workflow = parse_ok(LINEAR_WORKFLOW);

    let first = build_relations(&workflow.nodes);
    let second = build_relations(&workflow.nodes);

    let a: Vec<_> = first.iter().cloned().collect();
    let b: Vec<_> = second.iter().cloned().collect();
    assert_eq!(a, b);
}

#[test]
fn trigger_classification_matches_edge_topology() {
    let workflow = parse_ok(LINEAR_WORKFLOW);
    let rules = resolve_trigger_rules(&workflow.nodes);

    assert_eq!(rules["task_a"], TriggerRule::AllSuccess);
    assert_eq!(rules["task_b"], TriggerRule::AllSuccess);
    assert_eq!(rules["fail"], TriggerRule::OneFailed);
    assert_eq!(rules["end_node"], TriggerRule::AllSuccess);

    let start_name = workflow
        .nodes
        .names()
        .find(|n| n.starts_with("start_node_"))
        .unwrap();
    assert_eq!(rules[start_name], TriggerRule::Dummy);
}

#[test]
fn fork_paths_converge_on_join() {
    let xml = r#"
<workflow-app xmlns="uri:oozie:workflow:0.5" name="fork-demo">
    <start to="fork-node"/>
    <fork name="fork-node">
        <path start="left-task"/>
        <path start="right-task"/>
    </fork>
    <action name="left-task">
        <shell><exec>true</exec></shell>
        <ok to="join-node"/>
        <error to="fail"/>
    </action>
    <action name="right-task">
        <shell><exec>true</exec></shell>
        <ok to="join-node"/>
        <error to="fail"/>
    </action>
    <join name="join-node" to="end-node"/>
    <kill name="fail"><message>boom</message></kill>
    <end name="end-node"/>
</workflow-app>
"#;
    let workflow = parse_ok(xml);
    let relations = build_relations(&workflow.nodes);

    // One edge from the fork into each path, one from each path into the
    // join.
    for (from, to) in [
        ("fork_node", "left_task"),
        ("fork_node", "right_task"),
        ("left_task", "join_node"),
        ("right_task", "join_node"),
        ("join_node", "end_node"),
    ] {
        assert!(
            relations.contains(&Relation::new(from, to)),
            "missing relation {from} -> {to}"
        );
    }

    // Each parallel path was parsed exactly once even though fork
    // recursion visits it before the root-level iteration does.
    assert_eq!(
        workflow.nodes.names().filter(|n| *n == "left_task").count(),
        1
    );

    let rules = resolve_trigger_rules(&workflow.nodes);
    assert_eq!(rules["join_node"], TriggerRule::AllSuccess);
}

#[test]
fn decision_branches_fan_out_independently() {
    let xml = r#"
<workflow-app xmlns="uri:oozie:workflow:0.5" name="decision-demo">
    <start to="route"/>
    <decision name="route">
        <switch>
            <case to="big-input">${fs:fileSize(inputDir) gt 1024}</case>
            <case to="small-input">${fs:fileSize(inputDir) le 1024}</case>
            <default to="end-node"/>
        </switch>
    </decision>
    <action name="big-input">
        <shell><exec>true</exec></shell>
        <ok to="end-node"/>
        <error to="fail"/>
    </action>
    <action name="small-input">
        <shell><exec>true</exec></shell>
        <ok to="end-node"/>
        <error to="fail"/>
    </action>
    <kill name="fail"><message>boom</message></kill>
    <end name="end-node"/>
</workflow-app>
"#;
    let workflow = parse_ok(xml);

    let decision = workflow.nodes.get("route").unwrap();
    assert_eq!(
        decision.downstream_names(),
        ["big_input", "small_input", "end_node"]
    );

    let relations = build_relations(&workflow.nodes);
    for to in ["big_input", "small_input", "end_node"] {
        assert!(relations.contains(&Relation::new("route", to)));
    }
}

#[test]
fn missing_ok_edge_aborts_the_conversion() {
    let xml = r#"
<workflow-app xmlns="uri:oozie:workflow:0.5" name="broken">
    <start to="task-a"/>
    <action name="task-a">
        <shell><exec>date</exec></shell>
        <error to="fail"/>
    </action>
    <kill name="fail"><message>boom</message></kill>
</workflow-app>
"#;
    let err = parse(xml).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::MissingChild { node, child } if node == "task_a" && child == "ok"
    ));
}

#[test]
fn missing_error_edge_aborts_the_conversion() {
    let xml = r#"
<workflow-app xmlns="uri:oozie:workflow:0.5" name="broken">
    <start to="task-a"/>
    <action name="task-a">
        <shell><exec>date</exec></shell>
        <ok to="end-node"/>
    </action>
    <end name="end-node"/>
</workflow-app>
"#;
    let err = parse(xml).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::MissingChild { child, .. } if child == "error"
    ));
}

#[test]
fn dangling_reference_aborts_the_conversion() {
    let xml = r#"
<workflow-app xmlns="uri:oozie:workflow:0.5" name="broken">
    <start to="task-a"/>
    <action name="task-a">
        <shell><exec>date</exec></shell>
        <ok to="nowhere"/>
        <error to="fail"/>
    </action>
    <kill name="fail"><message>boom</message></kill>
</workflow-app>
"#;
    let err = parse(xml).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::DanglingReference { node, target }
            if node == "task_a" && target == "nowhere"
    ));
}

#[test]
fn duplicate_node_names_are_rejected() {
    let xml = r#"
<workflow-app xmlns="uri:oozie:workflow:0.5" name="broken">
    <start to="end-node"/>
    <end name="end-node"/>
    <end name="end-node"/>
</workflow-app>
"#;
    let err = parse(xml).unwrap_err();
    assert!(matches!(err, ConvertError::DuplicateName(name) if name == "end_node"));
}

#[test]
fn unknown_action_type_degrades_to_fallback() {
    let xml = r#"
<workflow-app xmlns="uri:oozie:workflow:0.5" name="forward-compat">
    <start to="mystery"/>
    <action name="mystery">
        <quantum-job><qubits>3</qubits></quantum-job>
        <ok to="end-node"/>
        <error to="fail"/>
    </action>
    <kill name="fail"><message>boom</message></kill>
    <end name="end-node"/>
</workflow-app>
"#;
    let workflow = parse_ok(xml);
    let node = workflow.nodes.get("mystery").unwrap();
    assert_eq!(node.mapper().mapper_type(), "unknown");

    let text = node
        .mapper()
        .convert_to_text(TriggerRule::AllSuccess)
        .unwrap();
    assert!(text.contains("quantum-job"));
    assert!(text.contains("DummyOperator"));
}

#[test]
fn unknown_root_tags_are_skipped() {
    let xml = r#"
<workflow-app xmlns="uri:oozie:workflow:0.5" name="forward-compat">
    <parameters><property><name>x</name></property></parameters>
    <start to="end-node"/>
    <end name="end-node"/>
    <sla-info>ignored</sla-info>
</workflow-app>
"#;
    let workflow = parse_ok(xml);
    // start + end only
    assert_eq!(workflow.nodes.len(), 2);
}

#[test]
fn file_refs_on_incapable_mapper_are_a_configuration_error() {
    let xml = r#"
<workflow-app xmlns="uri:oozie:workflow:0.5" name="broken">
    <start to="task-a"/>
    <action name="task-a">
        <shell><exec>date</exec></shell>
        <ok to="end-node"/>
        <error to="fail"/>
        <file>lib.jar</file>
    </action>
    <kill name="fail"><message>boom</message></kill>
    <end name="end-node"/>
</workflow-app>
"#;
    let err = parse(xml).unwrap_err();
    assert!(matches!(
        err,
        ConvertError::UnsupportedCapability { node, capability }
            if node == "task_a" && capability == "file"
    ));
}

#[test]
fn prepare_block_expands_into_two_chained_nodes() {
    let xml = r#"
<workflow-app xmlns="uri:oozie:workflow:0.5" name="prepare-demo">
    <start to="crunch"/>
    <action name="crunch">
        <pig>
            <prepare>
                <delete path="/data/out"/>
                <mkdir path="/data/out"/>
            </prepare>
            <script>crunch.pig</script>
        </pig>
        <ok to="end-node"/>
        <error to="fail"/>
    </action>
    <kill name="fail"><message>boom</message></kill>
    <end name="end-node"/>
</workflow-app>
"#;
    let workflow = parse_ok(xml);

    let pre = workflow.nodes.get("crunch").expect("pre-step keeps the name");
    assert_eq!(pre.mapper().mapper_type(), "prepare");
    assert_eq!(pre.downstream_names(), ["crunch_prepared"]);
    assert_eq!(pre.error_name(), None);

    let action = workflow.nodes.get("crunch_prepared").unwrap();
    assert_eq!(action.mapper().mapper_type(), "pig");
    assert_eq!(action.downstream_names(), ["end_node"]);
    assert_eq!(action.error_name(), Some("fail"));

    let relations = build_relations(&workflow.nodes);
    assert!(relations.contains(&Relation::new("crunch", "crunch_prepared")));
    assert!(relations.contains(&Relation::new("crunch_prepared", "end_node")));
    assert!(relations.contains(&Relation::new("crunch_prepared", "fail")));

    // The prepared action runs only once its pre-step succeeded.
    let rules = resolve_trigger_rules(&workflow.nodes);
    assert_eq!(rules["crunch_prepared"], TriggerRule::AllSuccess);
}

#[test]
fn multi_step_fs_node_exposes_boundary_units() {
    let xml = r#"
<workflow-app xmlns="uri:oozie:workflow:0.5" name="fs-demo">
    <start to="cleanup"/>
    <action name="cleanup">
        <fs>
            <delete path="/data/stale"/>
            <mkdir path="/data/fresh"/>
        </fs>
        <ok to="end-node"/>
        <error to="fail"/>
    </action>
    <kill name="fail"><message>boom</message></kill>
    <end name="end-node"/>
</workflow-app>
"#;
    let workflow = parse_ok(xml);
    let relations = build_relations(&workflow.nodes);

    // Inbound edges attach to the first sub-step, outbound edges leave
    // from the last one.
    let start_name = workflow
        .nodes
        .names()
        .find(|n| n.starts_with("start_node_"))
        .unwrap()
        .to_string();
    assert!(relations.contains(&Relation::new(start_name, "cleanup_fs_0")));
    assert!(relations.contains(&Relation::new("cleanup_fs_1", "end_node")));
    assert!(relations.contains(&Relation::new("cleanup_fs_1", "fail")));
}

#[test]
fn classification_is_independent_of_declaration_order() {
    // The same graph as LINEAR_WORKFLOW with root-level node order
    // shuffled; classification must only depend on the edge set.
    let shuffled = r#"
<workflow-app xmlns="uri:oozie:workflow:0.5" name="linear-demo">
    <kill name="fail"><message>workflow failed</message></kill>
    <action name="task-b">
        <shell><exec>hostname</exec></shell>
        <ok to="end-node"/>
        <error to="fail"/>
    </action>
    <end name="end-node"/>
    <action name="task-a">
        <shell><exec>date</exec></shell>
        <ok to="task-b"/>
        <error to="fail"/>
    </action>
    <start to="task-a"/>
</workflow-app>
"#;
    let original = resolve_trigger_rules(&parse_ok(LINEAR_WORKFLOW).nodes);
    let reordered = resolve_trigger_rules(&parse_ok(shuffled).nodes);

    for name in ["task_a", "task_b", "fail", "end_node"] {
        assert_eq!(original[name], reordered[name], "rule differs for {name}");
    }
}
