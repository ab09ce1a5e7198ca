// crates/liftconvert/tests/converter_test.rs

use liftconvert::{Converter, ConverterOptions, MapperRegistry};
use std::fs;
use std::path::Path;

fn registry() -> MapperRegistry {
    let mut registry = MapperRegistry::new();
    liftnodes::register_all(&mut registry);
    registry
}

const DEMO_WORKFLOW: &str = r#"
<workflow-app xmlns="uri:oozie:workflow:0.5" name="demo-workflow">
    <start to="cleanup-node"/>
    <action name="cleanup-node">
        <fs>
            <delete path="${nameNode}/output"/>
            <mkdir path="${nameNode}/output"/>
        </fs>
        <ok to="pig-node"/>
        <error to="fail"/>
    </action>
    <action name="pig-node">
        <pig>
            <script>transform.pig</script>
            <param>OUTPUT=${nameNode}/output</param>
        </pig>
        <ok to="end-node"/>
        <error to="fail"/>
    </action>
    <kill name="fail">
        <message>Workflow failed at [${wf:lastErrorNode()}]</message>
    </kill>
    <end name="end-node"/>
</workflow-app>
"#;

fn write_demo_input(input_dir: &Path) {
    fs::create_dir_all(input_dir).unwrap();
    fs::write(input_dir.join("workflow.xml"), DEMO_WORKFLOW).unwrap();
    fs::write(
        input_dir.join("job.properties"),
        "nameNode=hdfs://localhost:8020\nexamplesRoot=examples\n",
    )
    .unwrap();
    fs::write(input_dir.join("transform.pig"), "-- pig script\n").unwrap();
}

fn convert_demo(input_dir: &Path, output_dir: &Path) -> std::path::PathBuf {
    let converter = Converter::new(ConverterOptions {
        dag_name: Some("demo_workflow".to_string()),
        input_directory: input_dir.to_path_buf(),
        output_directory: output_dir.to_path_buf(),
        user: Some("test_user".to_string()),
        start_days_ago: 3,
        schedule_interval: 1,
    })
    .unwrap();
    converter.convert(&registry()).unwrap()
}

#[test]
fn generates_a_complete_dag_file() {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("demo");
    let output_dir = dir.path().join("out");
    write_demo_input(&input_dir);

    let output_path = convert_demo(&input_dir, &output_dir);
    assert_eq!(output_path, output_dir.join("demo_workflow.py"));

    let text = fs::read_to_string(&output_path).unwrap();

    // Imports come first, sorted and deduplicated.
    let first_fragment = text.find("DummyOperator").unwrap();
    for import in [
        "import datetime",
        "from airflow import models",
        "from airflow.utils.trigger_rule import TriggerRule",
        "from airflow.operators import bash_operator",
        "from airflow.contrib.operators import dataproc_operator",
    ] {
        let at = text.find(import).unwrap_or_else(|| panic!("missing import {import}"));
        assert!(at < first_fragment, "import {import} not in header");
        assert_eq!(text.matches(import).count(), 1, "duplicated import {import}");
    }

    // The parameter block carries resolved properties.
    assert!(text.contains("PARAMS = {"));
    assert!(text.contains(r#""nameNode": "hdfs://localhost:8020""#));
    assert!(text.contains(r#""user.name": "test_user""#));

    // DAG header with the CLI-provided schedule values.
    assert!(text.contains("'demo_workflow'"));
    assert!(text.contains("schedule_interval=datetime.timedelta(days=1)"));
    assert!(text.contains("start_date=dates.days_ago(3)"));

    // One fragment per node; fs expands into its sub-steps.
    assert!(text.contains("cleanup_node_fs_0"));
    assert!(text.contains("cleanup_node_fs_1"));
    assert!(text.contains("pig_node"));
    assert!(text.contains("trigger_rule='one_failed'"));

    // Relations land at the bottom at unit granularity.
    assert!(text.contains("cleanup_node_fs_1.set_downstream(pig_node)"));
    assert!(text.contains("cleanup_node_fs_1.set_downstream(fail)"));
    assert!(text.contains("pig_node.set_downstream(end_node)"));
}

#[test]
fn copies_script_assets_into_the_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("demo");
    let output_dir = dir.path().join("out");
    write_demo_input(&input_dir);

    convert_demo(&input_dir, &output_dir);

    assert!(output_dir.join("transform.pig").exists());
}

#[test]
fn output_directory_is_recreated() {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("demo");
    let output_dir = dir.path().join("out");
    write_demo_input(&input_dir);

    fs::create_dir_all(&output_dir).unwrap();
    fs::write(output_dir.join("stale.py"), "# leftover\n").unwrap();

    convert_demo(&input_dir, &output_dir);

    assert!(!output_dir.join("stale.py").exists());
    assert!(output_dir.join("demo_workflow.py").exists());
}

#[test]
fn failed_conversion_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("demo");
    let output_dir = dir.path().join("out");
    fs::create_dir_all(&input_dir).unwrap();
    // Action without an error edge: structural error.
    fs::write(
        input_dir.join("workflow.xml"),
        r#"
<workflow-app xmlns="uri:oozie:workflow:0.5" name="broken">
    <start to="task-a"/>
    <action name="task-a">
        <shell><exec>date</exec></shell>
        <ok to="end-node"/>
    </action>
    <end name="end-node"/>
</workflow-app>
"#,
    )
    .unwrap();

    let converter = Converter::new(ConverterOptions {
        dag_name: Some("broken".to_string()),
        input_directory: input_dir,
        output_directory: output_dir.clone(),
        user: Some("test_user".to_string()),
        start_days_ago: 0,
        schedule_interval: 0,
    })
    .unwrap();

    assert!(converter.convert(&registry()).is_err());
    assert!(!output_dir.exists(), "no partial output may be produced");
}

#[test]
fn dag_name_defaults_to_input_directory_basename() {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("monthly-report");
    write_demo_input(&input_dir);

    let converter = Converter::new(ConverterOptions {
        dag_name: None,
        input_directory: input_dir,
        output_directory: dir.path().join("out"),
        user: Some("test_user".to_string()),
        start_days_ago: 0,
        schedule_interval: 0,
    })
    .unwrap();

    assert_eq!(converter.dag_name(), "monthly-report");
}

#[test]
fn job_properties_resolve_into_params() {
    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("demo");
    write_demo_input(&input_dir);
    fs::write(
        input_dir.join("configuration.properties"),
        "outputRoot=${nameNode}/user/${user.name}/out\n",
    )
    .unwrap();

    let converter = Converter::new(ConverterOptions {
        dag_name: Some("demo".to_string()),
        input_directory: input_dir,
        output_directory: dir.path().join("out"),
        user: Some("test_user".to_string()),
        start_days_ago: 0,
        schedule_interval: 0,
    })
    .unwrap();

    assert_eq!(
        converter.params()["outputRoot"],
        "hdfs://localhost:8020/user/test_user/out"
    );
}
