use std::path::PathBuf;
use std::process::Command;

fn archeval_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_archeval"))
}

fn write_model(dir: &tempfile::TempDir) -> PathBuf {
    let model = r#"{
        "name": "webshop",
        "data_aggregates": [{"id": "da1", "name": "orders"}],
        "infrastructures": [{"id": "i1", "name": "cluster"}],
        "components": [
            {
                "id": "s1", "name": "order service", "kind": "service",
                "endpoints": [
                    {"id": "ee1", "name": "place order", "external": true,
                     "properties": {"protocol": "https"}},
                    {"id": "e1", "name": "get order"}
                ],
                "data_uses": [{"data": "da1", "usage_relation": "usage"}]
            },
            {
                "id": "db", "name": "order db", "kind": "storage-backing-service",
                "endpoints": [{"id": "e2", "name": "query orders"}]
            }
        ],
        "links": [{"id": "l1", "source": "s1", "target_endpoint": "e2"}],
        "deployment_mappings": [
            {"id": "dm1", "component": "s1", "host": "i1", "properties": {"replicas": 2}}
        ],
        "request_traces": [
            {"id": "rq1", "name": "order placement", "external_endpoint": "ee1",
             "links": [["l1"]]}
        ]
    }"#;
    let path = dir.path().join("model.json");
    std::fs::write(&path, model).expect("failed to write model file");
    path
}

#[test]
fn test_evaluate_prints_measures_and_aspects() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let model = write_model(&dir);

    let output = archeval_cmd()
        .args(["evaluate", model.to_str().unwrap()])
        .output()
        .expect("failed to run archeval evaluate");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        output.status.success(),
        "evaluate failed: stdout={stdout}, stderr={stderr}"
    );
    assert!(stdout.contains("System measures"), "missing measures: {stdout}");
    assert!(stdout.contains("Quality aspects"), "missing aspects: {stdout}");
    assert!(
        stdout.contains("externallyAvailableEndpoints: 1"),
        "wrong endpoint count: {stdout}"
    );
}

#[test]
fn test_evaluate_json_is_parsable() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let model = write_model(&dir);

    let output = archeval_cmd()
        .args(["evaluate", model.to_str().unwrap(), "--format", "json"])
        .output()
        .expect("failed to run archeval evaluate");

    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("output is not valid JSON");
    assert_eq!(parsed["system"], "webshop");
    assert_eq!(parsed["system_measures"]["externallyAvailableEndpoints"], 1.0);
    assert_eq!(
        parsed["request_trace_measures"]["rq1"]["requestTraceLength"],
        1.0
    );
    assert!(parsed["evaluation"]["quality_aspects"].is_object());
}

#[test]
fn test_measures_scope_selection() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let model = write_model(&dir);

    let output = archeval_cmd()
        .args([
            "measures",
            model.to_str().unwrap(),
            "--scope",
            "request-traces",
        ])
        .output()
        .expect("failed to run archeval measures");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("rq1"), "missing trace section: {stdout}");
    assert!(
        stdout.contains("numberOfCyclesInRequestTraces: 0"),
        "missing cycle measure: {stdout}"
    );

    let output = archeval_cmd()
        .args(["measures", model.to_str().unwrap(), "--scope", "nonsense"])
        .output()
        .expect("failed to run archeval measures");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_export_emits_service_template() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let model = write_model(&dir);

    let output = archeval_cmd()
        .args(["export", model.to_str().unwrap()])
        .output()
        .expect("failed to run archeval export");

    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("output is not valid JSON");
    assert_eq!(parsed["tosca_definitions_version"], "tosca_simple_yaml_1_3");
    assert_eq!(parsed["metadata"]["template_name"], "webshop");
    let nodes = parsed["topology_template"]["node_templates"]
        .as_object()
        .expect("node templates missing");
    assert!(nodes.contains_key("order_service"));
    assert!(nodes.contains_key("order_db"));
}

#[test]
fn test_unknown_references_warn_but_do_not_fail() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let model = r#"{
        "name": "broken",
        "components": [{"id": "s1", "name": "lonely"}],
        "links": [{"id": "l1", "source": "s1", "target_endpoint": "ghost"}]
    }"#;
    let path = dir.path().join("model.json");
    std::fs::write(&path, model).unwrap();

    let output = archeval_cmd()
        .args(["evaluate", path.to_str().unwrap()])
        .output()
        .expect("failed to run archeval evaluate");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "should not fail on dangling refs");
    assert!(
        stderr.contains("Warning") && stderr.contains("ghost"),
        "expected a warning about the dangling link: {stderr}"
    );
}

#[test]
fn test_malformed_model_fails_with_context() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("model.json");
    std::fs::write(&path, "{ not json").unwrap();

    let output = archeval_cmd()
        .args(["evaluate", path.to_str().unwrap()])
        .output()
        .expect("failed to run archeval evaluate");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(2));
    assert!(
        stderr.contains("failed to parse model file"),
        "missing parse context: {stderr}"
    );
}

#[test]
fn test_init_creates_config() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let output = archeval_cmd()
        .args(["init"])
        .current_dir(dir.path())
        .output()
        .expect("failed to run archeval init");

    assert!(output.status.success(), "init should succeed");

    let config_path = dir.path().join(".archeval.toml");
    assert!(config_path.exists(), ".archeval.toml should be created");
    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[output]"));
    assert!(content.contains("[export]"));
}
