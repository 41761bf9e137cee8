//! Integration tests for the genconf binary
//!
//! Runs the built binary against project files in a temporary directory.
//! HOME points into the temporary directory so no user settings leak in.

use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const GENERATOR_YAML: &str = r#"
input:
  - static:
      count: 5
event:
  template:
    mode: chain
    templates:
      - head: { template: head.jinja }
      - body: { template: body.jinja }
    chain: [head, body, head]
output:
  - stdout: {}
"#;

const BROKEN_GENERATOR_YAML: &str = r#"
input:
  - cron:
      expression: "* * *"
      count: 1
event:
  template:
    mode: chain
    templates:
      - head: { template: head.jinja }
    chain: [head, tail]
output:
  - stdout: { stream: stdlog }
"#;

const FSM_GENERATOR_YAML: &str = r#"
input:
  - timer: { seconds: 0.5, count: 2 }
event:
  template:
    mode: fsm
    templates:
      - idle:
          template: idle.jinja
          initial: true
          transition: { to: busy, when: { gt: { shared.load: 0.8 } } }
      - busy:
          template: busy.jinja
          transition: { to: idle, when: { matches: { locals.msg: "(a)\\1" } } }
    samples:
      users: { type: csv, source: users.csv }
output:
  - file: { path: out.log, formatter: { format: template, template_path: line.jinja } }
  - http: { url: "http://collector/ingest" }
"#;

fn genconf(home: &Path, cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_genconf"))
        .args(args)
        .current_dir(cwd)
        .env("HOME", home)
        .env_remove("GENCONF_MAX_DEPTH")
        .env_remove("GENCONF_PROJECT_FILES")
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run genconf")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("home")).unwrap();
    fs::create_dir_all(temp.path().join("work")).unwrap();
    temp
}

#[test]
fn test_validate_discovers_project_file() {
    let temp = project();
    let work = temp.path().join("work");
    fs::write(work.join("generator.yml"), GENERATOR_YAML).unwrap();
    let nested = work.join("templates");
    fs::create_dir_all(&nested).unwrap();

    let output = genconf(&temp.path().join("home"), &nested, &["validate"]);
    assert!(output.status.success(), "{:?}", output);
    let out = stdout(&output);
    assert!(out.contains("is a valid generator document"));
    assert!(out.contains("template (chain mode, 2 template(s))"));
}

#[test]
fn test_validate_reports_error_table() {
    let temp = project();
    let work = temp.path().join("work");
    fs::write(work.join("generator.yml"), BROKEN_GENERATOR_YAML).unwrap();

    let output = genconf(&temp.path().join("home"), &work, &["-q", "validate", "generator.yml"]);
    assert!(!output.status.success());

    let out = stdout(&output);
    assert!(out.contains("input[0].cron.expression"));
    assert!(out.contains("output[0].stdout.stream"));
    assert!(out.contains("unknown_variant"));
}

#[test]
fn test_validate_json_error_array() {
    let temp = project();
    let work = temp.path().join("work");
    fs::write(work.join("generator.yml"), BROKEN_GENERATOR_YAML).unwrap();

    let output = genconf(
        &temp.path().join("home"),
        &work,
        &["-q", "validate", "--json", "generator.yml"],
    );
    assert!(!output.status.success());

    let errors: Value = serde_json::from_str(&stdout(&output)).unwrap();
    let errors = errors.as_array().unwrap();
    assert!(errors
        .iter()
        .any(|e| e["path"] == serde_json::json!(["input", 0, "cron", "expression"])));
    assert!(errors.iter().all(|e| e["kind"].is_string() && e["message"].is_string()));
}

#[test]
fn test_validate_condition_kind_with_depth_flag() {
    let temp = project();
    let work = temp.path().join("work");
    fs::write(
        work.join("guard.json"),
        r#"{"not": {"not": {"defined": "locals.x"}}}"#,
    )
    .unwrap();

    let home = temp.path().join("home");
    let output = genconf(&home, &work, &["validate", "guard.json", "--kind", "condition"]);
    assert!(output.status.success(), "{:?}", output);

    let output = genconf(
        &home,
        &work,
        &["-q", "--max-depth", "2", "validate", "guard.json", "--kind", "condition"],
    );
    assert!(!output.status.success());
    assert!(stdout(&output).contains("depth_exceeded"));
}

#[test]
fn test_settings_file_is_honoured() {
    let temp = project();
    let home = temp.path().join("home");
    let work = temp.path().join("work");
    fs::create_dir_all(home.join(".genconf")).unwrap();
    fs::write(
        home.join(".genconf").join("config.yaml"),
        "project-files: [pipeline.yaml]\n",
    )
    .unwrap();
    fs::write(work.join("pipeline.yaml"), GENERATOR_YAML).unwrap();

    let output = genconf(&home, &work, &["validate"]);
    assert!(output.status.success(), "{:?}", output);
    assert!(stdout(&output).contains("pipeline.yaml"));
}

#[test]
fn test_missing_project_file() {
    let temp = project();
    let output = genconf(
        &temp.path().join("home"),
        &temp.path().join("work"),
        &["-q", "validate"],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Project file not found"));
}

#[test]
fn test_show_fills_defaults() {
    let temp = project();
    let work = temp.path().join("work");
    fs::write(work.join("generator.yml"), GENERATOR_YAML).unwrap();

    let output = genconf(&temp.path().join("home"), &work, &["show", "--json"]);
    assert!(output.status.success(), "{:?}", output);

    let config: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(config["output"][0]["stdout"]["stream"], "stdout");
    assert_eq!(config["output"][0]["stdout"]["formatter"]["format"], "plain");
    assert_eq!(config["event"]["template"]["chain"][2], "head");
    assert_eq!(config["input"][0]["static"]["tags"], serde_json::json!([]));
}

#[test]
fn test_show_yaml() {
    let temp = project();
    let work = temp.path().join("work");
    fs::write(
        work.join("output.json"),
        r#"{"http": {"url": "http://localhost:8080/events"}}"#,
    )
    .unwrap();

    let output = genconf(
        &temp.path().join("home"),
        &work,
        &["show", "output.json", "--kind", "output"],
    );
    assert!(output.status.success(), "{:?}", output);

    let config: serde_yaml_ng::Value = serde_yaml_ng::from_str(&stdout(&output)).unwrap();
    assert_eq!(config["http"]["method"], serde_yaml_ng::Value::from("POST"));
    assert_eq!(config["http"]["success_code"], serde_yaml_ng::Value::from(201));
}

#[test]
fn test_show_output_validates_again() {
    let temp = project();
    let home = temp.path().join("home");
    let work = temp.path().join("work");
    fs::write(work.join("generator.yml"), FSM_GENERATOR_YAML).unwrap();

    let output = genconf(&home, &work, &["show"]);
    assert!(output.status.success(), "{:?}", output);
    let shown = stdout(&output);
    assert!(!shown.contains('!'), "{}", shown);

    fs::write(work.join("normalized.yml"), &shown).unwrap();
    let output = genconf(&home, &work, &["validate", "normalized.yml"]);
    assert!(output.status.success(), "{:?}", output);

    let output = genconf(&home, &work, &["show", "normalized.yml"]);
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(stdout(&output), shown);
}

#[test]
fn test_scan_directory() {
    let temp = project();
    let work = temp.path().join("work");
    fs::create_dir_all(work.join("a")).unwrap();
    fs::create_dir_all(work.join("b")).unwrap();
    fs::write(work.join("a").join("generator.yml"), GENERATOR_YAML).unwrap();
    fs::write(work.join("b").join("generator.yml"), BROKEN_GENERATOR_YAML).unwrap();
    fs::write(work.join("b").join("notes.txt"), "not a project file").unwrap();

    let output = genconf(&temp.path().join("home"), &work, &["-q", "scan", "--json"]);
    assert!(!output.status.success());

    let results: Value = serde_json::from_str(&stdout(&output)).unwrap();
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["valid"], true);
    assert_eq!(results[1]["valid"], false);
    assert!(results[1]["errors"].as_array().unwrap().len() >= 3);
}

#[test]
fn test_scan_all_valid() {
    let temp = project();
    let work = temp.path().join("work");
    fs::write(work.join("generator.yml"), GENERATOR_YAML).unwrap();

    let output = genconf(&temp.path().join("home"), &work, &["scan"]);
    assert!(output.status.success(), "{:?}", output);
    assert!(stdout(&output).contains("All 1 file(s) are valid"));
}

#[test]
fn test_version_json() {
    let temp = project();
    let output = genconf(
        &temp.path().join("home"),
        &temp.path().join("work"),
        &["version", "--json"],
    );
    assert!(output.status.success());

    let report: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert!(semver::Version::parse(report["version"].as_str().unwrap()).is_ok());
    assert_eq!(report["input_plugins"].as_array().map(Vec::len), Some(7));
    assert_eq!(report["schema_files"][0], "condition");
}
