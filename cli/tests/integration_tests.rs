use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn python_yml() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../declarations/python.yml")
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_node-schema"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run node-schema")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_accepts_bundled_declarations() {
    let path = python_yml();
    let out = run(&["check", path.to_str().unwrap()]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let text = stdout(&out);
    assert!(text.contains("Checked 29 node kind(s)."));
    let fingerprint = text
        .lines()
        .find_map(|line| line.strip_prefix("fingerprint: "))
        .unwrap();
    assert_eq!(fingerprint.len(), 64);
}

#[test]
fn check_rejects_dangling_reference() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yml");
    fs::write(
        &path,
        "version: \"1.0\"\nnodes:\n  - kind: Call\n    fields:\n      - { name: func, types: [expr], multiplicity: NEEDED }\n",
    )
    .unwrap();

    let out = run(&["check", path.to_str().unwrap()]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("error: invalid declarations: Call refers to unknown node kind expr"));
}

#[test]
fn check_without_sources_fails() {
    let out = run(&["check"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("No declaration sources"));
}

#[test]
fn check_reads_sources_from_config() {
    let dir = tempfile::tempdir().unwrap();
    fs::copy(python_yml(), dir.path().join("python.yml")).unwrap();
    let config = dir.path().join(".node-schema.yml");
    fs::write(&config, "version: \"1.0\"\ndeclarations:\n  - python.yml\n").unwrap();

    let out = run(&["check", "--config", config.to_str().unwrap()]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("Checked 29 node kind(s)."));
}

// ---------------------------------------------------------------------------
// show / kinds
// ---------------------------------------------------------------------------

#[test]
fn show_single_kind_as_text() {
    let path = python_yml();
    let out = run(&["show", path.to_str().unwrap(), "--kind", "If"]);
    assert!(out.status.success());
    assert_eq!(
        stdout(&out),
        "If(stmt):\n    test: expr\n    body: stmt+\n    orelse: stmt*\n"
    );
}

#[test]
fn show_as_json_is_parseable() {
    let path = python_yml();
    let out = run(&["show", path.to_str().unwrap(), "--kind", "Num", "--format", "json"]);
    assert!(out.status.success());

    let parsed: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(parsed[0]["kind"], "Num");
    assert_eq!(parsed[0]["fields"][0]["types"], serde_json::json!(["int", "float"]));
    assert_eq!(parsed[0]["fields"][0]["multiplicity"], "NEEDED");
}

#[test]
fn show_unknown_kind_fails() {
    let path = python_yml();
    let out = run(&["show", path.to_str().unwrap(), "--kind", "Lambda"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("unknown node kind: Lambda"));
}

#[test]
fn kinds_lists_parents() {
    let path = python_yml();
    let out = run(&["kinds", path.to_str().unwrap()]);
    assert!(out.status.success());
    let text = stdout(&out);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 29);
    assert_eq!(lines[0], "mod");
    assert!(lines.contains(&"FunctionDef (stmt)"));
    assert!(lines.contains(&"alias"));
}
