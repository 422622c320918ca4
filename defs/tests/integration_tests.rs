use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use node_schema_core::{Node, SchemaRegistry, Singleton, TreeError, Value};
use node_schema_defs::{DeclarationError, Declarations, ToolConfig};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn python_yml() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../declarations/python.yml")
}

static PYTHON: LazyLock<&'static SchemaRegistry> = LazyLock::new(|| {
    Declarations::from_file(python_yml())
        .unwrap()
        .into_registry()
        .unwrap()
        .seal()
        .unwrap()
});

fn name(id: &str, ctx: &str) -> Node {
    let ctx = PYTHON.node(ctx).unwrap();
    PYTHON
        .construct("Name", [Value::from(id), Value::from(ctx)])
        .unwrap()
}

fn num(n: i64) -> Node {
    PYTHON.construct("Num", [n]).unwrap()
}

// ---------------------------------------------------------------------------
// Bundled declarations
// ---------------------------------------------------------------------------

#[test]
fn test_python_declarations_load() {
    let decls = Declarations::from_file(python_yml()).unwrap();
    assert_eq!(decls.name.as_deref(), Some("python"));
    assert_eq!(decls.nodes.len(), 29);
    assert_eq!(PYTHON.len(), 29);
    assert!(PYTHON.is_a("FunctionDef", "stmt"));
    assert!(PYTHON.is_a("Load", "expr_context"));
    assert!(!PYTHON.is_a("Name", "stmt"));
}

#[test]
fn test_build_assignment_tree() {
    // x = f(1)
    let call = PYTHON
        .build("Call")
        .arg(name("f", "Load"))
        .field("args", Value::seq([num(1)]))
        .finish()
        .unwrap();
    let assign = PYTHON
        .build("Assign")
        .field("targets", Value::seq([name("x", "Store")]))
        .field("value", call)
        .finish()
        .unwrap();
    let mut module = PYTHON.node("Module").unwrap();
    module.push("body", assign).unwrap();

    module.finalize_tree().unwrap();
    assert_eq!(
        module.to_string(),
        "Module(body=[Assign(targets=[Name(id='x', ctx=Store())], \
         value=Call(func=Name(id='f', ctx=Load()), args=[Num(n=1)]))])"
    );
}

#[test]
fn test_statement_where_expression_expected_is_rejected() {
    let mut expr_stmt = PYTHON.node("Expr").unwrap();
    let pass = PYTHON.node("Pass").unwrap();
    let err = expr_stmt.set("value", pass).unwrap_err();
    assert!(err.is_wrong_type());
    assert_eq!(expr_stmt.get("value").unwrap().as_single(), None);
}

#[test]
fn test_name_constant_accepts_only_singletons() {
    let mut constant = PYTHON.node("NameConstant").unwrap();
    constant.set("value", Singleton::NULL).unwrap();
    constant.set("value", true).unwrap();
    assert!(constant.set("value", 0).unwrap_err().is_wrong_type());
    assert_eq!(constant.get("value").unwrap(), &Value::from(true));
}

#[test]
fn test_function_without_body_fails_deep_finalize() {
    let args = PYTHON.node("arguments").unwrap();
    let mut func = PYTHON
        .build("FunctionDef")
        .field("name", "main")
        .field("args", args)
        .finish()
        .unwrap();
    assert!(matches!(
        func.finalize().unwrap_err(),
        TreeError::Incomplete { fields, .. } if fields == vec!["body"]
    ));

    func.push("body", PYTHON.node("Pass").unwrap()).unwrap();
    let mut module = PYTHON.node("Module").unwrap();
    module.push("body", func).unwrap();
    module.finalize_tree().unwrap();
}

#[test]
fn test_global_names_must_be_identifiers() {
    let mut global = PYTHON.node("Global").unwrap();
    let err = global.set("names", Value::seq(["ok", "not.ok"])).unwrap_err();
    assert!(err.to_string().contains("element 1 is not identifier"));
    assert_eq!(global.get("names").unwrap().as_many(), Some(&[][..]));
}

// ---------------------------------------------------------------------------
// Directory and config loading
// ---------------------------------------------------------------------------

#[test]
fn test_directory_loading_merges_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("a_base.yml"),
        "version: \"1.0\"\nnodes:\n  - kind: expr\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("b_names.json"),
        r#"{"version": "2.0", "nodes": [{"kind": "Name", "extends": "expr", "fields": [
            {"name": "id", "types": ["identifier"], "multiplicity": "NEEDED"}]}]}"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let decls = Declarations::from_dir(dir.path()).unwrap();
    assert_eq!(decls.version, "1.0");
    let kinds: Vec<_> = decls.nodes.iter().map(|n| n.kind.as_str()).collect();
    assert_eq!(kinds, vec!["expr", "Name"]);

    let registry = decls.into_registry().unwrap().seal().unwrap();
    assert!(registry.is_a("Name", "expr"));
}

#[test]
fn test_empty_directory_has_no_declarations() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        Declarations::from_dir(dir.path()).unwrap_err(),
        DeclarationError::NoDeclarations(_)
    ));
}

#[test]
fn test_duplicate_kind_across_files_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    for file in ["one.yml", "two.yml"] {
        std::fs::write(
            dir.path().join(file),
            "version: \"1.0\"\nnodes:\n  - kind: expr\n",
        )
        .unwrap();
    }
    let err = Declarations::from_dir(dir.path())
        .unwrap()
        .into_registry()
        .unwrap_err();
    assert!(matches!(
        err,
        DeclarationError::SchemaError(TreeError::DuplicateKind(kind)) if kind == "expr"
    ));
}

#[test]
fn test_save_reload_keeps_fingerprint() {
    let dir = tempfile::tempdir().unwrap();
    let original = Declarations::from_file(python_yml()).unwrap();

    let json_path = dir.path().join("python.json");
    original.save(&json_path).unwrap();
    let reloaded = Declarations::from_file(&json_path).unwrap();

    assert_eq!(reloaded, original);
    assert_eq!(reloaded.fingerprint().unwrap(), original.fingerprint().unwrap());
}

#[test]
fn test_config_points_at_declarations() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(python_yml(), dir.path().join("python.yml")).unwrap();
    let config_path = dir.path().join(".node-schema.yml");
    std::fs::write(
        &config_path,
        "version: \"1.0\"\ndeclarations:\n  - python.yml\nlog_level: info\n",
    )
    .unwrap();

    let config = ToolConfig::load(&config_path).unwrap();
    let decls = config.load_declarations().unwrap();
    assert_eq!(decls.nodes.len(), 29);
}
