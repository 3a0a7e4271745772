//! End-to-end script tests: YAML in, compiled tree out, executed against a
//! fresh context with the default expression engine.

use std::sync::Arc;

use serde_json::{Value, json};
use stagehand_actions::{standard_registry, standard_services};
use stagehand_engine::{Action, CompileError, Compiler};
use stagehand_types::{ConfigValue, ExecutionContext};

fn compile(source: &str) -> Result<Box<dyn Action>, CompileError> {
    let registry = standard_registry();
    let compiler = Compiler::new(&registry, Arc::new(standard_services()));
    let config: ConfigValue = serde_yaml::from_str(source).expect("valid yaml");
    compiler.compile(&config)
}

fn run(source: &str, context: &mut ExecutionContext) -> Value {
    compile(source)
        .expect("script compiles")
        .execute(context)
        .expect("script executes")
}

#[test]
fn script_counts_and_branches() {
    let script = r#"
- set: { attempts: 0, log: "''" }
- while: "attempts < 3"
  do:
    - set: { attempts: "attempts + 1" }
    - set: { log: "log + 'tick;'" }
- if: "attempts == 3"
  then:
    - set: { verdict: "'done after ' + attempts" }
  else:
    - set: { verdict: "'unexpected'" }
"#;

    let mut context = ExecutionContext::new();
    run(script, &mut context);

    assert_eq!(context.get("attempts"), Some(&json!(3)));
    assert_eq!(context.get("log"), Some(&json!("tick;tick;tick;")));
    assert_eq!(context.get("verdict"), Some(&json!("done after 3")));
}

#[test]
fn script_iterates_collections() {
    let script = r#"
- set: { total: 0 }
- foreach: prices
  as: price
  do:
    - set: { total: "total + price" }
"#;

    let mut context = ExecutionContext::new();
    context.set("prices", json!([3, 7, 20]));
    run(script, &mut context);

    assert_eq!(context.get("total"), Some(&json!(30)));
}

#[test]
fn series_yields_the_last_value() {
    let mut context = ExecutionContext::new();
    let last = run("[{set: {a: 1}}, {set: {b: \"a + 1\"}}]", &mut context);
    assert_eq!(last, json!(2));
}

#[test]
fn echo_interpolates_context_paths() {
    let mut context = ExecutionContext::new();
    context.set("app", json!({"name": "web", "region": "eu"}));
    let line = run("{echo: \"deploying ${{ app.name }} to ${{ app.region }}\"}", &mut context);
    assert_eq!(line, json!("deploying web to eu"));
}

#[test]
fn exec_feeds_later_steps() {
    let script = r#"
- exec: "echo stage-one"
  capture: result
- if: "result.status == 0"
  then: { set: { seen: "result.stdout" } }
"#;

    let mut context = ExecutionContext::new();
    run(script, &mut context);
    assert_eq!(context.get("seen"), Some(&json!("stage-one")));
}

#[test]
fn include_composes_scripts() {
    let dir = tempfile::tempdir().unwrap();
    let child = dir.path().join("child.yaml");
    std::fs::write(&child, "- set: {inner: \"'from child'\"}\n").unwrap();

    let script = format!("[{{include: \"{}\"}}, {{set: {{outer: inner}}}}]", child.display());
    let mut context = ExecutionContext::new();
    run(&script, &mut context);

    assert_eq!(context.get("outer"), Some(&json!("from child")));
}

#[test]
fn failing_step_aborts_the_series() {
    let script = r#"
- set: { before: 1 }
- exec: "false"
- set: { after: 1 }
"#;

    let mut context = ExecutionContext::new();
    let error = compile(script).expect("compiles").execute(&mut context).unwrap_err();

    assert_eq!(error.action, "exec");
    assert!(context.contains("before"));
    // The failure stopped the series before the final step.
    assert!(!context.contains("after"));
}

#[test]
fn unknown_action_fails_to_compile() {
    let error = compile("{rollback: {}}").err().unwrap();
    assert!(matches!(error, CompileError::NoMatchingAction(name) if name == "rollback"));
}

#[test]
fn bare_noop_reference_compiles_through_the_registry() {
    let mut context = ExecutionContext::new();
    assert_eq!(run("noop", &mut context), Value::Null);
}
