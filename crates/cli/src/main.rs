use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use stagehand_actions::{standard_registry, standard_services};
use stagehand_engine::Compiler;
use stagehand_types::{ConfigValue, ExecutionContext, display_value};

#[derive(Parser)]
#[command(name = "stagehand", about = "Compile and run declarative action scripts", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a script and execute it
    Run {
        /// Path to the YAML script
        script: PathBuf,
        /// Seed a context variable; the value is parsed as JSON when possible
        #[arg(long = "var", value_name = "KEY=VALUE")]
        vars: Vec<String>,
        /// Print the result and final context as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compile a script without executing it
    Check {
        /// Path to the YAML script
        script: PathBuf,
    },
    /// List registered actions
    Actions,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { script, vars, json } => run_script(&script, &vars, json),
        Commands::Check { script } => check_script(&script),
        Commands::Actions => {
            for name in standard_registry().names() {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn load_script(path: &PathBuf) -> Result<ConfigValue> {
    let source = std::fs::read_to_string(path).with_context(|| format!("failed to read script '{}'", path.display()))?;
    serde_yaml::from_str(&source).with_context(|| format!("failed to parse script '{}'", path.display()))
}

fn run_script(path: &PathBuf, vars: &[String], json: bool) -> Result<()> {
    let config = load_script(path)?;
    let registry = standard_registry();
    let compiler = Compiler::new(&registry, Arc::new(standard_services()));
    let mut tree = compiler.compile(&config)?;

    let mut context = ExecutionContext::new();
    for var in vars {
        let (key, value) = parse_var(var)?;
        context.set(key, value);
    }

    let result = tree.execute(&mut context)?;
    if json {
        let report = serde_json::json!({"result": result, "context": context});
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !result.is_null() {
        println!("{}", display_value(&result));
    }
    Ok(())
}

fn check_script(path: &PathBuf) -> Result<()> {
    let config = load_script(path)?;
    let registry = standard_registry();
    let compiler = Compiler::new(&registry, Arc::new(standard_services()));
    compiler.compile(&config)?;
    println!("{}: ok", path.display());
    Ok(())
}

/// Splits `KEY=VALUE`, parsing the value as JSON when it looks like JSON and
/// falling back to a plain string otherwise.
fn parse_var(raw: &str) -> Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let parsed = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), parsed))
}
