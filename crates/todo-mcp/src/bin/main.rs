//! todo-mcp CLI
//!
//! Runs the task tool server over stdio, or calls single tools from the
//! command line against the same task store.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mcp_server::prelude::*;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use todo_core::{FileStorage, TaskStorage};
use todo_mcp::config::{TodoConfig, KEYS};
use todo_mcp::logging::init_logging;
use todo_mcp::TodoMcpServer;

#[derive(Parser)]
#[command(name = "todo-mcp")]
#[command(version, about = "Task dependency coordinator exposed as JSON tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Task store file (overrides config and TODO_MCP_STORE)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Config file to use instead of the user and project files
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level or filter directive (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve tool requests on stdin/stdout
    Serve,

    /// Create a task
    Create {
        /// Unique task id
        task_id: String,

        /// Task title
        title: String,

        /// Id of a task this one depends on (repeatable)
        #[arg(long = "depends-on", value_name = "ID")]
        depends_on: Vec<String>,

        /// Metadata entry; VALUE is parsed as JSON when possible (repeatable)
        #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        meta: Vec<(String, Value)>,
    },

    /// Make TASK depend on ON
    Depend { task_id: String, depends_on: String },

    /// Attach CHILD as a subtask of PARENT
    Subtask { parent_id: String, subtask_id: String },

    /// Mark a task completed
    Complete { task_id: String },

    /// Show a task's status
    Status { task_id: String },

    /// List ready task ids
    Ready,

    /// List all tasks in dependency order
    List,

    /// Write the task table to an HTML file
    ExportHtml { path: PathBuf },

    /// List the registered tools
    Tools,

    /// Inspect or change configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Print the config file locations
    Path,
    /// Print one value
    Get { key: String },
    /// Set one value in the config file
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = TodoConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(store) = &cli.store {
        config.storage.path = store.clone();
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    init_logging(&config.logging.level, config.logging.format)?;

    let storage: Arc<dyn TaskStorage> = Arc::new(FileStorage::new(&config.storage.path));
    let server = TodoMcpServer::new(storage)?.with_announcement(config.server.announce_tools);

    match cli.command {
        Commands::Serve => {
            tracing::info!(store = %config.storage.path.display(), "Starting todo-mcp server in stdio mode");
            server.serve_stdio().await?;
        }
        Commands::Create {
            task_id,
            title,
            depends_on,
            meta,
        } => {
            let metadata: Map<String, Value> = meta.into_iter().collect();
            let output = call(
                &server,
                "create_task",
                json!({
                    "task_id": task_id,
                    "title": title,
                    "metadata": metadata,
                    "depends_on": depends_on,
                }),
            )
            .await?;
            println!("Created task {}", output["task_id"].as_str().unwrap_or(&task_id));
        }
        Commands::Depend { task_id, depends_on } => {
            let output = call(
                &server,
                "add_dependency",
                json!({"task_id": task_id, "depends_on": depends_on}),
            )
            .await?;
            println!(
                "Task {} now depends on {} ({})",
                task_id,
                depends_on,
                output["status"].as_str().unwrap_or("unknown")
            );
        }
        Commands::Subtask { parent_id, subtask_id } => {
            call(
                &server,
                "add_subtask",
                json!({"parent_id": parent_id, "subtask_id": subtask_id}),
            )
            .await?;
            println!("Added {} as subtask of {}", subtask_id, parent_id);
        }
        Commands::Complete { task_id } => {
            let output = call(&server, "mark_task_complete", json!({"task_id": task_id})).await?;
            println!("Completed task {}", task_id);
            for id in string_list(&output["unblocked"]) {
                println!("  unblocked: {}", id);
            }
            if let Some(parent) = output["parent_completed"].as_str() {
                println!("  parent completed: {}", parent);
            }
        }
        Commands::Status { task_id } => {
            let output = call(&server, "get_task_status", json!({"task_id": task_id})).await?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Ready => {
            let output = call(&server, "get_ready_tasks", json!({})).await?;
            for id in string_list(&output) {
                println!("{}", id);
            }
        }
        Commands::List => {
            let output = call(&server, "list_tasks", json!({})).await?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::ExportHtml { path } => {
            let output = call(&server, "export_html", json!({"path": path.display().to_string()})).await?;
            println!("Exported {} tasks to {}", output["tasks"], path.display());
        }
        Commands::Tools => {
            for def in server.registry().list() {
                match def.description {
                    Some(description) => println!("{:<20} {}", def.name, description),
                    None => println!("{}", def.name),
                }
            }
        }
        Commands::Config { action } => run_config(action, &config, cli.config.as_deref())?,
    }

    Ok(())
}

async fn call(server: &TodoMcpServer, tool: &str, input: Value) -> Result<Value> {
    let result = server
        .registry()
        .call(tool, input, &ToolContext::new())
        .await
        .map_err(|e| anyhow::anyhow!("{} ({})", e, e.code()))?;
    Ok(result.into_value())
}

fn run_config(action: ConfigAction, config: &TodoConfig, explicit: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(config)?);
        }
        ConfigAction::Path => match explicit {
            Some(path) => println!("config:  {}", path.display()),
            None => {
                match TodoConfig::user_path() {
                    Ok(path) => println!("user:    {}", path.display()),
                    Err(e) => println!("user:    <{}>", e),
                }
                println!("project: {}", TodoConfig::project_path().display());
            }
        },
        ConfigAction::Get { key } => match config.get(&key) {
            Some(value) => println!("{}", value),
            None => bail!("Unknown config key: {} (known keys: {})", key, KEYS.join(", ")),
        },
        ConfigAction::Set { key, value } => {
            let target = explicit
                .map(Path::to_path_buf)
                .unwrap_or_else(TodoConfig::project_path);
            let mut file_config = if target.exists() {
                TodoConfig::from_file(&target)?
            } else {
                TodoConfig::default()
            };
            file_config.set(&key, &value)?;
            file_config.save(&target)?;
            println!("Set {} = {} in {}", key, value, target.display());
        }
    }
    Ok(())
}

fn string_list(value: &Value) -> Vec<&str> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn parse_key_value(s: &str) -> std::result::Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{}`", s))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in `{}`", s));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_key_value("owner=alice").unwrap(), ("owner".to_string(), json!("alice")));
        assert_eq!(parse_key_value("points=3").unwrap(), ("points".to_string(), json!(3)));
        assert_eq!(parse_key_value("tags=[\"a\"]").unwrap(), ("tags".to_string(), json!(["a"])));
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_create_flags() {
        let cli = Cli::parse_from([
            "todo-mcp", "--store", "/tmp/t.json", "create", "b", "Task B", "--depends-on", "a", "--meta", "k=v",
        ]);
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/t.json")));
        match cli.command {
            Commands::Create { task_id, depends_on, meta, .. } => {
                assert_eq!(task_id, "b");
                assert_eq!(depends_on, vec!["a"]);
                assert_eq!(meta, vec![("k".to_string(), json!("v"))]);
            }
            _ => panic!("expected create"),
        }
    }
}
