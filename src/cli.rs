use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::path::PathBuf;

use crate::config::Config;
use crate::core::{CareAction, MoodState};
use crate::mcp::{McpServer, ToolDispatcher};

#[derive(Parser)]
#[command(name = "ember")]
#[command(about = "Ember - a fire-spirit companion that keeps mock data and shortcuts out of production")]
#[command(version)]
pub struct Cli {
    /// Directory for config and state files
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the MCP server on stdio
    Server,
    /// Hatch a new pet
    Init {
        #[arg(long)]
        name: Option<String>,
    },
    /// Show the pet's mood and stats
    Mood,
    /// Check an action for production-policy violations
    Check {
        action: String,
        /// Action parameters as JSON
        #[arg(long)]
        params: Option<String>,
        #[arg(long)]
        context: Option<String>,
    },
    /// Show what has been learned from corrections
    Stats,
    /// Take care of the pet (feed, rest, clean, play)
    Care { action: String },
    /// Talk with Ember
    Chat { message: String },
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::new(cli.data_dir)?;

    match cli.command {
        Commands::Server => handle_server(&config).await,
        Commands::Init { name } => handle_init(&mut config, name),
        Commands::Mood => handle_mood(&config),
        Commands::Check {
            action,
            params,
            context,
        } => handle_check(&config, action, params, context).await,
        Commands::Stats => handle_stats(&config).await,
        Commands::Care { action } => handle_care(&config, &action),
        Commands::Chat { message } => handle_chat(&config, message).await,
    }
}

pub async fn handle_server(config: &Config) -> Result<()> {
    McpServer::new(config).run().await
}

pub fn handle_init(config: &mut Config, name: Option<String>) -> Result<()> {
    let store = config.store();
    if let Some(state) = store.load_mood() {
        println!("🔥 {} is already here ({}).", state.name, state.mood());
        return Ok(());
    }

    if let Some(name) = name {
        config.save_pet_name(&name)?;
    }

    let state = MoodState::new(&config.pet_name);
    store.save_mood(&state).context("Failed to save pet state")?;

    println!("🥚 ... 🔥 {} hatched!", state.name);
    println!("💭 {}", state.current_thought);
    Ok(())
}

pub fn handle_mood(config: &Config) -> Result<()> {
    let state = match config.store().load_mood() {
        Some(state) => state,
        None => {
            println!("🥚 Nothing has hatched yet. Run `ember init` first.");
            return Ok(());
        }
    };

    println!("{} {} is feeling {}", state.mood().emoji(), state.name, state.mood());
    println!("  Health:       {:.0}/100", state.health());
    println!("  Hunger:       {:.0}", state.hunger);
    println!("  Energy:       {:.0}", state.energy);
    println!("  Happiness:    {:.0}", state.happiness);
    println!("  Cleanliness:  {:.0}", state.cleanliness);
    println!("  Behavior:     {:.0}/100", state.behavior_score);
    println!("  Violations:   {}", state.violation_count);
    println!("💭 {}", state.current_thought);
    Ok(())
}

pub async fn handle_check(
    config: &Config,
    action: String,
    params: Option<String>,
    context: Option<String>,
) -> Result<()> {
    // Non-JSON params are scanned as plain text
    let parameters = match params {
        Some(raw) => serde_json::from_str::<Value>(&raw).unwrap_or(Value::String(raw)),
        None => Value::Null,
    };

    let result = ToolDispatcher::new(config)
        .execute_tool(
            "check_violation",
            &json!({
                "action": action,
                "parameters": parameters,
                "context": context.unwrap_or_default()
            }),
        )
        .await;

    if result["success"] != true {
        bail!("{}", result["error"].as_str().unwrap_or("check failed"));
    }

    println!("{}", result["message"].as_str().unwrap_or_default());
    println!(
        "score {:.1} | tier {} | proceed: {}",
        result["max_score"].as_f64().unwrap_or(0.0),
        result["tier"].as_str().unwrap_or("clean"),
        result["should_proceed"]
    );
    Ok(())
}

pub async fn handle_stats(config: &Config) -> Result<()> {
    let result = ToolDispatcher::new(config)
        .execute_tool("get_learning_stats", &json!({}))
        .await;

    println!("📚 {} correction(s) recorded", result["total_entries"]);
    if let Some(categories) = result["categories"].as_object() {
        for (category, stats) in categories {
            println!(
                "  {:<24} total {:>3}  false positives {:>3}  adjustment {:+.1}",
                category,
                stats["total"],
                stats["false_positives"],
                stats["total_adjustment"].as_f64().unwrap_or(0.0)
            );
        }
    }
    if let Some(recent) = result["recent"].as_array() {
        if !recent.is_empty() {
            println!("Recent:");
            for entry in recent {
                println!(
                    "  [{}] {} ({:+.1}): {}",
                    entry["category"].as_str().unwrap_or_default(),
                    entry["context"].as_str().unwrap_or_default(),
                    entry["score_adjustment"].as_f64().unwrap_or(0.0),
                    entry["explanation"].as_str().unwrap_or_default()
                );
            }
        }
    }
    Ok(())
}

pub fn handle_care(config: &Config, action: &str) -> Result<()> {
    let action: CareAction = action.parse().map_err(anyhow::Error::msg)?;
    let store = config.store();
    let mut state = match store.load_mood() {
        Some(state) => state,
        None => bail!("Nothing has hatched yet. Run `ember init` first."),
    };

    state.care(action);
    store.save_mood(&state).context("Failed to save pet state")?;

    println!("{} {} feels {} now.", state.mood().emoji(), state.name, state.mood());
    println!("💭 {}", state.current_thought);
    Ok(())
}

pub async fn handle_chat(config: &Config, message: String) -> Result<()> {
    let result = ToolDispatcher::new(config)
        .execute_tool("chat", &json!({ "message": message }))
        .await;

    match result["response"].as_str() {
        Some(response) => println!("{}", response),
        None => bail!("{}", result["error"].as_str().unwrap_or("chat failed")),
    }
    Ok(())
}
