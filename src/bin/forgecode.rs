//! forgecode — a terminal coding agent.
//!
//! Usage:
//!   forgecode [WORKSPACE] [--model MODEL]

use clap::Parser;
use forgecode::TerminalSink;
use forgecode_agent::Agent;
use forgecode_core::{AgentConfig, Settings, Style, UiSink};
use forgecode_llm::AnthropicProvider;
use forgecode_tools::{create_default_registry, SkillIndex};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "forgecode",
    about = "A terminal coding agent",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    /// Workspace directory (default: current directory)
    workspace: Option<PathBuf>,

    /// Override the configured model
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let workspace = match cli.workspace {
        Some(w) => w,
        None => std::env::current_dir()?,
    };
    let workspace = std::fs::canonicalize(&workspace).unwrap_or(workspace);

    let settings = Settings::load();
    let ui: Arc<dyn UiSink> = Arc::new(TerminalSink::new());

    if let Some(err) = &settings.config_error {
        warn!("{err}");
        ui.styled_write(Style::Error, &format!("Warning: {err}\n"));
    }
    if settings.anthropic_auth_token.is_none() {
        warn!("no ANTHROPIC_AUTH_TOKEN configured");
        ui.styled_write(
            Style::Error,
            "Warning: no ANTHROPIC_AUTH_TOKEN configured; model requests will fail.\n",
        );
    }

    let model = cli.model.unwrap_or(settings.anthropic_model.clone());
    let config = AgentConfig {
        model,
        max_thinking_tokens: settings.max_thinking_tokens,
        api_key: settings.anthropic_auth_token.clone().unwrap_or_default(),
        base_url: settings.anthropic_base_url.clone(),
        workdir: workspace.clone(),
    };

    let provider = Arc::new(AnthropicProvider::new(config.api_key.clone(), config.base_url.clone()));
    let registry = create_default_registry(None);
    let skills = Arc::new(SkillIndex::load(&workspace));

    ui.styled_write(Style::Accent, &format!("forgecode — {}\n", workspace.display()));
    ui.write(&format!("model: {}\n", config.model));
    ui.write("Type /help for commands.\n\n");

    let mut agent = Agent::new(provider, registry, skills.clone(), config, ui.clone());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        ui.write("> ");
        io::stdout().flush().ok();
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/exit" => break,
            "/help" => {
                ui.write(
                    "/help    show this message\n\
                     /clear   reset the conversation\n\
                     /skills  list available skills\n\
                     /config  show the resolved configuration\n\
                     /exit    quit\n",
                );
                continue;
            }
            "/clear" => {
                agent.clear();
                ui.write("Conversation cleared.\n");
                continue;
            }
            "/skills" => {
                ui.write(&skills.get_descriptions());
                ui.newline();
                continue;
            }
            "/config" => {
                ui.write(&format!(
                    "model: {}\nbase_url: {}\nmax_thinking_tokens: {}\nworkspace: {}\n",
                    settings.anthropic_model,
                    settings.anthropic_base_url,
                    settings.max_thinking_tokens,
                    workspace.display()
                ));
                continue;
            }
            _ => {}
        }

        // Race the turn against Ctrl-C so a long-running turn can be
        // cancelled cooperatively (§5): the signal only flips the interrupt
        // flag, the loop in `forgecode_agent::turn::run_turn` decides when
        // to actually honor it.
        let interrupt = agent.interrupt_flag();
        let turn_fut = agent.turn(input);
        tokio::pin!(turn_fut);
        loop {
            tokio::select! {
                _ = &mut turn_fut => break,
                _ = tokio::signal::ctrl_c() => {
                    interrupt.request();
                }
            }
        }
    }

    Ok(())
}
