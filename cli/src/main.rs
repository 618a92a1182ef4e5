//! CLI entrypoint for parley
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use parley_application::{AdvanceTurnUseCase, ConversationLogger, LlmGateway, RoutingMode};
use parley_domain::SessionId;
use parley_infrastructure::{
    ConfigError, ConfigLoader, FileConfig, InMemoryConversationStore, JsonlConversationLogger,
    OpenAiCompatGateway,
};
use parley_presentation::{ChatRepl, Cli, ConsoleFormatter, send_and_print};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(ExitCode::SUCCESS);
    }

    info!("Starting parley");

    // === Configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };
    apply_overrides(&mut config, &cli);

    let issues = config.validate();
    if !issues.is_empty() {
        for issue in &issues {
            eprintln!("config error: {issue}");
        }
        bail!("invalid configuration ({} problem(s))", issues.len());
    }

    let generation = config.generation.to_generation_config()?;
    let persona = config.session.parse_persona()?;
    let mut behavior = config.behavior.to_chat_behavior()?;
    if let Some(routing) = cli.routing {
        behavior = behavior.with_routing(routing.into());
    }
    if let Some(tie_break) = cli.tie_break {
        behavior = behavior.with_tie_break(tie_break.into());
    }

    // === Dependency Injection ===
    let api_key = match config.provider.resolve_api_key() {
        Ok(key) => key,
        // Tools-only routing never reaches the model
        Err(ConfigError::MissingCredential { env_var }) if behavior.routing == RoutingMode::Tools => {
            warn!(env_var = %env_var, "No API key; model calls will fail");
            String::new()
        }
        Err(e) => return Err(e.into()),
    };

    let gateway: Arc<dyn LlmGateway> = Arc::new(OpenAiCompatGateway::new(
        &config.provider.base_url,
        api_key,
        config.provider.parse_model(),
        Some(Duration::from_secs(config.provider.request_timeout_seconds)),
    )?);

    let store = Arc::new(
        InMemoryConversationStore::new(config.session.parse_capacity()?)
            .with_system_prompt(persona.system_prompt().map(str::to_string)),
    );

    let mut use_case = AdvanceTurnUseCase::new(gateway, store).with_behavior(behavior);
    if let Some(path) = &config.logging.conversation_log {
        let logger = JsonlConversationLogger::open(path)
            .with_context(|| format!("cannot open conversation log {}", path.display()))?;
        let logger: Arc<dyn ConversationLogger> = Arc::new(logger);
        use_case = use_case.with_conversation_logger(logger);
    }

    let session = SessionId::new(&cli.session)?;

    // Chat mode
    if cli.chat {
        let mut repl = ChatRepl::new(use_case, session, generation)
            .with_persona(persona)
            .with_banner(config.repl.show_banner && !cli.quiet)
            .with_progress(!cli.quiet)
            .with_history_file(config.repl.history_file.as_deref());

        repl.run().await?;
        return Ok(ExitCode::SUCCESS);
    }

    // Single message mode - message is required
    let question = match cli.question {
        Some(q) => q,
        None => bail!("A message is required. Use --chat for interactive mode."),
    };

    if let Err(e) = send_and_print(&use_case, &session, &question, &generation, !cli.quiet).await {
        eprintln!("{}", ConsoleFormatter::format_error(&e));
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

/// Command-line flags win over every configuration source
fn apply_overrides(config: &mut FileConfig, cli: &Cli) {
    if let Some(model) = &cli.model {
        config.provider.model = model.clone();
    }
    if let Some(persona) = &cli.persona {
        config.session.persona = persona.clone();
        config.session.system_prompt = None;
    }
    if let Some(prompt) = &cli.system_prompt {
        config.session.system_prompt = Some(prompt.clone());
    }
    if let Some(temperature) = cli.temperature {
        config.generation.temperature = temperature;
    }
    if let Some(max_tokens) = cli.max_tokens {
        config.generation.max_output_tokens = max_tokens;
    }
    if cli.stream {
        config.generation.streaming = true;
    }
    if let Some(timeout) = cli.timeout {
        config.behavior.timeout_seconds = timeout;
    }
    if let Some(path) = &cli.conversation_log {
        config.logging.conversation_log = Some(path.clone());
    }
}

fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    Ok(guard)
}
