//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::chat::exchange::send_and_print;
use crate::output::console::ConsoleFormatter;
use colored::Colorize;
use parley_application::{AdvanceTurnUseCase, RoutingMode};
use parley_domain::{GenerationConfig, Persona, SessionId};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;
use tracing::{debug, warn};

/// A line the REPL handles itself instead of sending it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    History,
    /// Show the current session, or switch to the named one
    Session(Option<String>),
    Reset,
    Persona,
    /// Show the routing mode, or switch to the named one
    Mode(Option<String>),
    Models,
    Quit,
    Unknown(String),
}

impl ReplCommand {
    /// `None` when the line is a message for the model
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.eq_ignore_ascii_case("exit") {
            return Some(ReplCommand::Quit);
        }
        if !line.starts_with('/') {
            return None;
        }

        let mut parts = line.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default();
        let arg = parts
            .next()
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string);

        Some(match name {
            "/help" | "/h" | "/?" => ReplCommand::Help,
            "/history" => ReplCommand::History,
            "/session" => ReplCommand::Session(arg),
            "/reset" | "/clear" => ReplCommand::Reset,
            "/persona" => ReplCommand::Persona,
            "/mode" => ReplCommand::Mode(arg),
            "/models" => ReplCommand::Models,
            "/quit" | "/exit" | "/q" => ReplCommand::Quit,
            other => ReplCommand::Unknown(other.to_string()),
        })
    }
}

/// Interactive chat REPL
pub struct ChatRepl {
    use_case: AdvanceTurnUseCase,
    session: SessionId,
    config: GenerationConfig,
    persona: Persona,
    show_banner: bool,
    show_progress: bool,
    history_file: Option<PathBuf>,
}

impl ChatRepl {
    /// Create a new ChatRepl
    pub fn new(use_case: AdvanceTurnUseCase, session: SessionId, config: GenerationConfig) -> Self {
        Self {
            use_case,
            session,
            config,
            persona: Persona::default(),
            show_banner: true,
            show_progress: true,
            history_file: default_history_path(),
        }
    }

    /// Persona new sessions are seeded with (for `/persona`)
    pub fn with_persona(mut self, persona: Persona) -> Self {
        self.persona = persona;
        self
    }

    pub fn with_banner(mut self, show: bool) -> Self {
        self.show_banner = show;
        self
    }

    /// Set whether to show progress
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Override the line-editor history file (`~/` is expanded)
    pub fn with_history_file(mut self, path: Option<&str>) -> Self {
        if let Some(path) = path {
            self.history_file = Some(expand_home(path));
        }
        self
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        if let Some(ref path) = self.history_file {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        if self.show_banner {
            self.print_welcome();
        }

        loop {
            let readline = rl.readline(&format!("{}> ", self.session));

            match readline {
                Ok(line) => {
                    let line = line.trim();

                    // Skip empty lines
                    if line.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(line);

                    if let Some(command) = ReplCommand::parse(line) {
                        if self.handle_command(command).await {
                            break;
                        }
                        continue;
                    }

                    self.process_message(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        // Save history
        if let Some(ref path) = self.history_file
            && let Err(e) = rl.save_history(path)
        {
            warn!(path = %path.display(), error = %e, "Failed to save line history");
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│               Parley - Chat Mode            │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Model:   {}", self.use_case.gateway().model());
        println!("Persona: {}", self.persona.name());
        println!("Routing: {}", self.use_case.behavior().routing);
        println!("Session: {}", self.session);
        println!();
        Self::print_commands();
    }

    fn print_commands() {
        println!("Commands:");
        println!("  /help, /h, /?     - Show this help");
        println!("  /history          - Show this session's transcript");
        println!("  /session [id]     - Show or switch session");
        println!("  /reset            - Start this session over");
        println!("  /persona          - Show the system prompt for new sessions");
        println!("  /mode [routing]   - Show or set routing: model, tools, hybrid");
        println!("  /models           - List models the provider serves");
        println!("  /quit, /exit, /q  - Exit chat (or type: exit)");
        println!();
    }

    /// Handle a REPL command. Returns true if should exit.
    async fn handle_command(&mut self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Quit => {
                println!("Bye!");
                return true;
            }
            ReplCommand::Help => {
                println!();
                Self::print_commands();
            }
            ReplCommand::History => {
                let turns = self.use_case.transcript(&self.session).await;
                println!("{}", ConsoleFormatter::format_history(&turns));
            }
            ReplCommand::Session(None) => {
                println!("Current session: {}", self.session.to_string().bold());
            }
            ReplCommand::Session(Some(id)) => match SessionId::new(id) {
                Ok(id) => {
                    debug!(from = %self.session, to = %id, "Switching session");
                    println!("Switched to session {}", id.to_string().bold());
                    self.session = id;
                }
                Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
            },
            ReplCommand::Reset => {
                let existed = self.use_case.reset(&self.session);
                debug!(session = %self.session, existed, "Session reset");
                println!("Session {} starts over.", self.session);
            }
            ReplCommand::Persona => {
                println!("Persona: {}", self.persona.name().bold());
                match self.persona.system_prompt() {
                    Some(prompt) => println!("{}", prompt.dimmed()),
                    None => println!("{}", "(no system prompt)".dimmed()),
                }
            }
            ReplCommand::Mode(None) => {
                println!("Routing: {}", self.use_case.behavior().routing);
            }
            ReplCommand::Mode(Some(name)) => match name.parse::<RoutingMode>() {
                Ok(mode) => {
                    self.use_case.set_routing(mode);
                    println!("Routing set to {}", mode);
                }
                Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
            },
            ReplCommand::Models => {
                let gateway = self.use_case.gateway();
                match gateway.available_models().await {
                    Ok(models) => {
                        println!("{}", ConsoleFormatter::format_models(&models, gateway.model()))
                    }
                    Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
                }
            }
            ReplCommand::Unknown(name) => {
                println!("Unknown command: {}", name);
                println!("Type /help for available commands");
            }
        }
        false
    }

    async fn process_message(&self, text: &str) {
        if let Err(e) = send_and_print(
            &self.use_case,
            &self.session,
            text,
            &self.config,
            self.show_progress,
        )
        .await
        {
            eprintln!("{}", ConsoleFormatter::format_error(&e));
        }
        println!();
    }
}

fn default_history_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("parley").join("history.txt"))
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}
