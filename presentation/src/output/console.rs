//! Console output formatter for conversation turns

use colored::{ColoredString, Colorize};
use parley_application::{AdvanceTurnError, GatewayError};
use parley_domain::{Model, Role, Turn};

/// Formats transcripts, replies and errors for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Label printed in front of a turn
    pub fn role_label(role: Role) -> ColoredString {
        match role {
            Role::System => "system".dimmed(),
            Role::User => "you".cyan().bold(),
            Role::Assistant => "parley".green().bold(),
        }
    }

    /// Prefix printed before an assistant reply starts streaming
    pub fn reply_prefix() -> String {
        format!("{} ", format!("{}:", Self::role_label(Role::Assistant)))
    }

    /// One reply, as printed after a non-streamed turn
    pub fn format_reply(reply: &str) -> String {
        format!("{}{}", Self::reply_prefix(), reply)
    }

    /// Numbered transcript for `/history`
    pub fn format_history(turns: &[Turn]) -> String {
        if turns.is_empty() {
            return "(no messages yet)".dimmed().to_string();
        }

        let mut output = Self::section_header(&format!("History ({} turns)", turns.len()));
        for turn in turns {
            let content = if turn.is_system() {
                turn.content.dimmed().to_string()
            } else {
                turn.content.clone()
            };
            output.push_str(&format!(
                "{:>3}  {}: {}\n",
                turn.ordinal,
                Self::role_label(turn.role),
                Self::indent_continuation(&content, "     ")
            ));
        }
        output
    }

    /// Model list for `/models`, the active one starred
    pub fn format_models(models: &[Model], current: &Model) -> String {
        models
            .iter()
            .map(|model| {
                if model == current {
                    format!("* {}", model.to_string().bold())
                } else {
                    format!("  {}", model)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Error line with a hint on what to do next
    pub fn format_error(error: &AdvanceTurnError) -> String {
        let hint = match error {
            AdvanceTurnError::EmptyInput => "Type a message first.",
            AdvanceTurnError::Gateway(GatewayError::AuthenticationFailed(_)) => {
                "Check your API key (provider.api_key_env)."
            }
            AdvanceTurnError::Gateway(GatewayError::Timeout) => {
                "The model took too long; try again or raise --timeout."
            }
            e if e.is_retryable() => "Nothing was saved; you can send the message again.",
            _ => "Nothing was saved.",
        };
        format!("{} {}\n{}", "Error:".red().bold(), error, hint.dimmed())
    }

    pub fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    /// Indent every line after the first
    fn indent_continuation(text: &str, prefix: &str) -> String {
        text.lines()
            .enumerate()
            .map(|(i, line)| {
                if i == 0 {
                    line.to_string()
                } else {
                    format!("{}{}", prefix, line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    fn turn(role: Role, content: &str, ordinal: usize) -> Turn {
        Turn {
            role,
            content: content.to_string(),
            ordinal,
        }
    }

    #[test]
    fn test_format_history() {
        plain();
        let turns = vec![
            turn(Role::System, "Be calm.", 0),
            turn(Role::User, "What is 99 * 3?", 1),
            turn(Role::Assistant, "297", 2),
        ];
        let output = ConsoleFormatter::format_history(&turns);
        assert!(output.contains("History (3 turns)"));
        assert!(output.contains("  1  you: What is 99 * 3?"));
        assert!(output.contains("  2  parley: 297"));
    }

    #[test]
    fn test_multiline_content_is_indented() {
        plain();
        let turns = vec![turn(Role::Assistant, "line one\nline two", 0)];
        let output = ConsoleFormatter::format_history(&turns);
        assert!(output.contains("line one\n     line two"));
    }

    #[test]
    fn test_empty_history() {
        plain();
        assert_eq!(ConsoleFormatter::format_history(&[]), "(no messages yet)");
    }

    #[test]
    fn test_format_error_hints() {
        plain();
        let timeout = ConsoleFormatter::format_error(&AdvanceTurnError::Gateway(GatewayError::Timeout));
        assert!(timeout.contains("--timeout"));

        let limited = ConsoleFormatter::format_error(&AdvanceTurnError::Gateway(
            GatewayError::RateLimited("slow down".into()),
        ));
        assert!(limited.contains("slow down"));
        assert!(limited.contains("send the message again"));
    }

    #[test]
    fn test_format_models_marks_current() {
        plain();
        let models = vec![Model::Custom("qwen-2.5-32b".into()), Model::default()];
        let output = ConsoleFormatter::format_models(&models, &Model::default());
        assert_eq!(output, "  qwen-2.5-32b\n* llama3-8b-8192");
    }

    #[test]
    fn test_format_reply() {
        plain();
        assert_eq!(ConsoleFormatter::format_reply("Jai Hanuman"), "parley: Jai Hanuman");
    }
}
