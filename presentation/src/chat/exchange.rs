//! Send one message and print the reply (shared by one-shot and chat mode)

use crate::output::console::ConsoleFormatter;
use crate::progress::spinner::ThinkingSpinner;
use parley_application::{AdvanceTurnError, AdvanceTurnUseCase, TurnStream};
use parley_domain::{GenerationConfig, SessionId};
use std::io::Write;
use tracing::debug;

/// Advance `session` with `text` and print the reply.
///
/// With `config.streaming` the reply is printed fragment by fragment and
/// Ctrl-C keeps what has arrived so far; otherwise a spinner runs until the
/// whole reply is back. Errors are returned unprinted.
pub async fn send_and_print(
    use_case: &AdvanceTurnUseCase,
    session: &SessionId,
    text: &str,
    config: &GenerationConfig,
    show_progress: bool,
) -> Result<String, AdvanceTurnError> {
    if config.streaming {
        return stream_and_print(use_case, session, text, config).await;
    }

    let spinner = ThinkingSpinner::start("thinking...", show_progress);
    let result = use_case.advance(session, text, config).await;
    spinner.finish();

    let reply = result?;
    println!("{}", ConsoleFormatter::format_reply(&reply));
    Ok(reply)
}

async fn stream_and_print(
    use_case: &AdvanceTurnUseCase,
    session: &SessionId,
    text: &str,
    config: &GenerationConfig,
) -> Result<String, AdvanceTurnError> {
    let mut stream = use_case.advance_streaming(session, text, config).await?;

    let mut stdout = std::io::stdout();
    print!("{}", ConsoleFormatter::reply_prefix());
    let _ = stdout.flush();

    loop {
        let fragment = tokio::select! {
            fragment = stream.next_fragment() => Some(fragment),
            Ok(()) = tokio::signal::ctrl_c() => None,
        };
        let Some(fragment) = fragment else {
            println!();
            return keep_received(stream);
        };
        match fragment {
            Some(Ok(chunk)) => {
                print!("{chunk}");
                let _ = stdout.flush();
            }
            Some(Err(e)) => {
                println!();
                return Err(e);
            }
            None => break,
        }
    }
    println!();

    Ok(stream.received().to_string())
}

/// End a stream early, committing whatever text it delivered.
fn keep_received(stream: TurnStream) -> Result<String, AdvanceTurnError> {
    debug!(
        session = %stream.session_id(),
        received = stream.received().len(),
        "Stream interrupted"
    );
    stream.finalize().ok_or(AdvanceTurnError::Interrupted)
}
