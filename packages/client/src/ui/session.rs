//! Interactive terminal session for one thread.

use std::io::Write;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tayori_shared::time::now_jst_rfc3339;
use tokio::sync::{mpsc, watch};

use crate::{
    domain::{ChatSnapshot, Participant, ThreadId},
    usecase::DirectMessageClient,
};

use super::{error::ClientError, formatter::MessageFormatter, renderer::SnapshotRenderer};

const PROMPT: &str = "> ";

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Send(String),
    Typing(bool),
    Reconnect,
    Quit,
    /// Unrecognized slash command
    Unknown(String),
}

impl Input {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(command) = line.strip_prefix('/') else {
            return Self::Send(line.to_string());
        };

        let mut words = command.split_whitespace();
        match (words.next(), words.next(), words.next()) {
            (Some("quit"), None, _) => Self::Quit,
            (Some("reconnect"), None, _) => Self::Reconnect,
            (Some("typing"), Some("on"), None) => Self::Typing(true),
            (Some("typing"), Some("off"), None) => Self::Typing(false),
            _ => Self::Unknown(line.to_string()),
        }
    }
}

fn redisplay_prompt() {
    print!("{}", PROMPT);
    std::io::stdout().flush().ok();
}

/// Run the interactive session until `/quit`, Ctrl+C or Ctrl+D
pub async fn run_client_session(
    mut client: DirectMessageClient,
    thread_id: &str,
) -> Result<(), ClientError> {
    let thread_id = ThreadId::new(thread_id.to_string())?;
    let thread = client.load_thread(&thread_id).await?;
    print!("{}", MessageFormatter::format_thread_header(&thread));
    println!(
        "\nType messages and press Enter to send. Commands: /typing on|off, /reconnect, /quit\n"
    );

    let render_task = tokio::spawn(render_loop(client.subscribe(), thread.participants));
    client.connect(Some(thread_id.as_str())).await;

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    while let Some(line) = input_rx.recv().await {
        match Input::parse(&line) {
            Input::Quit => break,
            Input::Typing(is_typing) => client.set_typing(is_typing),
            Input::Reconnect => client.connect(Some(thread_id.as_str())).await,
            Input::Send(content) => match client.send_message(&content).await {
                Ok(()) => print!(
                    "{}",
                    MessageFormatter::format_sent_confirmation(&now_jst_rfc3339())
                ),
                Err(e) => print!("{}", MessageFormatter::format_error(&e.to_string())),
            },
            Input::Unknown(command) => {
                print!(
                    "{}",
                    MessageFormatter::format_error(&format!("Unknown command: {}", command))
                );
            }
        }
    }

    client.disconnect().await;
    render_task.abort();
    Ok(())
}

async fn render_loop(mut rx: watch::Receiver<ChatSnapshot>, participants: Vec<Participant>) {
    let mut renderer = SnapshotRenderer::new(participants);
    while rx.changed().await.is_ok() {
        let snapshot = rx.borrow_and_update().clone();
        let lines = renderer.render(&snapshot);
        if lines.is_empty() {
            continue;
        }
        println!();
        for line in lines {
            println!("{}", line.trim_end());
        }
        redisplay_prompt();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_line_is_sent() {
        // テスト項目: スラッシュで始まらない行は送信メッセージになる
        // given (前提条件):
        let line = "  hello there ";

        // when (操作):
        let input = Input::parse(line);

        // then (期待する結果):
        assert_eq!(input, Input::Send("hello there".to_string()));
    }

    #[test]
    fn test_parse_commands() {
        // テスト項目: 各コマンドが解釈される
        // given (前提条件) / when (操作) / then (期待する結果):
        assert_eq!(Input::parse("/quit"), Input::Quit);
        assert_eq!(Input::parse("/reconnect"), Input::Reconnect);
        assert_eq!(Input::parse("/typing on"), Input::Typing(true));
        assert_eq!(Input::parse("/typing  off"), Input::Typing(false));
    }

    #[test]
    fn test_parse_unknown_commands() {
        // テスト項目: 不明なコマンドや引数の誤りは Unknown になる
        // given (前提条件) / when (操作) / then (期待する結果):
        assert_eq!(
            Input::parse("/typing maybe"),
            Input::Unknown("/typing maybe".to_string())
        );
        assert_eq!(Input::parse("/quit now"), Input::Unknown("/quit now".to_string()));
        assert_eq!(Input::parse("/help"), Input::Unknown("/help".to_string()));
    }
}
