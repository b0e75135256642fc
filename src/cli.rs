//! Command-line interface and REPL

use anyhow::{anyhow, bail, Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A REPL command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set a control value
    Set { identifier: String, value: i32 },
    /// Show one control, or every control
    Show(Option<String>),
    /// Send every control regardless of change history
    Resend,
    /// Print column enable/color state
    Columns,
    /// Change output channel
    Channel(i32),
    Help,
    Quit,
}

impl Command {
    /// Parse one REPL line; `Ok(None)` for blank input
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let command = match (verb.to_lowercase().as_str(), args.as_slice()) {
            ("set", [identifier, value]) => Command::Set {
                identifier: identifier.to_string(),
                value: value
                    .parse()
                    .with_context(|| format!("Invalid value: {}", value))?,
            },
            ("set", _) => bail!("usage: set <control> <value>"),
            ("show" | "get" | "list", []) => Command::Show(None),
            ("show" | "get", [identifier]) => Command::Show(Some(identifier.to_string())),
            ("resend" | "update", []) => Command::Resend,
            ("columns", []) => Command::Columns,
            ("channel", [channel]) => Command::Channel(
                channel
                    .parse()
                    .with_context(|| format!("Invalid channel: {}", channel))?,
            ),
            ("channel", _) => bail!("usage: channel <1-16>"),
            ("help" | "?", _) => Command::Help,
            ("quit" | "exit", _) => Command::Quit,
            (other, _) => return Err(anyhow!("Unknown command: {} (try 'help')", other)),
        };
        Ok(Some(command))
    }
}

pub const HELP: &str = "\
commands:
  set <control> <value>   set a control (0-127)
  show [control]          show one or all controls
  resend                  send every control now
  columns                 show module column state
  channel <1-16>          change MIDI output channel
  quit                    exit";

/// Read lines on a dedicated OS thread and forward parsed commands.
///
/// Parse errors are printed and the prompt continues. The thread ends on
/// `quit`, EOF or Ctrl+C, sending `Quit` so the main loop can stop. It is
/// never joined, so runtime shutdown does not wait on a pending readline.
pub fn spawn_repl(tx: mpsc::Sender<Command>) -> std::thread::JoinHandle<Result<()>> {
    std::thread::spawn(move || {
        let mut rl = DefaultEditor::new()?;

        loop {
            match rl.readline("chroma> ") {
                Ok(line) => {
                    let _ = rl.add_history_entry(line.as_str());
                    match Command::parse(&line) {
                        Ok(Some(command)) => {
                            let quit = command == Command::Quit;
                            if tx.blocking_send(command).is_err() || quit {
                                break;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => println!("{}", e),
                    }
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                    debug!("REPL input closed");
                    let _ = tx.blocking_send(Command::Quit);
                    break;
                }
                Err(e) => {
                    warn!("REPL read error: {}", e);
                    let _ = tx.blocking_send(Command::Quit);
                    break;
                }
            }
        }

        Ok(())
    })
}
