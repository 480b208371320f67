//! Line-oriented interactive control of a session
//!
//! ```text
//! model <id>        load another model
//! time <n>          select time slice n (0-based) and re-plot
//! bases <text>      set the basis selection, e.g. "1,2,last-1"
//! exclude on|off    drop the final step of each trajectory and re-plot
//! update            re-plot with the current controls
//! models | times    list models / time slices
//! help | quit
//! ```

use std::io::Write;
use std::str::FromStr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::error::Result;
use crate::session::Session;

const HELP: &str = "commands: model <id>, time <n>, bases <text>, exclude on|off, update, models, times, help, quit";

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Model(String),
    Time(usize),
    Bases(String),
    Exclude(bool),
    Update,
    Models,
    Times,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "model" => Ok(Command::Model(require_arg(word, rest, "a model id")?.to_string())),
            "time" => require_arg(word, rest, "a time index")?
                .parse()
                .map(Command::Time)
                .map_err(|_| format!("invalid time index '{}'", rest)),
            "bases" => Ok(Command::Bases(require_arg(word, rest, "a selection")?.to_string())),
            "exclude" => match require_arg(word, rest, "on or off")? {
                "on" | "true" | "yes" => Ok(Command::Exclude(true)),
                "off" | "false" | "no" => Ok(Command::Exclude(false)),
                other => Err(format!("expected on or off, got '{}'", other)),
            },
            "update" => Ok(Command::Update),
            "models" => Ok(Command::Models),
            "times" => Ok(Command::Times),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            _ => Err(format!("unknown command '{}'", word)),
        }
    }
}

fn require_arg<'a>(word: &str, rest: &'a str, what: &str) -> std::result::Result<&'a str, String> {
    if rest.is_empty() {
        Err(format!("'{}' needs {}", word, what))
    } else {
        Ok(rest)
    }
}

/// Read commands from `input` until EOF or `quit`. Listings go to `out`.
pub async fn run<R, W>(session: &Session, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(msg) => {
                writeln!(out, "{}", msg)?;
                continue;
            }
        };
        debug!(?command, "Command received");

        match command {
            Command::Quit => break,
            Command::Help => writeln!(out, "{}", HELP)?,
            Command::Models => {
                let current = session.model().map(|m| m.descriptor.id.clone());
                for model in session.registry().iter() {
                    let marker = if current.as_deref() == Some(model.id.as_str()) {
                        "*"
                    } else {
                        " "
                    };
                    writeln!(out, "{} {}\t{}", marker, model.id, model.name)?;
                }
            }
            Command::Times => {
                for option in session.time_options() {
                    writeln!(out, "{}\t{}", option.value, option.label)?;
                }
            }
            Command::Model(id) => {
                // Unknown ids are already reported on the notice channel.
                if let Ok(handle) = session.select_model(&id) {
                    if let Err(e) = handle.await {
                        warn!(model = %id, error = %e, "Model load task did not complete");
                    }
                }
            }
            // Update failures are reported on the notice channel.
            Command::Time(t) => {
                let _ = session.set_time(t);
            }
            Command::Bases(text) => session.set_selection(text),
            Command::Exclude(on) => {
                let _ = session.set_exclude_last_step(on);
            }
            Command::Update => {
                let _ = session.update();
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_commands() {
        assert_eq!("model llama".parse::<Command>(), Ok(Command::Model("llama".into())));
        assert_eq!("  time 4 ".parse::<Command>(), Ok(Command::Time(4)));
        assert_eq!(
            "bases 1, 2, last-1".parse::<Command>(),
            Ok(Command::Bases("1, 2, last-1".into()))
        );
        assert_eq!("exclude on".parse::<Command>(), Ok(Command::Exclude(true)));
        assert_eq!("EXCLUDE off".parse::<Command>(), Ok(Command::Exclude(false)));
        assert_eq!("update".parse::<Command>(), Ok(Command::Update));
        assert_eq!("quit".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert!("time".parse::<Command>().is_err());
        assert!("time -1".parse::<Command>().is_err());
        assert!("exclude maybe".parse::<Command>().is_err());
        assert!("plot".parse::<Command>().is_err());
    }
}
