//! Line commands typed into the shell

use anyhow::{anyhow, bail, Context, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Tap the trigger
    Tap,
    Minimize,
    Close,
    /// Hand the conversation to the host app
    HandOff,
    /// Drag the trigger by a delta
    DragTrigger(f32, f32),
    /// Drag the panel header by a delta
    MovePanel(f32, f32),
    /// Drag the resize handle by a delta
    Resize(f32, f32),
    State,
    Help,
    Quit,
    /// Anything not starting with ':' is typed into the input and submitted
    Say(String),
}

pub const HELP: &str = "\
:tap               tap the trigger (open/close the panel)
:min               minimize the panel
:close             close the panel and forget the conversation
:max               open the conversation in the host app
:drag DX DY        drag the trigger
:move DX DY        drag the panel header
:resize DX DY      drag the resize handle
:state             print widget state
:quit              stop the widget
<text>             send a message";

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let Some(rest) = line.strip_prefix(':') else {
            return Ok(Command::Say(line.to_string()));
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        let command = match name {
            "tap" => Command::Tap,
            "min" => Command::Minimize,
            "close" => Command::Close,
            "max" => Command::HandOff,
            "drag" => {
                let (dx, dy) = delta(&args)?;
                Command::DragTrigger(dx, dy)
            }
            "move" => {
                let (dx, dy) = delta(&args)?;
                Command::MovePanel(dx, dy)
            }
            "resize" => {
                let (dx, dy) = delta(&args)?;
                Command::Resize(dx, dy)
            }
            "state" => Command::State,
            "help" | "?" => Command::Help,
            "quit" | "q" => Command::Quit,
            other => bail!("Unknown command :{} (try :help)", other),
        };
        Ok(command)
    }
}

fn delta(args: &[&str]) -> Result<(f32, f32)> {
    match args {
        [dx, dy] => {
            let dx = dx.parse().with_context(|| format!("Bad DX: {}", dx))?;
            let dy = dy.parse().with_context(|| format!("Bad DY: {}", dy))?;
            Ok((dx, dy))
        }
        _ => Err(anyhow!("Expected two numbers: DX DY")),
    }
}
