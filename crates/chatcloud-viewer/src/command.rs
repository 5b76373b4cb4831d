use anyhow::{Context, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Brush { x0: f64, x1: f64 },
    Clear,
    Show,
    Quit,
}

pub const HELP: &str = "commands: brush <x0> <x1> | clear | show | quit";

/// `Ok(None)` for a blank line.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Ok(None);
    };
    let command = match verb {
        "brush" | "b" => {
            let (Some(x0), Some(x1), None) = (parts.next(), parts.next(), parts.next()) else {
                anyhow::bail!("usage: brush <x0> <x1>");
            };
            let x0: f64 = x0.parse().with_context(|| format!("invalid pixel: {x0}"))?;
            let x1: f64 = x1.parse().with_context(|| format!("invalid pixel: {x1}"))?;
            if !(x0.is_finite() && x1.is_finite()) {
                anyhow::bail!("brush pixels must be finite");
            }
            Command::Brush { x0, x1 }
        }
        "clear" | "c" => Command::Clear,
        "show" | "s" => Command::Show,
        "quit" | "q" | "exit" => Command::Quit,
        other => anyhow::bail!("unknown command: {other} ({HELP})"),
    };
    if !matches!(command, Command::Brush { .. }) && parts.next().is_some() {
        anyhow::bail!("{verb} takes no arguments");
    }
    Ok(Some(command))
}
