//! Line-oriented interactive commands

use megaverse_client::HttpExecutor;
use megaverse_core::{ObjectKind, Position};
use megaverse_engine::{render_grid, Megaverse};

pub const AVAILABLE: &str = "[add, remove, validate, create_goal, reset, show, goal, help, exit]";

/// One interactive command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { token: String, position: Position },
    Remove { kind: ObjectKind, position: Position },
    Validate,
    Reset,
    CreateGoal,
    Show,
    Goal,
    Help,
    Exit,
}

/// Whether the command loop should keep reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

impl Command {
    /// Parse a whitespace-separated line; `Ok(None)` for a blank line
    ///
    /// Missing row/column arguments default to 0.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut parts = line.split_whitespace();
        let Some(action) = parts.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = parts.collect();

        let command = match action {
            "add" => {
                let token = args
                    .first()
                    .ok_or_else(|| "Usage: add <token> <row> <col>".to_string())?;
                Self::Add {
                    token: token.to_uppercase(),
                    position: parse_position(&args[1..])?,
                }
            }
            "remove" => {
                let name = args
                    .first()
                    .ok_or_else(|| "Usage: remove <name> <row> <col>".to_string())?;
                Self::Remove {
                    kind: name.parse::<ObjectKind>().map_err(|e| e.to_string())?,
                    position: parse_position(&args[1..])?,
                }
            }
            "validate" => Self::Validate,
            "reset" => Self::Reset,
            "create_goal" => Self::CreateGoal,
            "show" => Self::Show,
            "goal" => Self::Goal,
            "help" => Self::Help,
            "exit" | "quit" => Self::Exit,
            _ => return Err(format!("Invalid action. Available actions: {}.", AVAILABLE)),
        };

        Ok(Some(command))
    }
}

fn parse_position(args: &[&str]) -> Result<Position, String> {
    let coordinate = |index: usize, label: &str| -> Result<usize, String> {
        match args.get(index) {
            None => Ok(0),
            Some(raw) => raw
                .parse()
                .map_err(|_| format!("Invalid {}: {}", label, raw)),
        }
    };
    Ok(Position::new(coordinate(0, "row")?, coordinate(1, "column")?))
}

/// Run one command to completion against the engine
///
/// Per-item failures are already logged by the engine; only operation-level
/// failures (e.g. the remote map could not be fetched) surface as `Err`.
pub async fn dispatch<E: HttpExecutor>(
    megaverse: &Megaverse<E>,
    command: Command,
) -> anyhow::Result<Flow> {
    match command {
        Command::Add { token, position } => {
            let placement = megaverse.parse_token(&token, position)?;
            megaverse.place(&placement).await;
        }
        Command::Remove { kind, position } => {
            megaverse.remove(kind, position).await;
        }
        Command::Validate => {
            println!("Validating Megaverse with its goal state...");
            if megaverse.validate().await? {
                println!("[Success] Megaverse state matches the goal state!");
            } else {
                println!("[Failure] Megaverse state does not match the goal state!");
            }
        }
        Command::Reset => {
            println!("Resetting Megaverse to its initial state...");
            megaverse.reset().await?;
        }
        Command::CreateGoal => {
            println!("Creating Megaverse to match its goal state...");
            megaverse.populate_from_goal().await?;
        }
        Command::Show => {
            let grid = megaverse.fetch_remote_grid().await?;
            print_grid(&render_grid(&grid));
        }
        Command::Goal => {
            print_grid(megaverse.goal()?.rows());
        }
        Command::Help => {
            println!("Available commands: {}", AVAILABLE);
            println!("  add <token> <row> <col>    e.g. add BLUE_SOLOON 2 3");
            println!("  remove <name> <row> <col>  e.g. remove COMETH 4 1");
        }
        Command::Exit => {
            println!("Thank you for playing Megaverse!");
            return Ok(Flow::Exit);
        }
    }
    Ok(Flow::Continue)
}

fn print_grid(rows: &[Vec<String>]) {
    for row in rows {
        let line: Vec<&str> = row.iter().map(|t| short_token(t)).collect();
        println!("{}", line.join(" "));
    }
}

/// One-letter cell code for terminal grids
fn short_token(token: &str) -> &'static str {
    match token {
        "SPACE" => ".",
        "POLYANET" => "P",
        t if t.ends_with("SOLOON") => "S",
        t if t.ends_with("COMETH") => "C",
        _ => "?",
    }
}
