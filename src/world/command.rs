use std::str::FromStr;
use thiserror::Error;

use super::source::{EntityRecord, Position, StaticWorld};

/// Line-oriented edits for a `StaticWorld`, e.g. `spawn Lamp SkyLight 0 0 300`.
#[derive(Debug, Clone, PartialEq)]
pub enum WorldCommand {
    Spawn(EntityRecord),
    Move { name: String, position: Position },
    Despawn(String),
    Possess(String),
    Release,
    Tick,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command {0:?}")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
}

const SPAWN_USAGE: &str = "spawn <name> <type> <x> <y> <z>";
const MOVE_USAGE: &str = "move <name> <x> <y> <z>";
const DESPAWN_USAGE: &str = "despawn <name>";
const POSSESS_USAGE: &str = "possess <name>";

fn parse_position(args: &[&str], usage: &'static str) -> Result<Position, CommandError> {
    let coords = args
        .iter()
        .map(|v| v.parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| CommandError::Usage(usage))?;
    match coords.as_slice() {
        // `nan` and `inf` parse as f64 but are not usable coordinates
        [x, y, z] => {
            let position = Position::new(*x, *y, *z);
            if position.is_finite() {
                Ok(position)
            } else {
                Err(CommandError::Usage(usage))
            }
        }
        _ => Err(CommandError::Usage(usage)),
    }
}

impl FromStr for WorldCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((verb, args)) = parts.split_first() else {
            return Err(CommandError::Empty);
        };

        match verb.to_ascii_lowercase().as_str() {
            "spawn" => match args {
                [name, type_name, coords @ ..] => Ok(WorldCommand::Spawn(EntityRecord::new(
                    *name,
                    *type_name,
                    parse_position(coords, SPAWN_USAGE)?,
                ))),
                _ => Err(CommandError::Usage(SPAWN_USAGE)),
            },
            "move" => match args {
                [name, coords @ ..] => Ok(WorldCommand::Move {
                    name: name.to_string(),
                    position: parse_position(coords, MOVE_USAGE)?,
                }),
                _ => Err(CommandError::Usage(MOVE_USAGE)),
            },
            "despawn" => match args {
                [name] => Ok(WorldCommand::Despawn(name.to_string())),
                _ => Err(CommandError::Usage(DESPAWN_USAGE)),
            },
            "possess" => match args {
                [name] => Ok(WorldCommand::Possess(name.to_string())),
                _ => Err(CommandError::Usage(POSSESS_USAGE)),
            },
            "release" => Ok(WorldCommand::Release),
            "tick" => Ok(WorldCommand::Tick),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

impl WorldCommand {
    /// Applies the edit. Returns false when it referred to a missing entity.
    pub fn apply(self, world: &mut StaticWorld) -> bool {
        match self {
            WorldCommand::Spawn(record) => {
                world.spawn(record);
                true
            }
            WorldCommand::Move { name, position } => world.move_to(&name, position) > 0,
            WorldCommand::Despawn(name) => world.despawn(&name) > 0,
            WorldCommand::Possess(name) => world.possess(&name),
            WorldCommand::Release => {
                world.release();
                true
            }
            WorldCommand::Tick => true,
        }
    }
}
