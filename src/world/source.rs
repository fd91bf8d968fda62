use serde::{Deserialize, Serialize};

/// World-space location of an entity. Serialized with upper-case axis keys.
///
/// Axes are expected to be finite. serde_json writes NaN and infinities as
/// `null`, so a non-finite position would reach the prompt as a null axis.
/// The command parser rejects them; in-memory callers must not pass them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    #[serde(rename = "Z")]
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// One live entity as reported by the world. Read fresh every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub position: Position,
}

impl EntityRecord {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            position,
        }
    }
}

/// Enumerates the world for the snapshot builder.
/// An unreachable world is not an error: return an empty list / `None`.
pub trait EntitySource {
    fn enumerate(&self) -> Vec<EntityRecord>;
    fn controlled_subject(&self) -> Option<EntityRecord>;
}

/// In-memory world. Used by the demo binaries and the tests.
#[derive(Debug, Clone, Default)]
pub struct StaticWorld {
    entities: Vec<EntityRecord>,
    // Name of the possessed entity, if any
    subject: Option<String>,
}

impl StaticWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entities(entities: Vec<EntityRecord>) -> Self {
        Self {
            entities,
            subject: None,
        }
    }

    pub fn spawn(&mut self, record: EntityRecord) {
        self.entities.push(record);
    }

    /// Moves every entity carrying `name`. Returns how many were moved.
    pub fn move_to(&mut self, name: &str, position: Position) -> usize {
        let mut moved = 0;
        for entity in self.entities.iter_mut().filter(|e| e.name == name) {
            entity.position = position;
            moved += 1;
        }
        moved
    }

    /// Removes every entity carrying `name`. Returns how many were removed.
    pub fn despawn(&mut self, name: &str) -> usize {
        let before = self.entities.len();
        self.entities.retain(|e| e.name != name);
        if self.subject.as_deref() == Some(name) {
            self.subject = None;
        }
        before - self.entities.len()
    }

    /// Marks an existing entity as the controlled subject.
    /// Returns false if no entity has that name.
    pub fn possess(&mut self, name: &str) -> bool {
        if self.entities.iter().any(|e| e.name == name) {
            self.subject = Some(name.to_string());
            true
        } else {
            false
        }
    }

    pub fn release(&mut self) {
        self.subject = None;
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl EntitySource for StaticWorld {
    fn enumerate(&self) -> Vec<EntityRecord> {
        self.entities.clone()
    }

    fn controlled_subject(&self) -> Option<EntityRecord> {
        let name = self.subject.as_deref()?;
        self.entities.iter().find(|e| e.name == name).cloned()
    }
}
