use serde::Serialize;

use super::source::{EntityRecord, EntitySource, Position};

/// Which top-level group an entity lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Actors,
    Lighting,
    Gameplay,
}

/// Exact type-name match -> category, tags and optional role.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub type_name: &'static str,
    pub category: Category,
    pub tags: &'static [&'static str],
    pub role: Option<&'static str>,
}

pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        type_name: "SkyLight",
        category: Category::Lighting,
        tags: &["Environment", "Lighting"],
        role: None,
    },
    CategoryRule {
        type_name: "PlayerStart",
        category: Category::Gameplay,
        tags: &["Gameplay", "Spawn"],
        role: Some("Spawn Point"),
    },
];

// Fallback for every type without a rule
static DEFAULT_RULE: CategoryRule = CategoryRule {
    type_name: "",
    category: Category::Actors,
    tags: &["Actor"],
    role: None,
};

pub const PLAYER_TAGS: &[&str] = &["Player", "Controlled"];
pub const PLAYER_HEALTH: u32 = 100;
pub const PLAYER_STATUS: &str = "Idle";

pub fn categorize(type_name: &str) -> &'static CategoryRule {
    CATEGORY_RULES
        .iter()
        .find(|rule| rule.type_name == type_name)
        .unwrap_or(&DEFAULT_RULE)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub position: Position,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub position: Position,
    pub tags: Vec<String>,
    pub health: u32,
    pub status: String,
}

/// The `player` group. Serializes to `{}` when nothing is possessed.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PlayerGroup {
    #[serde(flatten)]
    pub subject: Option<PlayerEntry>,
}

impl PlayerGroup {
    pub fn is_empty(&self) -> bool {
        self.subject.is_none()
    }
}

/// Categorized world document for one tick.
///
/// Field order here is the serialization order, so two structurally equal
/// snapshots always produce byte-identical canonical text.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Snapshot {
    pub actors: Vec<EntityEntry>,
    pub lighting: Vec<EntityEntry>,
    pub gameplay: Vec<EntityEntry>,
    pub player: PlayerGroup,
}

/// Selects a single part of a snapshot when rendering prompt text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    Actors,
    Lighting,
    Gameplay,
    Player,
}

impl Snapshot {
    /// Compact JSON used for change detection.
    pub fn canonical_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn group_text(&self, group: Group) -> String {
        let rendered = match group {
            Group::Actors => serde_json::to_string(&self.actors),
            Group::Lighting => serde_json::to_string(&self.lighting),
            Group::Gameplay => serde_json::to_string(&self.gameplay),
            Group::Player => serde_json::to_string(&self.player),
        };
        rendered.unwrap_or_default()
    }

    pub fn entity_count(&self) -> usize {
        self.actors.len() + self.lighting.len() + self.gameplay.len()
    }
}

/// Pure transform: world enumeration + controlled subject -> Snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotBuilder;

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, source: &dyn EntitySource) -> Snapshot {
        self.build_from(source.enumerate(), source.controlled_subject())
    }

    pub fn build_from(
        &self,
        entities: impl IntoIterator<Item = EntityRecord>,
        subject: Option<EntityRecord>,
    ) -> Snapshot {
        let mut snapshot = Snapshot::default();

        // No dedupe: identical names are all emitted, in enumeration order
        for record in entities {
            let rule = categorize(&record.type_name);
            let entry = EntityEntry {
                name: record.name,
                type_name: record.type_name,
                position: record.position,
                tags: rule.tags.iter().map(|t| t.to_string()).collect(),
                role: rule.role.map(str::to_string),
            };
            match rule.category {
                Category::Actors => snapshot.actors.push(entry),
                Category::Lighting => snapshot.lighting.push(entry),
                Category::Gameplay => snapshot.gameplay.push(entry),
            }
        }

        snapshot.player = PlayerGroup {
            subject: subject.map(|record| PlayerEntry {
                name: record.name,
                type_name: record.type_name,
                position: record.position,
                tags: PLAYER_TAGS.iter().map(|t| t.to_string()).collect(),
                health: PLAYER_HEALTH,
                status: PLAYER_STATUS.to_string(),
            }),
        };

        snapshot
    }
}
