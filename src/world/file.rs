use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

use super::source::{EntityRecord, EntitySource};

#[derive(Debug, Default, Deserialize)]
struct WorldDocument {
    #[serde(default)]
    entities: Vec<EntityRecord>,
    #[serde(default)]
    subject: Option<EntityRecord>,
}

/// World backed by a JSON file that is re-read on every enumeration.
///
/// Expected layout:
/// `{ "entities": [{"name":..,"type":..,"position":{"X":..,"Y":..,"Z":..}}], "subject": {...} }`
///
/// A missing or malformed file is treated as an empty world. JSON has no
/// NaN or infinity literals and serde_json rejects out-of-range numbers, so
/// every position read from the file is finite.
#[derive(Debug, Clone)]
pub struct JsonFileWorld {
    path: PathBuf,
}

impl JsonFileWorld {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> WorldDocument {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("World file {:?} unreadable: {}", self.path, e);
                return WorldDocument::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("World file {:?} is not a valid world document: {}", self.path, e);
                WorldDocument::default()
            }
        }
    }
}

impl EntitySource for JsonFileWorld {
    fn enumerate(&self) -> Vec<EntityRecord> {
        self.load().entities
    }

    fn controlled_subject(&self) -> Option<EntityRecord> {
        self.load().subject
    }
}
