pub mod command;
pub mod file;
pub mod snapshot;
pub mod source;

pub use source::{EntityRecord, EntitySource, Position, StaticWorld};
pub use snapshot::{Snapshot, SnapshotBuilder};
