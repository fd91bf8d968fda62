pub mod composer;
pub mod config;
pub mod kernel;
pub mod outputs;
pub mod services;
pub mod world;

// Re-export specific items if needed for convenient access
pub use config::NarratorConfig;
pub use kernel::reactor::{Reactor, StalePolicy, TickReport};
