//! Catalog loading and settings persistence for the loadout engine.

pub mod load;
pub mod schema;
pub mod settings;

pub use load::*;
pub use schema::*;
pub use settings::*;
