//! Loadout engine: pool filtering, quota allocation, capped random fill and
//! the timed reveal. Keep this crate free of IO and platform concerns.

pub mod catalog;
pub mod config;
pub mod events;
pub mod fill;
pub mod loadout;
pub mod pool;
pub mod quota;
pub mod reveal;
pub mod rng;
pub mod rules;
pub mod timer;

pub use catalog::*;
pub use config::*;
pub use events::*;
pub use fill::*;
pub use loadout::*;
pub use pool::*;
pub use quota::*;
pub use reveal::*;
pub use rng::*;
pub use rules::*;
pub use timer::*;
