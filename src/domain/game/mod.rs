//! Game aggregate: wire messages, the local player's rank/zone tracking and
//! the race-track geometry derived from it.

pub mod messages;
pub mod race;
pub mod tracker;
pub mod value_objects;

pub use messages::*;
pub use race::*;
pub use tracker::*;
pub use value_objects::*;
