//! Market data aggregate: price samples and the rolling price timeline.

pub mod entities;
pub mod value_objects;

pub use entities::*;
pub use value_objects::*;
