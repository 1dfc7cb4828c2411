//! Chart aggregate: the rolling price chart, its scale and the prediction
//! markers drawn over it.

pub mod badges;
pub mod entities;
pub mod markers;
pub mod value_objects;

pub use badges::*;
pub use entities::*;
pub use markers::*;
pub use value_objects::*;
