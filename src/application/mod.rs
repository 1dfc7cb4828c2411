pub mod chart_service;
pub mod coordinator;
pub mod reveal_service;
pub mod zone_flash;

pub use chart_service::*;
pub use coordinator::*;
pub use reveal_service::*;
pub use zone_flash::*;
