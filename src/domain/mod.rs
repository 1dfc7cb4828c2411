pub mod chart;
pub mod errors;
pub mod feed;
pub mod game;
pub mod histogram;
pub mod ledger;
pub mod logging;
pub mod market_data;
pub mod reveal;
