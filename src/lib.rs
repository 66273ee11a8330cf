// Library exports for the hidden-pursuit search engine
// The rules engine and game orchestration plug in through board::BoardState

pub mod agent;
pub mod board;
pub mod config;
pub mod debug_logger;
pub mod distance;
pub mod eval;
pub mod graph;
pub mod search;
pub mod types;
