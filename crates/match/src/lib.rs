pub mod config;
pub mod match_engine;
pub mod reason;

pub use config::{ConfigError, EngineConfig};
pub use match_engine::{score_matches, MatchEngine, PairScore};
pub use reason::MatchReason;
