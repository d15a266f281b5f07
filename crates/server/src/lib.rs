pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use config::{LogFormat, ServerConfig};
pub use error::AppError;
pub use routes::{create_router, ScoreRequest, ScoreResponse};
pub use state::{AppState, Limits};
