pub mod config;
pub mod logging;

pub mod cache;
pub mod coalesce;
pub mod engine;
pub mod probe;
pub mod request;
pub mod scan;

pub use engine::{EngineSettings, Resolution, ResolutionEngine};
pub use request::{RequestError, RequestPolicy, ResolutionRequest};
