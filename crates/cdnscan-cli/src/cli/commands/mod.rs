//! CLI command handlers.

mod resolve;
mod serve;

pub use resolve::run_resolve;
pub use serve::run_serve;
