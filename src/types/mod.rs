//! Type definitions shared by the bootstrap, mirror and pricing layers.

mod pool_config;
mod state;
mod tokens;

pub use pool_config::*;
pub use state::*;
pub use tokens::*;
