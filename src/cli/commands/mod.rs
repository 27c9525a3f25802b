//! CLI command implementations.

mod concepts;
mod config;
mod doctor;
mod search;
pub mod serve;

pub use concepts::run_concepts;
pub use config::run_config;
pub use doctor::run_doctor;
pub use search::run_search;
pub use serve::run_serve;
