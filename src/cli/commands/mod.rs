//! CLI command implementations.

mod ask;
mod config;
mod doctor;
mod ingest;
mod search;
mod serve;
mod sources;

pub use ask::run_ask;
pub use config::run_config;
pub use doctor::run_doctor;
pub use ingest::run_ingest;
pub use search::run_search;
pub use serve::run_serve;
pub use sources::run_sources;
