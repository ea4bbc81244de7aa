pub mod cli;
pub mod config;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod reference;
pub mod registry;
pub mod summary;
