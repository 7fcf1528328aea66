pub mod cache;
pub mod orchestrator;
pub mod range;
pub mod scheduler;
pub mod timeseries;
