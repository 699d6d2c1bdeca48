pub mod atlas;
pub mod config;
pub mod error;
pub mod telemetry;
