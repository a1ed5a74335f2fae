pub mod api;
pub mod config;
pub mod directory;
pub mod error;
pub mod presentation;
pub mod telemetry;
