pub mod app;
pub mod client;
pub mod config;
pub mod review;
pub mod telemetry;
