pub mod app;
pub mod download;
pub mod generate;
pub mod health;
pub mod metrics;
pub mod session;
