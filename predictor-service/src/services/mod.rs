pub mod credentials;
pub mod error;
pub mod generator;
pub mod metrics;
pub mod prompt;
pub mod providers;
pub mod question_service;
pub mod session_store;
