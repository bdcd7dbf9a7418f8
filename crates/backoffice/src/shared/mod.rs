pub mod api_client;
pub mod config;
pub mod error;
pub mod generation;
pub mod logger;
pub mod numbers;
