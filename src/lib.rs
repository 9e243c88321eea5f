// src/lib.rs

pub mod bank;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod practice;
pub mod quiz;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;

// Router entry point for the binary and integration tests
pub use routes::create_router;
