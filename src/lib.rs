pub mod analytics;
pub mod auth;
pub mod charges;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod schema;
pub mod state;
pub mod workflow;
