//! Schoolsite - content server for a multilingual school website
//!
//! Serves the admin panel's API for the staff, PTA and school-board
//! hierarchies and the school's posts, and the read-only content the public
//! site renders from.

pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod hierarchy;
pub mod identity;
pub mod lang;
pub mod middleware;
pub mod model;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
