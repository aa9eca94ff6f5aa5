//! Request handlers module

pub mod auth;
pub mod canvas;
pub mod config;
pub mod locale;
pub mod personnel;
pub mod post;
pub mod public;
pub mod upload;
