// src/lib.rs

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod navigation;
pub mod render;
pub mod session;
pub mod state;
pub mod utils;

// Re-export specific items for convenience if needed
pub use api::{AssessmentApi, HttpAssessmentApi};
pub use navigation::{Route, route_for};
pub use session::{Outcome, SessionCommand, SessionRunner, SessionUpdate};
