// src/session/mod.rs

pub mod clock;
pub mod controller;
pub mod runner;
pub mod timer;

pub use controller::{ExamSession, Outcome, Phase, SubmitTrigger};
pub use runner::{SessionCommand, SessionRunner, SessionUpdate};
