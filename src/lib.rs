//! chatdash: terminal and browser front ends for a Rasa chatbot, with live
//! intent analytics and a training bridge.
//!
//! The library holds the session logic; `main.rs` only parses arguments.

pub mod analytics;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod nlu;
pub mod session;
pub mod training;
pub mod web;
