//! Terminal front end talking to the ideas REST API

pub mod client;
pub mod commands;
pub mod display;
