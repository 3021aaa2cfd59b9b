//! Ideas - capture, vote on and evaluate product ideas
//!
//! Ideas move from draft to published, collect votes, and can be evaluated, clustered and
//! classified by a generative model. The crate holds the domain model, the CSV/JSON codec, a
//! client-side store with its list derivation pipeline and view state machine, an HTTP client,
//! and the axum backend that serves the same contract.

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod store;
pub mod view;

pub use error::{IdeasError, Result};
