//! Deployment orchestration for the MySQL/AWS infrastructure stack.
//!
//! One run logs the engine into its state backend, selects (or creates) the
//! target stack, has the model builder write `model.json`, and hands control
//! to the engine with the requested action. See [`orchestrator`].

pub mod artifact;
pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod invocation;
pub mod orchestrator;
pub mod purge;
pub mod runner;
pub mod shutdown;
pub mod stack;

pub use error::{DeployError, Result};
