//! Memoria - multimodal assistant and retrieval gateways
//!
//! This library provides two small HTTP services that sit between clients
//! and a set of cloud collaborators (image annotation, speech, text-to-speech,
//! a generative model, embeddings) plus an opt-in SQLite memory store and a
//! Qdrant vector index.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `assistant`: image, voice, and chat endpoints with contextual answers
//! - `retrieval`: image description storage and retrieval-augmented answers
//! - `router`: keyword-pattern query classification
//! - `matcher`: tiered fuzzy scoring of remembered names
//! - `memory`: image, item-location, and interaction records with lookups
//! - `vector`: Qdrant-backed nearest-neighbour index of description embeddings
//! - `providers`: collaborator traits and their REST clients
//! - `catalog`: product recommendations from public catalogs
//! - `media`: upload validation, image summaries, and audio preparation
//! - `retry`: fixed-depth retry wrapper
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//! - `cli`: command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use memoria::Config;
//! use memoria::router::{route, Intent};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let routed = route("where did I put my keys?");
//!     assert_eq!(routed.intent, Intent::Location);
//!     Ok(())
//! }
//! ```

pub mod assistant;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dependency;
pub mod error;
pub mod matcher;
pub mod media;
pub mod memory;
pub mod providers;
pub mod retrieval;
pub mod retry;
pub mod router;
pub mod server;
pub mod vector;

// Re-export commonly used types
pub use config::Config;
pub use dependency::Dependency;
pub use error::{MemoriaError, Result};

#[cfg(test)]
pub mod test_utils;
