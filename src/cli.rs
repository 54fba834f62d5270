//! Command-line interface definition for Memoria
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands to run either gateway and to classify queries offline.

use clap::{Parser, Subcommand};

/// Memoria - multimodal assistant and retrieval gateways
///
/// Serve the assistant gateway (images, voice, chat) or the retrieval
/// gateway (image descriptions backed by a vector index).
#[derive(Parser, Debug, Clone)]
#[command(name = "memoria")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Memoria
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run the assistant gateway (image, voice, and chat endpoints)
    Assistant {
        /// Override the bind address from config
        #[arg(long)]
        host: Option<String>,

        /// Override the listen port from config
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run the retrieval gateway (describe, query, clear-context endpoints)
    Retrieval {
        /// Override the bind address from config
        #[arg(long)]
        host: Option<String>,

        /// Override the listen port from config
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Classify a query and print the routed intent
    Route {
        /// Query text to classify
        query: String,

        /// Output the classification as JSON
        #[arg(short, long)]
        json: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            json_logs: false,
            command: Commands::Assistant {
                host: None,
                port: None,
            },
        }
    }
}
