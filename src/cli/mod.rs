//! CLI module for Lumina RAG
//!
//! - `serve`: run the HTTP server
//! - `doctor`: check that the embedding and completion backends answer

pub mod doctor;
pub mod serve;

use clap::{Parser, Subcommand};

/// Lumina RAG - ask questions about your PDF documents with a local model
#[derive(Parser)]
#[command(name = "lumina-rag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve(serve::ServeArgs),

    /// Probe the configured embedding and completion backends
    Doctor(doctor::DoctorArgs),
}
