//! Command line interface for the `grpcweb` binary.
//!
//! Frames a message file for sending, or dumps the frames of a captured
//! response body. Also drives man page generation from `build.rs`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line arguments for the `grpcweb` binary.
#[derive(Debug, Parser)]
#[command(name = "grpcweb", version, about = "Inspect and build grpc-web frame streams")]
pub struct Cli {
    /// Operation to perform.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of the `grpcweb` binary.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Wrap a serialized message in a data frame and write it to stdout.
    Encode {
        /// Emit `grpc-web-text` (base64) instead of raw bytes.
        #[arg(short, long)]
        text: bool,
        /// File holding the serialized message.
        file: PathBuf,
    },
    /// Print the frames contained in a response body.
    Decode {
        /// Treat the input as `grpc-web-text` (base64).
        #[arg(short, long)]
        text: bool,
        /// File holding the response body.
        file: PathBuf,
    },
}
