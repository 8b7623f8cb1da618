use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "warden", version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Check a single path and print the decision.
    ///
    /// Prints `Decision: pass|deny` and `Reason: ...` on stdout; exits 0 on
    /// pass and 2 on deny. Without this flag warden enters JSON-RPC proxy
    /// mode on stdin/stdout.
    #[arg(long, value_name = "PATH")]
    pub check: Option<String>,

    /// Operation to evaluate the path under: read, write, edit, glob, grep
    /// or bash.
    #[arg(long, default_value = "read")]
    pub op: String,

    /// Base directory for resolving relative paths.
    ///
    /// Defaults to the current working directory.
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Top-level subcommands
    #[command(subcommand)]
    pub subcommands: Option<TopLevelCommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum TopLevelCommand {
    /// Run as a one-shot agent hook.
    ///
    /// Reads a single `{"tool_name": ..., "tool_input": ...}` envelope from
    /// stdin, checks every path the tool call names, and exits 0 to allow
    /// or 2 to block with the reason on stderr.
    Hook,
}
