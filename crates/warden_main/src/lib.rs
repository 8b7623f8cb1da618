//! The `warden` binary: one-shot CLI checks, the JSON-RPC proxy, and the
//! agent hook adapter, all over the `warden_app` facade.

mod cli;
pub mod hook;
pub mod proxy;

pub use cli::*;
