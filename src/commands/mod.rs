//! Command handler layer.
//!
//! ## Files
//! - `admin.rs`: `ledger verify` / `ledger list`.
//! - `runtime.rs`: `run`, `score`, `batch`.
//!
//! Handlers resolve paths and options from flags and config, call one service
//! and print the result. Output schema stays stable across releases.

pub mod admin;
pub mod runtime;

pub use admin::handle_ledger_commands;
pub use runtime::handle_runtime_commands;
