//! vcsstore command-line entry point.
//!
//! # Architecture Overview
//!
//! ```text
//!     argv ──▶ cli ──▶ serve ──▶ http::HttpServer ──▶ routing::Router
//!                  │                     │                    │
//!                  │                     ▼                    ▼
//!                  │              handlers (JSON)     codec / table / matcher
//!                  │                     │
//!                  └──▶ repo ──▶ storage::layout (flat / hashed paths)
//!
//!     config (TOML + flags), observability (tracing, metrics) and
//!     lifecycle (signals, shutdown) are shared by the subcommands.
//! ```

use std::process::ExitCode;

fn main() -> ExitCode {
    match vcsstore::cli::run(std::env::args_os()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            err.report();
            err.exit_code()
        }
    }
}
