//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Trigger → broadcast to server → stop accepting → drain → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - The server stops on whichever comes first: an OS signal or an
//!   explicit trigger (tests, embedding)

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
