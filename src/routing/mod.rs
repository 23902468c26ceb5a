//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, raw path)
//!     → router.rs (walk the route tree)
//!     → matcher.rs (structural template match)
//!     → table.rs transforms → codec.rs (decode CloneURL, tree Path)
//!     → Return: RouteMatch { name, vars } or NotFound
//!
//! Outbound link (route name, vars)
//!     → table.rs transforms → codec.rs (encode)
//!     → matcher.rs (substitute into template)
//!     → Return: path
//!
//! Route Compilation (at startup):
//!     RouteNode tree
//!     → join parent and child templates
//!     → index by name
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - Build and match are inverses for canonical variables

pub mod codec;
pub mod error;
pub mod matcher;
pub mod router;
pub mod table;

pub use error::RouteError;
pub use router::{RouteMatch, Router};
pub use table::{RouteTable, Transform, Vars};
