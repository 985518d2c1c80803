//! ## Crate layout
//! - `expr`: the expression IR shared by criteria, queries, and backends.
//! - `criteria`: typed, immutable predicate builders over records.
//! - `query`: the compiled query handed to a backend.
//! - `backend`: the contract every storage adapter implements.
//! - `fetch`: result shaping for the synchronous, asynchronous, and reactive
//!   disciplines.
//! - `mapper`: typed decoding of projected tuples.
//! - `repository`: the per-record facade tying it all together.
//! - `memory`: the in-memory reference backend.
//!
//! `#[derive(Record)]` generates the record model and the typed criteria
//! accessors; the `prelude` brings both into scope.

pub use quarry_core::*;
pub use quarry_derive::Record;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
/// the `Record` trait and its derive share a name, as with serde
///

pub mod prelude {
    pub use quarry_core::prelude::*;
    pub use quarry_derive::Record;
}
