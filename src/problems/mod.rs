//! Search spaces to route on.
//!
//! Each one exposes the generic `Space` API, so the same engine can walk a
//! grid of cells or a network of named places.

pub mod campus;
pub mod campus_graph;
pub mod grid;
