use shadow_rs::shadow;

shadow!(build);

// Internals
// ---------
pub mod cost;
pub mod data_structures;
pub mod derank;
pub mod heap_primitives;

// Search space and problems
// -------------------------
pub mod search;
pub mod space;

// Problems
// --------
pub mod problems;

// Algorithms
// ----------
pub mod algorithms;
