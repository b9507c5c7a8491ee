//! Containers backing the searches.

pub mod open_list;
