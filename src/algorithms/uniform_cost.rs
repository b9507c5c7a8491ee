//! Uniform Cost Search.
//!
//! Ranks the Open list by accumulated cost alone, which is A* with a heuristic
//! that always answers 0.

use crate::algorithms::astar::AStarSearch;
use crate::space::ZeroHeuristic;

pub type UniformCostSearch<'a, Sp, St, C> = AStarSearch<'a, ZeroHeuristic, Sp, St, C>;
