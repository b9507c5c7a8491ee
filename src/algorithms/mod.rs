//! Search algorithms.
//!
//! Both algorithms share one best-first engine, [`astar::AStarSearch`]. Uniform
//! Cost Search is that engine with a heuristic that always answers 0.

pub mod astar;
pub mod uniform_cost;

use derive_more::Display;
use thousands::Separable;

use crate::cost::Cost;
use crate::space::Heuristic;
use crate::space::Path;
use crate::space::Space;
use crate::space::State;

use astar::AStarSearch;

/// Counters collected by a single search run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// States popped, not stale, and expanded. The goal isn't expanded.
    pub nodes_expanded: usize,
    /// Entries pushed into the Open list, including the start.
    pub nodes_generated: usize,
    /// Largest size the Open list reached.
    pub max_frontier: usize,
    /// Size of the Closed set when the search stopped.
    pub visited: usize,
}

impl SearchStats {
    /// A rough stand-in for peak memory use, counted in states.
    ///
    /// Only meant to illustrate how algorithms compare, not to measure memory.
    pub fn memory_proxy(&self) -> usize {
        self.max_frontier + self.visited
    }
}

impl std::fmt::Display for SearchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "expanded: {}, generated: {}, max frontier: {}, visited: {}, memory proxy: {}",
            self.nodes_expanded.separate_with_commas(),
            self.nodes_generated.separate_with_commas(),
            self.max_frontier.separate_with_commas(),
            self.visited.separate_with_commas(),
            self.memory_proxy().separate_with_commas(),
        )
    }
}

/// The outcome of a finished search.
///
/// Not finding a path is a regular outcome, `path` is just `None` then.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchResult<St, C>
where
    St: State,
    C: Cost,
{
    pub path: Option<Path<St, C>>,
    pub stats: SearchStats,
}

impl<St, C> SearchResult<St, C>
where
    St: State,
    C: Cost,
{
    pub fn is_found(&self) -> bool {
        self.path.is_some()
    }
    pub fn cost(&self) -> Option<C> {
        self.path.as_ref().map(|p| p.cost)
    }
}

/// Runs a whole search from `start` to `goal`.
pub fn solve<H, Sp, St, C>(space: &Sp, start: St, goal: St) -> SearchResult<St, C>
where
    H: Heuristic<St, C>,
    Sp: Space<St, C>,
    St: State,
    C: Cost,
{
    let mut search = AStarSearch::<H, Sp, St, C>::new(space, start, goal);
    let path = search.find_path();
    SearchResult {
        path,
        stats: search.stats(),
    }
}

/// The algorithms available to route on a grid.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Algorithm {
    /// Uniform Cost Search, ranks by accumulated cost only.
    #[display("UCS")]
    #[value(name = "ucs")]
    UniformCost,
    /// A*, ranks by accumulated cost plus Manhattan distance.
    #[display("A*")]
    #[value(name = "astar")]
    AStar,
}
