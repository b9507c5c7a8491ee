//! Implementation of A*, a best-first search ranked by `f = g + h`.

use std::marker::PhantomData;

use rustc_hash::FxHashMap;
use rustc_hash::FxHashSet;

use crate::algorithms::SearchStats;
use crate::cost::Cost;
use crate::data_structures::open_list::OpenList;
use crate::search::SearchTree;
use crate::search::SearchTreeIndex;
use crate::search::SearchTreeNode;
use crate::space::Heuristic;
use crate::space::Path;
use crate::space::Space;
use crate::space::State;

/// The ranking tuple for A*
///
/// We prefer better f-values, tie break for lower h, and then for the entry
/// that was pushed first.
///
/// Preferring a lower h favours nodes closer to the goal among equally
/// promising ones. The push order makes the ranking total, so runs are
/// deterministic.
///
/// ```
/// use eatery_search::algorithms::astar::AStarRank;
///
/// // Same f-value, needs tie-breaking on h
/// assert!(AStarRank::new(2u32, 0u32, 7) < AStarRank::new(0u32, 2u32, 1));
/// // Same f and h, first pushed goes first
/// assert!(AStarRank::new(1u32, 1u32, 3) < AStarRank::new(1u32, 1u32, 4));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct AStarRank<C: Cost> {
    f: C,
    h: C,
    order: u64,
}
impl<C> AStarRank<C>
where
    C: Cost,
{
    pub fn new(g: C, h: C, order: u64) -> Self {
        Self {
            f: g.saturating_add(&h),
            h,
            order,
        }
    }
    pub fn f(&self) -> C {
        self.f
    }
    pub fn h(&self) -> C {
        self.h
    }
}

/// A heap node for A*
///
/// Heap nodes carry just ranking information and an index to the actual
/// search node, so heap operations move as little data as possible.
#[derive(Debug)]
#[cfg_attr(feature = "inspect", derive(Clone))]
pub struct AStarHeapNode<C>
where
    C: Cost,
{
    /// The rank of this node that defines how good it is.
    pub rank: AStarRank<C>,
    /// The index of this node in the Search Tree. Ignored when ranking.
    pub node_index: SearchTreeIndex,
}

/// PartialEq is forwarded to self.rank's PartialEq
impl<C: Cost> PartialEq for AStarHeapNode<C> {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.rank.eq(&other.rank)
    }
}
impl<C: Cost> Eq for AStarHeapNode<C> {}

/// PartialOrd is forwarded to Ord::cmp
impl<C: Cost> PartialOrd for AStarHeapNode<C> {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
/// Ord is forwarded to self.rank's Ord
impl<C: Cost> Ord for AStarHeapNode<C> {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank.cmp(&other.rank)
    }
}

/// A* search from a single start to a single goal.
///
/// The search borrows its space until it's dropped. With `ZeroHeuristic` this
/// is Uniform Cost Search (Dijkstra with an early exit).
#[derive(Debug)]
pub struct AStarSearch<'a, H, Sp, St, C>
where
    H: Heuristic<St, C>,
    Sp: Space<St, C>,
    St: State,
    C: Cost,
{
    space: &'a Sp,
    goal: St,

    /// Every node ever pushed. Parent links make it a Search Tree rooted at
    /// the start.
    search_tree: SearchTree<St, C>,

    /// Entries may be stale, they get skipped when their state is closed.
    open: OpenList<AStarHeapNode<C>>,

    /// The best `g` found so far for every reached state.
    best_g: FxHashMap<St, C>,

    /// The "Closed Set". States in here have their optimal `g` and won't be
    /// expanded again.
    closed: FxHashSet<St>,

    nodes_expanded: usize,
    pushes: u64,

    _phantom_heuristic: PhantomData<H>,
}

impl<'a, H, Sp, St, C> AStarSearch<'a, H, Sp, St, C>
where
    H: Heuristic<St, C>,
    Sp: Space<St, C>,
    St: State,
    C: Cost,
{
    /// Sets up a search.
    ///
    /// Both `start` and `goal` are expected to be valid in `space`.
    #[must_use]
    pub fn new(space: &'a Sp, start: St, goal: St) -> Self {
        debug_assert!(space.valid(&start), "Invalid start {start:?}");
        debug_assert!(space.valid(&goal), "Invalid goal {goal:?}");

        let mut search = Self {
            space,
            goal,
            search_tree: SearchTree::<St, C>::new(),
            open: OpenList::with_capacity(64),
            best_g: FxHashMap::default(),
            closed: FxHashSet::default(),
            nodes_expanded: 0,
            pushes: 0,
            _phantom_heuristic: PhantomData,
        };

        let g = C::zero();
        search.best_g.insert(start, g);
        search.push_new(start, None, g);

        search
    }

    /// Runs the search until the goal is popped or the Open list runs out.
    ///
    /// The first time the goal is popped its cost is optimal as long as the
    /// heuristic is consistent. Further calls return `None`.
    #[must_use]
    pub fn find_path(&mut self) -> Option<Path<St, C>> {
        while let Some(heap_node) = self.open.pop() {
            let node_index = heap_node.node_index;
            let node = &self.search_tree[node_index];
            let state = *node.state();
            let g = node.g();

            // A cheaper entry for this state was expanded already.
            if self.closed.contains(&state) {
                continue;
            }

            if state == self.goal {
                log::debug!(
                    "Found {:?} with cost {} after expanding {} nodes",
                    state,
                    g,
                    self.nodes_expanded
                );
                let path = self.search_tree.path(node_index);
                debug_assert!(path.seems_valid());
                // Nothing else is worth looking at.
                self.open.clear();
                return Some(path);
            }

            // Mark as closed
            self.closed.insert(state);
            self.nodes_expanded += 1;
            log::trace!("Expanding {state:?} (g={g}, f={})", heap_node.rank.f());

            // Expand state
            for (s, c) in self.space.neighbours(&state) {
                if self.closed.contains(&s) {
                    continue;
                }

                let new_g = g.saturating_add(&c);
                if self.best_g.get(&s).is_some_and(|&old_g| old_g <= new_g) {
                    continue;
                }

                // Either a new state or a better path to an open one.
                self.best_g.insert(s, new_g);
                self.push_new(s, Some(node_index), new_g);
            }
        }

        log::debug!(
            "Exhausted the Open list after expanding {} nodes without reaching {:?}",
            self.nodes_expanded,
            self.goal
        );
        None
    }

    #[inline(always)]
    fn push_new(&mut self, s: St, parent: Option<SearchTreeIndex>, g: C) {
        debug_assert!(!self.closed.contains(&s));

        let h = H::h(&s, &self.goal);
        let node_index = self
            .search_tree
            .push(SearchTreeNode::<St, C>::new(s, parent, g));
        self.open.push(AStarHeapNode {
            rank: AStarRank::new(g, h, self.pushes),
            node_index,
        });
        self.pushes += 1;
    }

    #[inline(always)]
    #[must_use]
    pub fn is_closed(&self, s: &St) -> bool {
        self.closed.contains(s)
    }

    pub fn stats(&self) -> SearchStats {
        SearchStats {
            nodes_expanded: self.nodes_expanded,
            nodes_generated: self.search_tree.len(),
            max_frontier: self.open.peak_len(),
            visited: self.closed.len(),
        }
    }

    pub fn write_memory_stats<W: std::io::Write>(&self, mut out: W) -> std::io::Result<()> {
        use size::Size;
        use std::mem::size_of;
        use thousands::Separable;

        writeln!(out, "AStarSearch Stats:")?;
        let s = size_of::<SearchTreeNode<St, C>>();
        let l = self.search_tree.len();
        writeln!(
            out,
            "  - |Nodes|:   {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;

        let s = size_of::<AStarHeapNode<C>>();
        let l = self.open.peak_len();
        let c = self.open.capacity();
        writeln!(
            out,
            "  - |Open|^:  {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        writeln!(
            out,
            "  - |Open|*:  {} ({})",
            c.separate_with_commas(),
            Size::from_bytes(c * s)
        )?;

        let s = size_of::<St>();
        let l = self.closed.len();
        writeln!(
            out,
            "  - |Closed|: {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;

        let s = size_of::<(St, C)>();
        let l = self.best_g.len();
        writeln!(
            out,
            "  - |Costs|:  {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;

        writeln!(
            out,
            "  - Expanded nodes: {}",
            self.nodes_expanded.separate_with_commas()
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use indoc::indoc;
    use rand::Rng;
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    use super::*;
    use crate::algorithms::solve;
    use crate::problems::grid::GridCell;
    use crate::problems::grid::GridCost;
    use crate::problems::grid::GridSpace;
    use crate::problems::grid::ManhattanDistance;
    use crate::problems::grid::Terrain;
    use crate::space::ZeroHeuristic;

    fn cell(row: u32, col: u32) -> GridCell {
        GridCell::new(row, col)
    }

    /// Shortest distance by plain breadth-first search.
    fn bfs(space: &GridSpace, start: GridCell, goal: GridCell) -> Option<GridCost> {
        let mut distance = FxHashMap::<GridCell, GridCost>::default();
        let mut queue = VecDeque::from([start]);
        distance.insert(start, 0);
        while let Some(c) = queue.pop_front() {
            let d = distance[&c];
            if c == goal {
                return Some(d);
            }
            for (n, _) in space.neighbours(&c) {
                if !distance.contains_key(&n) {
                    distance.insert(n, d + 1);
                    queue.push_back(n);
                }
            }
        }
        None
    }

    fn component_size(space: &GridSpace, start: GridCell) -> usize {
        let mut seen = FxHashSet::<GridCell>::from_iter([start]);
        let mut stack = vec![start];
        while let Some(c) = stack.pop() {
            for (n, _) in space.neighbours(&c) {
                if seen.insert(n) {
                    stack.push(n);
                }
            }
        }
        seen.len()
    }

    fn random_grid(rng: &mut ChaCha8Rng, rows: usize, cols: usize) -> GridSpace {
        let map = (0..rows)
            .map(|_| {
                (0..cols)
                    .map(|_| {
                        if rng.random_bool(0.3) {
                            Terrain::Blocked
                        } else {
                            Terrain::Walkable
                        }
                    })
                    .collect()
            })
            .collect();
        GridSpace::new_from_map(map).unwrap()
    }

    fn random_open_cell(rng: &mut ChaCha8Rng, space: &GridSpace) -> Option<GridCell> {
        let (rows, cols) = space.dimensions();
        for _ in 0..100 {
            let c = cell(
                rng.random_range(0..rows as u32),
                rng.random_range(0..cols as u32),
            );
            if space.valid(&c) {
                return Some(c);
            }
        }
        None
    }

    fn assert_well_formed(
        space: &GridSpace,
        path: &Path<GridCell, GridCost>,
        s: GridCell,
        g: GridCell,
    ) {
        assert_eq!(path.start(), Some(&s));
        assert_eq!(path.end(), Some(&g));
        for pair in path.states.windows(2) {
            assert_eq!(pair[0].manhattan_distance(&pair[1]), 1, "{pair:?}");
        }
        assert!(path.seems_valid());
        assert!(path.is_simple());
        assert_eq!(path.cost as usize, path.steps());
        assert!(space.valid_path(path));
    }

    #[test]
    fn ranking_grid() {
        let c0: GridCost = 0u32;
        let c1: GridCost = 1u32;
        let c2: GridCost = 2u32;

        let g = c2;
        let h_low = c0;
        let h_high = c1;
        assert!(AStarRank::new(g, h_low, 0) < AStarRank::new(g, h_high, 0));
        assert!(AStarRank::new(g, h_high, 0) == AStarRank::new(g, h_high, 0));
        assert!(AStarRank::new(g, h_high, 0) > AStarRank::new(g, h_low, 0));

        // Same f-value, needs tie-breaking on h
        let low = AStarRank::new(c2, c0, 1);
        let high = AStarRank::new(c0, c2, 0);
        assert!(low < high);
        assert!(low.f() == high.f());
        assert!(low.h() < high.h());
    }

    #[test]
    fn start_is_goal() {
        let space = GridSpace::try_from(indoc! {"
            ...
            .#.
            ...
        "})
        .unwrap();
        let result = solve::<ManhattanDistance, _, _, _>(&space, cell(2, 2), cell(2, 2));

        let path = result.path.unwrap();
        assert_eq!(path.states, vec![cell(2, 2)]);
        assert_eq!(path.cost, 0);
        assert_eq!(result.stats.nodes_expanded, 0);
    }

    #[test]
    fn walks_around_walls() {
        let space = GridSpace::try_from(indoc! {"
            .....
            .###.
            .#...
            .###.
            ...#.
        "})
        .unwrap();
        let (s, g) = (cell(2, 2), cell(4, 2));

        for result in [
            solve::<ZeroHeuristic, _, _, _>(&space, s, g),
            solve::<ManhattanDistance, _, _, _>(&space, s, g),
        ] {
            let path = result.path.unwrap();
            assert_well_formed(&space, &path, s, g);
            assert_eq!(path.cost, 14);
        }
    }

    #[test]
    fn unreachable_goal_expands_the_whole_component() {
        let space = GridSpace::try_from(indoc! {"
            ..#..
            ..#..
            ###..
        "})
        .unwrap();
        let (s, g) = (cell(0, 0), cell(2, 4));

        for result in [
            solve::<ZeroHeuristic, _, _, _>(&space, s, g),
            solve::<ManhattanDistance, _, _, _>(&space, s, g),
        ] {
            assert!(!result.is_found());
            assert_eq!(result.stats.nodes_expanded, 4);
            assert_eq!(result.stats.visited, 4);
        }
    }

    #[test]
    fn find_path_is_done_after_the_goal() {
        let space = GridSpace::try_from("....\n....\n").unwrap();
        let mut search =
            AStarSearch::<ManhattanDistance, _, _, _>::new(&space, cell(0, 0), cell(1, 3));

        assert_eq!(search.find_path().map(|p| p.cost), Some(4));
        assert_eq!(search.find_path(), None);
        assert!(search.is_closed(&cell(0, 0)));
        assert!(!search.is_closed(&cell(1, 3)));
    }

    #[test]
    fn memory_stats_are_written() {
        let space = GridSpace::try_from("...\n...\n").unwrap();
        let mut search =
            AStarSearch::<ZeroHeuristic, _, _, _>::new(&space, cell(0, 0), cell(1, 2));
        assert!(search.find_path().is_some());

        let mut out = Vec::<u8>::new();
        search.write_memory_stats(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("AStarSearch Stats:"));
        assert!(out.contains("Expanded nodes"));
    }

    #[test]
    fn ucs_and_astar_agree_with_bfs_on_random_grids() {
        for seed in 0..200u64 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let rows = rng.random_range(1..9usize);
            let cols = rng.random_range(1..9usize);
            let space = random_grid(&mut rng, rows, cols);
            let (Some(s), Some(g)) = (
                random_open_cell(&mut rng, &space),
                random_open_cell(&mut rng, &space),
            ) else {
                continue;
            };

            let ucs = solve::<ZeroHeuristic, _, _, _>(&space, s, g);
            let astar = solve::<ManhattanDistance, _, _, _>(&space, s, g);
            let expected = bfs(&space, s, g);

            assert_eq!(ucs.cost(), expected, "seed {seed}\n{space}");
            assert_eq!(astar.cost(), expected, "seed {seed}\n{space}");
            assert!(
                astar.stats.nodes_expanded <= ucs.stats.nodes_expanded,
                "seed {seed}: A* {} > UCS {}",
                astar.stats,
                ucs.stats
            );

            match (&ucs.path, &astar.path) {
                (Some(p), Some(q)) => {
                    assert_well_formed(&space, p, s, g);
                    assert_well_formed(&space, q, s, g);
                }
                (None, None) => {
                    let reachable = component_size(&space, s);
                    assert_eq!(ucs.stats.nodes_expanded, reachable, "seed {seed}");
                    assert_eq!(astar.stats.nodes_expanded, reachable, "seed {seed}");
                }
                _ => unreachable!("seed {seed}: only one algorithm found a path"),
            }
        }
    }
}
