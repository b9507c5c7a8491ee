use std::fmt::Debug;
use std::hash::Hash;

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::cost::Cost;

/// A position in a search space.
///
/// Two states are the same node for the search whenever they compare equal,
/// regardless of the path that reached them.
pub trait State: Copy + Clone + Debug + PartialEq + Eq + Hash {}

/// Successors of a state paired with the cost of reaching each of them.
///
/// Grid states have at most 4 neighbours, larger fan-outs spill to the heap.
pub type Neighbours<St, C> = SmallVec<[(St, C); 4]>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path<St, C>
where
    St: State,
    C: Cost,
{
    /// Visited states, from start to end.
    pub states: Vec<St>,
    pub cost: C,
}

impl<St, C> Path<St, C>
where
    St: State,
    C: Cost,
{
    #[inline(always)]
    pub fn new_from_start(start: St) -> Self {
        Self {
            states: vec![start],
            cost: C::zero(),
        }
    }

    #[inline(always)]
    pub fn start(&self) -> Option<&St> {
        self.states.first()
    }
    #[inline(always)]
    pub fn end(&self) -> Option<&St> {
        self.states.last()
    }

    /// Number of states on the path, including both ends.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.states.len()
    }
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
    /// Number of moves taken.
    #[inline(always)]
    pub fn steps(&self) -> usize {
        self.states.len().saturating_sub(1)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, St> {
        self.states.iter()
    }

    /// Reverses the Path.
    ///
    /// Useful when naturally reconstructing paths in reverse.
    pub fn reverse(&mut self) {
        self.states.reverse();
    }

    /// Whether no state shows up twice.
    pub fn is_simple(&self) -> bool {
        let mut seen = FxHashSet::<St>::default();
        self.states.iter().all(|s| seen.insert(*s))
    }

    /// Runs sanity checks
    #[inline(always)]
    pub fn seems_valid(&self) -> bool {
        !self.states.is_empty() && self.cost.valid()
    }
}

impl<St, C> std::fmt::Display for Path<St, C>
where
    St: State + std::fmt::Display,
    C: Cost,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Path({}, ", self.cost)?;
        for (i, s) in self.states.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{s}")?;
        }
        write!(f, ")")
    }
}

impl<'a, St, C> IntoIterator for &'a Path<St, C>
where
    St: State,
    C: Cost,
{
    type Item = &'a St;
    type IntoIter = std::slice::Iter<'a, St>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.iter()
    }
}

/// Read access to a graph-like space.
///
/// Searches borrow the space for their whole run, so a space can't change
/// while a search over it is alive.
pub trait Space<St, C>: std::fmt::Debug
where
    St: State,
    C: Cost,
{
    /// Expands a State
    fn neighbours(&self, s: &St) -> Neighbours<St, C>;
    /// Verify is a State is valid.
    fn valid(&self, s: &St) -> bool;

    /// Cheapest single move between two states, if they are adjacent.
    fn step_cost(&self, from: &St, to: &St) -> Option<C> {
        self.neighbours(from)
            .into_iter()
            .filter(|(s, _)| s == to)
            .map(|(_, c)| c)
            .min()
    }

    /// Whether every move on the path exists and costs add up.
    fn valid_path(&self, p: &Path<St, C>) -> bool {
        let Some(start) = p.start() else {
            return false;
        };
        if !self.valid(start) {
            return false;
        }

        let mut cost = C::zero();
        for pair in p.states.windows(2) {
            match self.step_cost(&pair[0], &pair[1]) {
                Some(c) => cost = cost.saturating_add(&c),
                None => return false,
            }
        }
        cost == p.cost
    }

    fn size(&self) -> Option<usize> {
        None
    }
}

/// An estimate of the cost between two states.
///
/// Must never overestimate for the search to return optimal paths.
pub trait Heuristic<St, C>: std::fmt::Debug
where
    St: State,
    C: Cost,
{
    fn h(s: &St, goal: &St) -> C;
}

/// The heuristic that knows nothing.
///
/// Turns A* into Uniform Cost Search.
#[derive(Debug)]
#[cfg_attr(feature = "inspect", derive(Clone))]
pub struct ZeroHeuristic;

impl<St, C> Heuristic<St, C> for ZeroHeuristic
where
    St: State,
    C: Cost,
{
    #[inline(always)]
    fn h(_s: &St, _goal: &St) -> C {
        C::zero()
    }
}
