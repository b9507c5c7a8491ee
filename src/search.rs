use nonmax::NonMaxU32;

use crate::cost::Cost;
use crate::space::Path;
use crate::space::State;

/// A reference to a `SearchTreeNode<St, C>`.
///
/// Nodes only ever get appended to their tree, so an index stays valid for
/// the whole search run. `NonMaxU32` keeps `Option<SearchTreeIndex>` (the
/// parent link) as wide as the index itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchTreeIndex {
    index: NonMaxU32,
}

impl SearchTreeIndex {
    #[inline(always)]
    fn new(index: usize) -> Self {
        let index = u32::try_from(index)
            .ok()
            .and_then(NonMaxU32::new)
            .expect("search tree outgrew u32 indices");
        Self { index }
    }

    #[inline(always)]
    pub fn as_usize(&self) -> usize {
        self.index.get() as usize
    }
}

/// One discovered way of reaching a State.
///
/// A state may own several nodes while it's open, one per improvement found.
/// Only the first one popped gets expanded.
#[derive(Debug)]
#[cfg_attr(feature = "inspect", derive(Clone))]
pub struct SearchTreeNode<St, C>
where
    St: State,
    C: Cost,
{
    pub(crate) parent: Option<SearchTreeIndex>,
    pub(crate) state: St,
    pub(crate) g: C,
}

impl<St, C> SearchTreeNode<St, C>
where
    St: State,
    C: Cost,
{
    pub fn new(s: St, parent: Option<SearchTreeIndex>, g: C) -> Self {
        Self {
            parent,
            state: s,
            g,
        }
    }

    pub fn state(&self) -> &St {
        &self.state
    }
    pub fn g(&self) -> C {
        self.g
    }
    pub fn parent(&self) -> Option<SearchTreeIndex> {
        self.parent
    }
}

/// All the nodes created by a search run.
///
/// Parent links point back into the same tree, forming a Search Forest that
/// the run owns and drops as a whole.
pub(crate) struct SearchTree<St, C>
where
    St: State,
    C: Cost,
{
    nodes: Vec<SearchTreeNode<St, C>>,
}

impl<St, C> SearchTree<St, C>
where
    St: State,
    C: Cost,
{
    #[inline(always)]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    #[inline(always)]
    pub(crate) fn push(&mut self, node: SearchTreeNode<St, C>) -> SearchTreeIndex {
        let index = SearchTreeIndex::new(self.nodes.len());
        self.nodes.push(node);
        index
    }

    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Rebuilds the path to a node by walking its parents back to the root.
    ///
    /// The cost is the node's `g`. Costs of the individual moves don't need to
    /// be recomputed.
    #[must_use]
    pub fn path(&self, mut node_index: SearchTreeIndex) -> Path<St, C> {
        let end = &self[node_index];
        let mut path = Path::<St, C>::new_from_start(end.state);
        path.cost = end.g;

        while let Some(parent_index) = self[node_index].parent() {
            debug_assert!(node_index != parent_index);
            debug_assert!(self[parent_index].g <= self[node_index].g);
            path.states.push(self[parent_index].state);
            node_index = parent_index;
        }

        path.reverse();
        path
    }
}

impl<St, C> Default for SearchTree<St, C>
where
    St: State,
    C: Cost,
{
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<St, C> std::ops::Index<SearchTreeIndex> for SearchTree<St, C>
where
    St: State,
    C: Cost,
{
    type Output = SearchTreeNode<St, C>;

    #[inline(always)]
    fn index(&self, index: SearchTreeIndex) -> &Self::Output {
        &self.nodes[index.as_usize()]
    }
}

impl<St, C> std::fmt::Debug for SearchTree<St, C>
where
    St: State,
    C: Cost,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "SearchTree{{({} nodes)}}", self.len())
    }
}
