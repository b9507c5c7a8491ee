// Index arithmetic for array-backed d-ary heaps.
//
// Every subtree's root ranks better than (or equal to) everything below it, so
// the frontier's best entry always sits at index 0.
//
// The entries live in a `Vec` that's traversed in a non-linear way. These are
// the indices we assign to each entry of a binary heap.
//
// ```text
//                           0
//              1                         2
//       3            4            5             6
//   7      8      9     10    11     12     13     14
// 15 16  17 18  19 20  21 22 23 24  25
// ```
//
// The last level will often be incomplete
//
// You can easily go up, down-left, and down-right from any index with,
//   - Up:         `(i-1)//A`
//   - Down-left:  `(A*i) + 1`
//   - Down-right: `A(i+1)`
// where `A` is the arity (2 in the picture).

/// The parent node
///
/// ```
/// use eatery_search::heap_primitives::index_parent;
/// assert_eq!(index_parent::<2>(1), 0);
/// assert_eq!(index_parent::<2>(2), 0);
/// assert_eq!(index_parent::<2>(25), 12);
/// // 4-ary, as used by the frontier
/// assert_eq!(index_parent::<4>(1), 0);
/// assert_eq!(index_parent::<4>(4), 0);
/// assert_eq!(index_parent::<4>(5), 1);
/// assert_eq!(index_parent::<4>(9), 2);
/// assert_eq!(index_parent::<4>(21), 5);
/// ```
#[inline(always)]
#[must_use]
pub fn index_parent<const A: usize>(i: usize) -> usize {
    (i - 1) / A
}

/// The left children
///
/// ```
/// use eatery_search::heap_primitives::index_first_children;
/// assert_eq!(index_first_children::<2>(0), 1);
/// assert_eq!(index_first_children::<2>(11), 23);
/// assert_eq!(index_first_children::<4>(0), 1);
/// assert_eq!(index_first_children::<4>(1), 5);
/// assert_eq!(index_first_children::<4>(5), 21);
/// ```
#[inline(always)]
#[must_use]
pub fn index_first_children<const A: usize>(i: usize) -> usize {
    (A * i) + 1
}

/// The last children
///
/// ```
/// use eatery_search::heap_primitives::index_last_children;
/// assert_eq!(index_last_children::<2>(0), 2);
/// assert_eq!(index_last_children::<2>(6), 14);
/// assert_eq!(index_last_children::<4>(0), 4);
/// assert_eq!(index_last_children::<4>(1), 8);
/// assert_eq!(index_last_children::<4>(2), 12);
/// ```
#[inline(always)]
#[must_use]
pub fn index_last_children<const A: usize>(i: usize) -> usize {
    A * (i + 1)
}
