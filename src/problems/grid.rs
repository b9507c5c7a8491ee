//! 4-connected occupancy grids where every move costs 1.

use derive_more::Display;
use thiserror::Error;

use crate::space::Heuristic;
use crate::space::Neighbours;
use crate::space::Space;
use crate::space::State;

pub type Coord = u32;
pub type GridCost = u32;

const STEP_COST: GridCost = 1;

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[display("({row},{col})")]
pub struct GridCell {
    pub row: Coord,
    pub col: Coord,
}

impl GridCell {
    pub const fn new(row: Coord, col: Coord) -> Self {
        Self { row, col }
    }

    pub fn manhattan_distance(&self, other: &GridCell) -> Coord {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// The cell one step away, unless that falls under row/column 0.
    fn offset(&self, d_row: i8, d_col: i8) -> Option<GridCell> {
        Some(GridCell {
            row: self.row.checked_add_signed(d_row.into())?,
            col: self.col.checked_add_signed(d_col.into())?,
        })
    }
}
impl State for GridCell {}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridCellParseError {
    #[error("Expected 'row,col' but got '{0}'")]
    MissingComma(String),
    #[error("Invalid coordinate '{0}'")]
    InvalidCoordinate(String),
}

impl std::str::FromStr for GridCell {
    type Err = GridCellParseError;

    /// Parses `row,col`, as in `7,19`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, col) = s
            .split_once(',')
            .ok_or_else(|| GridCellParseError::MissingComma(s.to_string()))?;
        let parse = |c: &str| {
            c.trim()
                .parse::<Coord>()
                .map_err(|_| GridCellParseError::InvalidCoordinate(c.trim().to_string()))
        };
        Ok(GridCell::new(parse(row)?, parse(col)?))
    }
}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash)]
pub enum Terrain {
    #[display(".")]
    Walkable,
    #[display("#")]
    Blocked,
    /// Walkable, with a point of interest on it.
    #[display("E")]
    Landmark,
}

impl Terrain {
    pub fn is_walkable(&self) -> bool {
        *self != Terrain::Blocked
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TerrainParseError {
    #[error("Invalid character '{0}' found.")]
    InvalidCharacter(char),
}

impl std::convert::TryFrom<char> for Terrain {
    type Error = TerrainParseError;

    fn try_from(ch: char) -> Result<Self, Self::Error> {
        match ch {
            ' ' | '.' | '0' => Ok(Terrain::Walkable),
            '#' | 'X' | '█' | '1' => Ok(Terrain::Blocked),
            'E' | '2' => Ok(Terrain::Landmark),
            ch => Err(TerrainParseError::InvalidCharacter(ch)),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridParseError {
    #[error("Empty input")]
    EmptyInput,
    #[error("Row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("Invalid cell {e} found at ({row},{col})")]
    InvalidCell {
        e: TerrainParseError,
        row: usize,
        col: usize,
    },
}

/// A rectangular grid of terrain, indexed as `map[row][col]`.
#[derive(Clone, PartialEq, Eq)]
pub struct GridSpace {
    pub(crate) map: Vec<Vec<Terrain>>,
}

impl GridSpace {
    /// Wraps a map, checking that it's a non-empty rectangle.
    pub fn new_from_map(map: Vec<Vec<Terrain>>) -> Result<Self, GridParseError> {
        let expected = match map.first() {
            Some(first) if !first.is_empty() => first.len(),
            _ => return Err(GridParseError::EmptyInput),
        };
        if let Some((row, line)) = map
            .iter()
            .enumerate()
            .find(|(_, line)| line.len() != expected)
        {
            return Err(GridParseError::RaggedRow {
                row,
                found: line.len(),
                expected,
            });
        }
        Ok(Self { map })
    }

    /// `(rows, cols)`
    pub fn dimensions(&self) -> (usize, usize) {
        if self.map.is_empty() {
            return (0, 0);
        }
        (self.map.len(), self.map[0].len())
    }

    #[inline(always)]
    pub fn in_bounds(&self, cell: &GridCell) -> bool {
        let (rows, cols) = self.dimensions();
        (cell.row as usize) < rows && (cell.col as usize) < cols
    }

    #[inline(always)]
    pub fn terrain(&self, cell: &GridCell) -> Option<Terrain> {
        self.map
            .get(cell.row as usize)?
            .get(cell.col as usize)
            .copied()
    }

    /// Replaces the terrain of an in-bounds cell, returning the old one.
    pub fn set_terrain(&mut self, cell: &GridCell, terrain: Terrain) -> Option<Terrain> {
        let slot = self
            .map
            .get_mut(cell.row as usize)?
            .get_mut(cell.col as usize)?;
        Some(std::mem::replace(slot, terrain))
    }

    /// All cells, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (GridCell, Terrain)> + '_ {
        self.map.iter().enumerate().flat_map(|(row, line)| {
            line.iter()
                .enumerate()
                .map(move |(col, t)| (GridCell::new(row as Coord, col as Coord), *t))
        })
    }

    pub fn count(&self, terrain: Terrain) -> usize {
        self.cells().filter(|(_, t)| *t == terrain).count()
    }
}

impl Space<GridCell, GridCost> for GridSpace {
    /// Gets the walkable orthogonal neighbours of a cell.
    ///
    /// Always in the same order: up, down, left, right.
    fn neighbours(&self, cell: &GridCell) -> Neighbours<GridCell, GridCost> {
        let mut v = Neighbours::<GridCell, GridCost>::new();
        for (d_row, d_col) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
            match cell.offset(d_row, d_col) {
                Some(n) if self.valid(&n) => v.push((n, STEP_COST)),
                _ => {}
            }
        }
        v
    }

    /// In bounds and not blocked.
    #[inline(always)]
    fn valid(&self, cell: &GridCell) -> bool {
        self.terrain(cell).is_some_and(|t| t.is_walkable())
    }

    fn size(&self) -> Option<usize> {
        let (rows, cols) = self.dimensions();
        Some(rows * cols)
    }
}

impl std::convert::TryFrom<&str> for GridSpace {
    type Error = GridParseError;

    /// One line per row, one character per cell.
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let mut map = Vec::<Vec<Terrain>>::new();
        for (row, line) in s.lines().enumerate() {
            let cells = line
                .chars()
                .enumerate()
                .map(|(col, ch)| {
                    Terrain::try_from(ch).map_err(|e| GridParseError::InvalidCell { e, row, col })
                })
                .collect::<Result<Vec<_>, _>>()?;
            map.push(cells);
        }
        GridSpace::new_from_map(map)
    }
}

impl std::fmt::Display for GridSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for line in &self.map {
            for cell in line {
                write!(f, "{cell}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for GridSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "GridSpace{:?}", self.dimensions())
    }
}

#[derive(Debug)]
#[cfg_attr(feature = "inspect", derive(Clone))]
pub struct ManhattanDistance;

impl Heuristic<GridCell, GridCost> for ManhattanDistance {
    /// The distance of following straight lines
    ///
    /// Exact on an empty grid, so it never overestimates.
    #[inline(always)]
    fn h(a: &GridCell, b: &GridCell) -> GridCost {
        a.manhattan_distance(b) * STEP_COST
    }
}
