//! The campus map: a grid plus the eateries placed on it.
//!
//! `CampusMap` is the session object callers mutate between searches. It
//! validates endpoints before handing them to the search core.

use derive_more::Display;
use thiserror::Error;

use crate::algorithms::Algorithm;
use crate::algorithms::SearchResult;
use crate::algorithms::solve;
use crate::problems::grid::GridCell;
use crate::problems::grid::GridCellParseError;
use crate::problems::grid::GridCost;
use crate::problems::grid::GridSpace;
use crate::problems::grid::ManhattanDistance;
use crate::problems::grid::Terrain;
use crate::space::Path;
use crate::space::ZeroHeuristic;

const KEY_LETTERS: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

const O: Terrain = Terrain::Walkable;
const X: Terrain = Terrain::Blocked;
const E: Terrain = Terrain::Landmark;

#[rustfmt::skip]
const DLSU_GRID: [[Terrain; 20]; 10] = [
    // 0 1  2  3  4  5  6  7  8  9 10 11 12 13 14 15 16 17 18 19
    [O, O, O, O, O, O, O, O, O, O, O, O, O, E, O, O, O, O, O, O],
    [O, O, O, E, E, X, X, X, X, X, E, O, X, E, E, O, X, E, X, E],
    [O, O, O, O, O, O, O, O, O, O, O, O, O, O, O, O, O, O, O, O],
    [X, X, X, X, X, X, O, X, X, X, X, X, X, O, X, X, X, O, X, X],
    [X, X, X, X, X, X, O, X, X, X, X, X, X, O, X, X, X, O, X, X],
    [X, X, X, X, X, X, O, X, X, X, X, X, X, O, X, X, X, O, X, X],
    [O, O, O, O, O, O, O, O, O, O, O, O, O, O, O, O, O, O, O, O],
    [X, X, X, E, E, E, O, E, X, E, E, X, O, O, O, O, O, O, E, E],
    [O, E, O, O, O, O, O, O, O, O, O, O, O, O, O, O, O, E, O, O],
    [X, X, X, X, E, E, X, E, X, X, X, E, O, O, O, O, O, O, O, O],
];

/// `(name, row, col, cuisine)`
const DLSU_EATERIES: &[(&str, u32, u32, &str)] = &[
    ("University Mall", 7, 19, "Fast Food"),
    ("McDonald's", 7, 18, "Fast Food"),
    ("Perico's", 8, 17, "Filipino"),
    ("Bloemen Hall", 9, 11, "Fast Food, Filipino, Japanese"),
    ("W.H. Taft Residence", 7, 10, "American"),
    ("EGI Taft", 7, 9, "Chinese, Korean, Vietnamese"),
    ("Castro St.", 7, 7, "American, Fast Food"),
    ("Agno Food Court", 9, 7, "Chinese, Filipino, Italian"),
    ("One Archers'", 7, 5, "Filipino, Japanese, Korean"),
    ("La Casita (Br. Andrew Gonzalez Hall)", 7, 4, "Filipino"),
    ("La Casita (Enrique Razon Sports Center)", 9, 4, "Filipino"),
    ("Green Mall", 7, 3, "American, Fast Food"),
    ("Green Court", 9, 5, "Fast Food"),
    ("Sherwood", 1, 3, "Chinese, Korean, Middle Eastern"),
    ("Jollibee", 1, 4, "Fast Food"),
    ("Dagonoy St.", 1, 10, "Filipino"),
    ("Burgundy", 1, 13, "American"),
    ("Estrada St.", 1, 14, "Filipino, Mexican"),
    ("D'Student's Place", 1, 17, "American, Korean"),
    ("Leon Guinto St.", 0, 13, "Filipino, Korean"),
    ("P. Ocampo St.", 1, 19, "Filipino, Japanese"),
    ("Fidel A. Reyes St.", 8, 1, "Filipino"),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CampusError {
    #[error("{0} is out of the {1}x{2} map")]
    OutOfBounds(GridCell, usize, usize),
    #[error("{0} is blocked")]
    Blocked(GridCell),
    #[error("{0} isn't blocked")]
    NotBlocked(GridCell),
    #[error("{cell} is taken by '{name}'")]
    OccupiedByLandmark { cell: GridCell, name: String },
    #[error("An eatery named '{0}' already exists")]
    DuplicateLandmark(String),
    #[error("No eatery matches '{0}'")]
    UnknownLandmark(String),
    #[error("All keys from A to ZZ are taken")]
    KeysExhausted,
    #[error(transparent)]
    InvalidCell(#[from] GridCellParseError),
}

/// A named point of interest bound to a cell.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
#[display("{key} - {name}: {cell} ({cuisine})")]
pub struct Landmark {
    /// Short handle, `A`..`Z` then `AA`..`ZZ`.
    pub key: String,
    pub name: String,
    pub cell: GridCell,
    pub cuisine: String,
}

#[derive(Clone, Debug)]
pub struct CampusMap {
    grid: GridSpace,
    landmarks: Vec<Landmark>,
}

impl CampusMap {
    /// A map without landmarks.
    ///
    /// Cells marked as landmarks in the grid stay that way, they just have no
    /// name.
    pub fn new(grid: GridSpace) -> Self {
        Self {
            grid,
            landmarks: vec![],
        }
    }

    /// The DLSU campus and its eateries.
    pub fn dlsu() -> Self {
        let grid = GridSpace {
            map: DLSU_GRID.iter().map(|row| row.to_vec()).collect(),
        };
        let mut map = Self::new(grid);
        for &(name, row, col, cuisine) in DLSU_EATERIES {
            let key = map.next_key().unwrap_or_default();
            map.landmarks.push(Landmark {
                key,
                name: name.to_string(),
                cell: GridCell::new(row, col),
                cuisine: cuisine.to_string(),
            });
        }
        map
    }

    pub fn grid(&self) -> &GridSpace {
        &self.grid
    }
    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn landmark_at(&self, cell: &GridCell) -> Option<&Landmark> {
        self.landmarks.iter().find(|l| l.cell == *cell)
    }

    /// Finds a landmark by key, by full name, or by a piece of its name.
    ///
    /// All comparisons ignore case. Partial names return the first match.
    pub fn find_landmark(&self, query: &str) -> Option<&Landmark> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        let lower = query.to_lowercase();
        self.landmarks
            .iter()
            .find(|l| l.key.eq_ignore_ascii_case(query))
            .or_else(|| self.landmarks.iter().find(|l| l.name.to_lowercase() == lower))
            .or_else(|| {
                self.landmarks
                    .iter()
                    .find(|l| l.name.to_lowercase().contains(&lower))
            })
    }

    /// Checks a cell is somewhere a route can start or end.
    pub fn validate_endpoint(&self, cell: GridCell) -> Result<GridCell, CampusError> {
        match self.grid.terrain(&cell) {
            None => {
                let (rows, cols) = self.grid.dimensions();
                Err(CampusError::OutOfBounds(cell, rows, cols))
            }
            Some(Terrain::Blocked) => Err(CampusError::Blocked(cell)),
            Some(_) => Ok(cell),
        }
    }

    /// Turns `row,col` or a landmark query into a valid endpoint.
    ///
    /// Text that isn't a cell is looked up as a landmark. When that fails too,
    /// queries with a comma report why they aren't a cell.
    pub fn resolve(&self, query: &str) -> Result<GridCell, CampusError> {
        let cell = match query.parse::<GridCell>() {
            Ok(cell) => cell,
            Err(e) => match self.find_landmark(query) {
                Some(landmark) => landmark.cell,
                None if query.contains(',') => return Err(e.into()),
                None => return Err(CampusError::UnknownLandmark(query.to_string())),
            },
        };
        self.validate_endpoint(cell)
    }

    /// Finds the cheapest route between two cells.
    pub fn route(
        &self,
        algorithm: Algorithm,
        start: GridCell,
        goal: GridCell,
    ) -> Result<SearchResult<GridCell, GridCost>, CampusError> {
        let start = self.validate_endpoint(start)?;
        let goal = self.validate_endpoint(goal)?;
        log::debug!("Routing {start} -> {goal} with {algorithm}");

        Ok(match algorithm {
            Algorithm::UniformCost => solve::<ZeroHeuristic, _, _, _>(&self.grid, start, goal),
            Algorithm::AStar => solve::<ManhattanDistance, _, _, _>(&self.grid, start, goal),
        })
    }

    /// Places a new eatery on a walkable cell.
    pub fn add_landmark(
        &mut self,
        name: &str,
        cell: GridCell,
        cuisine: &str,
    ) -> Result<&Landmark, CampusError> {
        let cell = self.validate_endpoint(cell)?;
        if self.landmarks.iter().any(|l| l.name.eq_ignore_ascii_case(name)) {
            return Err(CampusError::DuplicateLandmark(name.to_string()));
        }
        if let Some(other) = self.landmark_at(&cell) {
            return Err(CampusError::OccupiedByLandmark {
                cell,
                name: other.name.clone(),
            });
        }
        let key = self.next_key().ok_or(CampusError::KeysExhausted)?;

        self.grid.set_terrain(&cell, Terrain::Landmark);
        self.landmarks.push(Landmark {
            key,
            name: name.to_string(),
            cell,
            cuisine: cuisine.to_string(),
        });
        log::debug!("Added '{name}' at {cell}");
        Ok(&self.landmarks[self.landmarks.len() - 1])
    }

    /// Removes an eatery, its cell becomes plain walkable ground.
    pub fn remove_landmark(&mut self, query: &str) -> Result<Landmark, CampusError> {
        let key = self
            .find_landmark(query)
            .ok_or_else(|| CampusError::UnknownLandmark(query.to_string()))?
            .key
            .clone();
        let index = self
            .landmarks
            .iter()
            .position(|l| l.key == key)
            .ok_or_else(|| CampusError::UnknownLandmark(query.to_string()))?;

        let landmark = self.landmarks.remove(index);
        self.grid.set_terrain(&landmark.cell, Terrain::Walkable);
        log::debug!("Removed '{}' from {}", landmark.name, landmark.cell);
        Ok(landmark)
    }

    /// Clears a blocked cell.
    pub fn open_cell(&mut self, cell: GridCell) -> Result<(), CampusError> {
        match self.grid.terrain(&cell) {
            Some(Terrain::Blocked) => {
                self.grid.set_terrain(&cell, Terrain::Walkable);
                log::debug!("{cell} is now walkable");
                Ok(())
            }
            Some(_) => Err(CampusError::NotBlocked(cell)),
            None => {
                let (rows, cols) = self.grid.dimensions();
                Err(CampusError::OutOfBounds(cell, rows, cols))
            }
        }
    }

    /// Blocks a walkable cell. Cells holding a landmark can't be blocked.
    pub fn block_cell(&mut self, cell: GridCell) -> Result<(), CampusError> {
        let cell = self.validate_endpoint(cell)?;
        if let Some(landmark) = self.landmark_at(&cell) {
            return Err(CampusError::OccupiedByLandmark {
                cell,
                name: landmark.name.clone(),
            });
        }
        self.grid.set_terrain(&cell, Terrain::Blocked);
        log::debug!("{cell} is now blocked");
        Ok(())
    }

    /// Names the cells of a path, using landmark names where there are any.
    pub fn describe(&self, path: &Path<GridCell, GridCost>) -> Vec<String> {
        path.iter()
            .map(|cell| match self.landmark_at(cell) {
                Some(landmark) => landmark.name.clone(),
                None => cell.to_string(),
            })
            .collect()
    }

    /// First key not in use, `A`..`Z` then `AA`..`ZZ`.
    fn next_key(&self) -> Option<String> {
        let taken = |key: &str| self.landmarks.iter().any(|l| l.key == key);

        let singles = KEY_LETTERS.iter().map(|&a| (a as char).to_string());
        let doubles = KEY_LETTERS.iter().flat_map(|&a| {
            KEY_LETTERS
                .iter()
                .map(move |&b| format!("{}{}", a as char, b as char))
        });
        singles.chain(doubles).find(|key| !taken(key))
    }
}

/// A textual dump of a route over the map.
///
/// `S` start, `G` goal, `*` path, `X` blocked, `E` eatery, `.` walkable.
pub struct RouteView<'a> {
    pub map: &'a CampusMap,
    pub path: Option<&'a Path<GridCell, GridCost>>,
}

impl std::fmt::Display for RouteView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (start, goal) = match self.path {
            Some(p) => (p.start(), p.end()),
            None => (None, None),
        };
        let on_path = |cell: &GridCell| self.path.is_some_and(|p| p.states.contains(cell));

        write!(f, "{:8}", "")?;
        let (_, cols) = self.map.grid.dimensions();
        for col in 0..cols {
            write!(f, "{:>2} ", col)?;
        }
        writeln!(f)?;

        for (row, line) in self.map.grid.map.iter().enumerate() {
            write!(f, "Row {row:2}: ")?;
            for (col, terrain) in line.iter().enumerate() {
                let cell = GridCell::new(row as u32, col as u32);
                let glyph = if Some(&cell) == start {
                    'S'
                } else if Some(&cell) == goal {
                    'G'
                } else if on_path(&cell) {
                    '*'
                } else {
                    match terrain {
                        Terrain::Blocked => 'X',
                        Terrain::Landmark => 'E',
                        Terrain::Walkable => '.',
                    }
                };
                write!(f, "{glyph:>2} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::Space;

    fn cell(row: u32, col: u32) -> GridCell {
        GridCell::new(row, col)
    }

    #[test]
    fn dlsu_landmarks_sit_on_landmark_cells() {
        let map = CampusMap::dlsu();
        assert_eq!(map.grid().dimensions(), (10, 20));
        assert_eq!(map.landmarks().len(), 22);
        for landmark in map.landmarks() {
            assert_eq!(
                map.grid().terrain(&landmark.cell),
                Some(Terrain::Landmark),
                "{landmark}"
            );
        }
        assert_eq!(map.landmarks()[0].key, "A");
        assert_eq!(map.landmarks()[21].key, "V");
    }

    #[test]
    fn green_mall_to_university_mall() {
        let map = CampusMap::dlsu();
        let (s, g) = (cell(7, 3), cell(7, 19));

        for algorithm in [Algorithm::UniformCost, Algorithm::AStar] {
            let result = map.route(algorithm, s, g).unwrap();
            let path = result.path.unwrap();
            assert_eq!(path.cost, 18, "{algorithm}");
            assert_eq!(path.len(), 19, "{algorithm}");
            assert_eq!(path.cost as usize, path.len() - 1);
            assert_eq!(path.start(), Some(&s));
            assert_eq!(path.end(), Some(&g));
            assert!(path.is_simple());
            assert!(map.grid().valid_path(&path));
        }

        let ucs = map.route(Algorithm::UniformCost, s, g).unwrap();
        let astar = map.route(Algorithm::AStar, s, g).unwrap();
        assert!(astar.stats.nodes_expanded <= ucs.stats.nodes_expanded);
    }

    #[test]
    fn describe_uses_landmark_names() {
        let map = CampusMap::dlsu();
        let result = map.route(Algorithm::AStar, cell(7, 18), cell(7, 19)).unwrap();
        let path = result.path.unwrap();
        assert_eq!(map.describe(&path), vec!["McDonald's", "University Mall"]);

        let result = map.route(Algorithm::AStar, cell(6, 0), cell(6, 1)).unwrap();
        assert_eq!(map.describe(&result.path.unwrap()), vec!["(6,0)", "(6,1)"]);
    }

    #[test]
    fn endpoints_are_validated() {
        let map = CampusMap::dlsu();
        assert_eq!(
            map.route(Algorithm::AStar, cell(3, 0), cell(7, 19)),
            Err(CampusError::Blocked(cell(3, 0)))
        );
        assert_eq!(
            map.route(Algorithm::UniformCost, cell(0, 0), cell(10, 0)),
            Err(CampusError::OutOfBounds(cell(10, 0), 10, 20))
        );
    }

    #[test]
    fn resolves_keys_names_and_coordinates() {
        let map = CampusMap::dlsu();
        assert_eq!(map.resolve("a"), Ok(cell(7, 19)));
        assert_eq!(map.resolve("Jollibee"), Ok(cell(1, 4)));
        assert_eq!(map.resolve("casita"), Ok(cell(7, 4)));
        assert_eq!(map.resolve("8,0"), Ok(cell(8, 0)));
        assert_eq!(map.resolve("9,0"), Err(CampusError::Blocked(cell(9, 0))));
        assert_eq!(
            map.resolve("Nowhere"),
            Err(CampusError::UnknownLandmark("Nowhere".to_string()))
        );
        assert_eq!(
            map.resolve("x,1"),
            Err(CampusError::InvalidCell(
                GridCellParseError::InvalidCoordinate("x".to_string())
            ))
        );
        assert_eq!(map.find_landmark("  "), None);
    }

    #[test]
    fn names_with_commas_still_resolve() {
        let mut map = CampusMap::dlsu();
        map.add_landmark("Tea, Co", cell(6, 8), "Drinks").unwrap();

        assert_eq!(map.resolve("Tea, Co"), Ok(cell(6, 8)));
        assert_eq!(map.resolve("tea,"), Ok(cell(6, 8)));
        assert_eq!(map.resolve("6,8"), Ok(cell(6, 8)));
        assert_eq!(
            map.resolve("Coffee, Co"),
            Err(CampusError::InvalidCell(
                GridCellParseError::InvalidCoordinate("Coffee".to_string())
            ))
        );
    }

    #[test]
    fn adding_landmarks() {
        let mut map = CampusMap::dlsu();

        let added = map.add_landmark("Kiosk", cell(6, 6), "Snacks").unwrap();
        assert_eq!(added.key, "W");
        assert_eq!(map.grid().terrain(&cell(6, 6)), Some(Terrain::Landmark));
        assert_eq!(map.resolve("kiosk"), Ok(cell(6, 6)));

        assert_eq!(
            map.add_landmark("Wall Stall", cell(4, 0), "").map(|l| l.key.clone()),
            Err(CampusError::Blocked(cell(4, 0)))
        );
        assert_eq!(
            map.add_landmark("kiosk", cell(2, 2), "").map(|l| l.key.clone()),
            Err(CampusError::DuplicateLandmark("kiosk".to_string()))
        );
        assert_eq!(
            map.add_landmark("Stand", cell(7, 19), "").map(|l| l.key.clone()),
            Err(CampusError::OccupiedByLandmark {
                cell: cell(7, 19),
                name: "University Mall".to_string()
            })
        );

        for i in 0..3 {
            map.add_landmark(&format!("Cart {i}"), cell(2, i), "").unwrap();
        }
        assert_eq!(map.find_landmark("Cart 2").unwrap().key, "Z");
        let next = map.add_landmark("Cart 3", cell(2, 3), "").unwrap();
        assert_eq!(next.key, "AA");
    }

    #[test]
    fn removing_a_landmark_frees_its_key_and_cell() {
        let mut map = CampusMap::dlsu();

        let removed = map.remove_landmark("b").unwrap();
        assert_eq!(removed.name, "McDonald's");
        assert_eq!(map.grid().terrain(&cell(7, 18)), Some(Terrain::Walkable));
        assert_eq!(map.find_landmark("McDonald"), None);
        assert!(map.remove_landmark("McDonald").is_err());

        let added = map.add_landmark("Burger Stand", cell(7, 18), "Fast Food").unwrap();
        assert_eq!(added.key, "B");
    }

    #[test]
    fn opening_and_blocking_cells_changes_routes() {
        let mut map = CampusMap::dlsu();
        let (s, g) = (cell(2, 0), cell(6, 0));
        assert_eq!(
            map.route(Algorithm::AStar, s, g).unwrap().cost(),
            Some(4 + 6 + 6)
        );

        for row in 3..=5 {
            map.open_cell(cell(row, 0)).unwrap();
        }
        assert_eq!(map.route(Algorithm::AStar, s, g).unwrap().cost(), Some(4));
        assert_eq!(
            map.open_cell(cell(2, 0)),
            Err(CampusError::NotBlocked(cell(2, 0)))
        );

        map.block_cell(cell(4, 0)).unwrap();
        map.block_cell(cell(3, 6)).unwrap();
        map.block_cell(cell(3, 13)).unwrap();
        map.block_cell(cell(3, 17)).unwrap();
        let result = map.route(Algorithm::UniformCost, s, g).unwrap();
        assert!(!result.is_found());
        // Rows 0 to 2 minus the blocked cells of row 1, plus (3,0).
        assert_eq!(result.stats.nodes_expanded, 20 + 12 + 20 + 1);

        assert_eq!(
            map.block_cell(cell(7, 19)),
            Err(CampusError::OccupiedByLandmark {
                cell: cell(7, 19),
                name: "University Mall".to_string()
            })
        );
    }

    #[test]
    fn route_view_marks_the_path() {
        let map = CampusMap::dlsu();
        let result = map.route(Algorithm::AStar, cell(8, 0), cell(8, 2)).unwrap();
        let path = result.path.unwrap();

        let text = RouteView {
            map: &map,
            path: Some(&path),
        }
        .to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 11);
        assert!(lines[9].starts_with("Row  8:  S  *  G  . "), "{}", lines[9]);
        assert!(lines[1].starts_with("Row  0:  .  ."));
        assert!(lines[4].starts_with("Row  3:  X  X"));

        let plain = RouteView {
            map: &map,
            path: None,
        }
        .to_string();
        assert!(plain.lines().nth(9).unwrap().starts_with("Row  8:  .  E  . "));
    }
}
