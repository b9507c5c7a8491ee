//! A small undirected road network between named places.
//!
//! Roads are weighted in meters. Place names are interned into `PlaceId`s so
//! searches move plain integers around.

use std::collections::BTreeMap;

use derive_more::Display;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::algorithms::SearchResult;
use crate::algorithms::solve;
use crate::space::Neighbours;
use crate::space::Path;
use crate::space::Space;
use crate::space::State;
use crate::space::ZeroHeuristic;

pub type Meters = u32;

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[display("#{_0}")]
pub struct PlaceId(u32);
impl State for PlaceId {}

/// Roads of the campus network, as `(from, to, meters)`.
///
/// `H`–`J1` is measured as 98m.
const DLSU_ROADS: &[(&str, &str, Meters)] = &[
    ("A", "B", 33),
    ("B", "C", 57),
    ("C", "D", 350),
    ("D", "E", 140),
    ("E", "F", 27),
    ("F", "G", 130),
    ("G", "H", 26),
    ("G", "I", 16),
    ("H", "J1", 98),
    ("H", "J2", 110),
    ("H", "L", 81),
    ("I", "J1", 8),
    ("J1", "K", 12),
    ("J2", "L", 45),
    ("K", "U", 47),
    ("L", "M", 250),
    ("L", "N", 190),
    ("M", "N", 57),
    ("N", "O", 210),
    ("O", "P", 250),
    ("P", "Q", 100),
    ("Q", "R", 24),
    ("R", "S", 80),
    ("S", "T", 300),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("Place '{0}' doesn't exist")]
    UnknownPlace(String),
    #[error("Place '{0}' already exists")]
    DuplicatePlace(String),
    #[error("There's no {cost}m road between '{from}' and '{to}'")]
    UnknownRoad {
        from: String,
        to: String,
        cost: Meters,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Place {
    name: String,
    /// In insertion order.
    roads: Vec<(PlaceId, Meters)>,
}

/// Places and the roads between them.
///
/// Removed places leave an empty slot behind so ids stay stable.
#[derive(Clone, Debug, Default)]
pub struct CampusGraph {
    places: Vec<Option<Place>>,
    ids: FxHashMap<String, PlaceId>,
}

impl CampusGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// The road network around the DLSU campus.
    pub fn dlsu() -> Self {
        let mut graph = Self::new();
        for &(from, to, cost) in DLSU_ROADS {
            let from = graph.ensure_place(from);
            let to = graph.ensure_place(to);
            graph.link(from, to, cost);
        }
        graph
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn id(&self, name: &str) -> Option<PlaceId> {
        self.ids.get(name).copied()
    }
    pub fn name(&self, id: PlaceId) -> Option<&str> {
        self.place(id).map(|p| p.name.as_str())
    }
    fn place(&self, id: PlaceId) -> Option<&Place> {
        self.places.get(id.0 as usize)?.as_ref()
    }
    fn place_mut(&mut self, id: PlaceId) -> Option<&mut Place> {
        self.places.get_mut(id.0 as usize)?.as_mut()
    }
    fn require(&self, name: &str) -> Result<PlaceId, GraphError> {
        self.id(name)
            .ok_or_else(|| GraphError::UnknownPlace(name.to_string()))
    }

    /// Place names, sorted.
    pub fn place_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.ids.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Roads leaving a place, in the order they were added.
    pub fn roads(&self, name: &str) -> Option<Vec<(&str, Meters)>> {
        let place = self.place(self.id(name)?)?;
        Some(
            place
                .roads
                .iter()
                .filter_map(|&(to, cost)| Some((self.name(to)?, cost)))
                .collect(),
        )
    }

    /// Name-keyed snapshot of every adjacency list.
    pub fn adjacency(&self) -> BTreeMap<String, Vec<(String, Meters)>> {
        self.places
            .iter()
            .flatten()
            .map(|place| {
                let roads = place
                    .roads
                    .iter()
                    .filter_map(|&(to, cost)| Some((self.name(to)?.to_string(), cost)))
                    .collect();
                (place.name.clone(), roads)
            })
            .collect()
    }

    pub fn add_place(&mut self, name: &str) -> Result<PlaceId, GraphError> {
        if self.ids.contains_key(name) {
            return Err(GraphError::DuplicatePlace(name.to_string()));
        }
        let id = self.ensure_place(name);
        log::debug!("Added place '{name}' as {id}");
        Ok(id)
    }

    /// Removes a place together with every road touching it.
    pub fn remove_place(&mut self, name: &str) -> Result<(), GraphError> {
        let id = self.require(name)?;
        self.ids.remove(name);
        self.places[id.0 as usize] = None;
        for place in self.places.iter_mut().flatten() {
            place.roads.retain(|&(to, _)| to != id);
        }
        log::debug!("Removed place '{name}' ({id})");
        Ok(())
    }

    /// Adds a road both ways.
    pub fn add_road(&mut self, from: &str, to: &str, cost: Meters) -> Result<(), GraphError> {
        let from_id = self.require(from)?;
        let to_id = self.require(to)?;
        self.link(from_id, to_id, cost);
        log::debug!("Added {cost}m road between '{from}' and '{to}'");
        Ok(())
    }

    /// Removes the most recently added road between two places with that cost.
    pub fn remove_road(&mut self, from: &str, to: &str, cost: Meters) -> Result<(), GraphError> {
        let from_id = self.require(from)?;
        let to_id = self.require(to)?;
        let unknown = || GraphError::UnknownRoad {
            from: from.to_string(),
            to: to.to_string(),
            cost,
        };

        let position = |at: PlaceId, other: PlaceId| {
            self.place(at)
                .and_then(|p| p.roads.iter().rposition(|&r| r == (other, cost)))
        };
        // Both ends are checked before touching either.
        let (Some(forward), Some(backward)) = (position(from_id, to_id), position(to_id, from_id))
        else {
            return Err(unknown());
        };
        if let Some(place) = self.place_mut(from_id) {
            place.roads.remove(forward);
        }
        if let Some(place) = self.place_mut(to_id) {
            place.roads.remove(backward);
        }

        log::debug!("Removed {cost}m road between '{from}' and '{to}'");
        Ok(())
    }

    /// Cheapest route between two places with Uniform Cost Search.
    pub fn route(&self, from: &str, to: &str) -> Result<SearchResult<PlaceId, Meters>, GraphError> {
        let start = self.require(from)?;
        let goal = self.require(to)?;
        Ok(solve::<ZeroHeuristic, _, _, _>(self, start, goal))
    }

    /// Names along a path.
    pub fn names(&self, path: &Path<PlaceId, Meters>) -> Vec<&str> {
        path.iter().filter_map(|&id| self.name(id)).collect()
    }

    fn ensure_place(&mut self, name: &str) -> PlaceId {
        if let Some(id) = self.id(name) {
            return id;
        }
        let id = PlaceId(self.places.len() as u32);
        self.places.push(Some(Place {
            name: name.to_string(),
            roads: vec![],
        }));
        self.ids.insert(name.to_string(), id);
        id
    }

    fn link(&mut self, from: PlaceId, to: PlaceId, cost: Meters) {
        if let Some(place) = self.place_mut(from) {
            place.roads.push((to, cost));
        }
        if let Some(place) = self.place_mut(to) {
            place.roads.push((from, cost));
        }
    }
}

impl Space<PlaceId, Meters> for CampusGraph {
    fn neighbours(&self, s: &PlaceId) -> Neighbours<PlaceId, Meters> {
        match self.place(*s) {
            Some(place) => place.roads.iter().copied().collect(),
            None => Neighbours::new(),
        }
    }

    fn valid(&self, s: &PlaceId) -> bool {
        self.place(*s).is_some()
    }

    fn size(&self) -> Option<usize> {
        Some(self.len())
    }
}
