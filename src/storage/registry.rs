//! Plate registry — every plate of a run, by name, plus the cross-plate
//! search and find-or-allocate placement used by the resolver.

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::model::*;
use crate::{Error, Result};
use super::Plate;

/// Plates keyed by name, in insertion order. Insertion order makes "first
/// match" across plates deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlateRegistry {
    plates: IndexMap<String, Plate>,
}

/// Where a component ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub well: Well,
    pub plate: String,
}

impl PlateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plate, replacing any plate of the same name.
    pub fn insert(&mut self, plate: Plate) -> Option<Plate> {
        self.plates.insert(plate.name().to_owned(), plate)
    }

    pub fn get(&self, name: &str) -> Option<&Plate> {
        self.plates.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Plate> {
        self.plates.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plates.contains_key(name)
    }

    /// Fetch a plate, creating an empty default plate if none exists.
    pub fn get_or_create(&mut self, name: &str) -> &mut Plate {
        self.plates.entry(name.to_owned()).or_insert_with(|| {
            info!(plate = name, "created plate");
            Plate::new(name)
        })
    }

    pub fn len(&self) -> usize {
        self.plates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plates.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plates.keys().map(String::as_str)
    }

    pub fn plates(&self) -> impl Iterator<Item = &Plate> {
        self.plates.values()
    }

    /// First well on any plate whose attributes match `component`.
    pub fn first_match(&self, component: &Component) -> Option<Placement> {
        self.plates.values().find_map(|plate| {
            plate.find(component).first().map(|well| Placement {
                well: *well,
                plate: plate.name().to_owned(),
            })
        })
    }

    /// Like [`first_match`](Self::first_match), but a miss is an error.
    pub fn require(&self, component: &Component) -> Result<Placement> {
        self.first_match(component).ok_or_else(|| Error::NoMatchFound {
            criteria: describe(component),
        })
    }
}

impl FromIterator<Plate> for PlateRegistry {
    fn from_iter<I: IntoIterator<Item = Plate>>(iter: I) -> Self {
        let mut registry = PlateRegistry::new();
        for plate in iter {
            registry.insert(plate);
        }
        registry
    }
}

// ============================================================================
// Search and placement
// ============================================================================

/// Matching wells per plate; plates without a match are left out.
pub fn find_across(plates: &PlateRegistry, component: &Component) -> IndexMap<String, Vec<Well>> {
    plates
        .plates()
        .filter_map(|plate| {
            let wells = plate.find(component);
            (!wells.is_empty()).then(|| (plate.name().to_owned(), wells))
        })
        .collect()
}

/// Find-or-allocate a well for `component`.
///
/// 1. Any existing well on any plate that already matches wins.
/// 2. Otherwise the plate `preferred_plate` is fetched or created.
/// 3. A reagent with a `well_name` is pinned there.
/// 4. A reagent without one gets a fresh line, then the search runs again
///    and returns a single well from that line.
/// 5. Anything else is added at `well_name` or the next free well.
pub fn place(
    component: &Component,
    preferred_plate: &str,
    is_reagent: bool,
    plates: &mut PlateRegistry,
    well_name: Option<&str>,
) -> Result<Placement> {
    // A freshly written line always matches, so one retry is enough.
    for attempt in 0..2 {
        if let Some(found) = plates.first_match(component) {
            if attempt == 0 {
                debug!(component = %describe(component), plate = %found.plate, well = %found.well, "reused well");
            }
            return Ok(found);
        }
        if attempt > 0 {
            break;
        }

        let plate = plates.get_or_create(preferred_plate);
        match (is_reagent, well_name) {
            (true, None) => {
                plate.add_line(component)?;
            }
            (_, well_name) => {
                let well = plate.add(component, well_name)?;
                return Ok(Placement {
                    well,
                    plate: preferred_plate.to_owned(),
                });
            }
        }
    }

    Err(Error::NoMatchFound {
        criteria: describe(component),
    })
}
