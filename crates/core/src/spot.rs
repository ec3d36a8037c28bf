//! Single allocatable parking spot.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::vehicle::{Category, Vehicle};

/// Raised when a vehicle is assigned to a spot that cannot take it.
///
/// Levels only assign after checking eligibility, so seeing one of these
/// means the caller skipped that check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpotError {
    /// The spot already holds a vehicle.
    #[error("spot {index} is already occupied by {plate}")]
    Occupied {
        /// Index of the spot within its level.
        index: usize,
        /// Plate of the current occupant.
        plate: String,
    },
    /// The vehicle category differs from the spot category.
    #[error("spot {index} accepts {spot}, not {vehicle}")]
    CategoryMismatch {
        /// Index of the spot within its level.
        index: usize,
        /// Category the spot was built for.
        spot: Category,
        /// Category of the rejected vehicle.
        vehicle: Category,
    },
}

#[derive(Debug, Clone)]
struct Occupancy {
    vehicle: Vehicle,
    since: DateTime<Utc>,
}

/// A spot holding at most one vehicle of its own category.
#[derive(Debug, Clone)]
pub struct ParkingSpot {
    index: usize,
    category: Category,
    occupant: Option<Occupancy>,
}

impl ParkingSpot {
    /// Create an empty spot. `index` is 1-based within the level.
    pub fn new(index: usize, category: Category) -> Self {
        Self {
            index,
            category,
            occupant: None,
        }
    }

    /// 1-based index within the level.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Category this spot accepts.
    pub fn category(&self) -> Category {
        self.category
    }

    /// True when nothing is parked here.
    pub fn is_available(&self) -> bool {
        self.occupant.is_none()
    }

    /// Whether `vehicle` could be assigned here right now.
    pub fn accepts(&self, vehicle: &Vehicle) -> bool {
        self.is_available() && vehicle.category() == self.category
    }

    /// Current occupant, if any.
    pub fn occupant(&self) -> Option<&Vehicle> {
        self.occupant.as_ref().map(|occupancy| &occupancy.vehicle)
    }

    /// Time the current occupant was assigned.
    pub fn occupied_since(&self) -> Option<DateTime<Utc>> {
        self.occupant.as_ref().map(|occupancy| occupancy.since)
    }

    /// True when the occupant carries `plate`.
    pub fn holds(&self, plate: &str) -> bool {
        self.occupant()
            .map(|vehicle| vehicle.plate() == plate)
            .unwrap_or(false)
    }

    /// Place `vehicle` in the spot.
    ///
    /// Fails when the spot is taken or built for another category; the spot
    /// is left untouched in both cases.
    pub fn assign(&mut self, vehicle: &Vehicle) -> Result<(), SpotError> {
        if let Some(current) = self.occupant() {
            return Err(SpotError::Occupied {
                index: self.index,
                plate: current.plate().to_string(),
            });
        }
        if vehicle.category() != self.category {
            return Err(SpotError::CategoryMismatch {
                index: self.index,
                spot: self.category,
                vehicle: vehicle.category(),
            });
        }
        self.occupant = Some(Occupancy {
            vehicle: vehicle.clone(),
            since: Utc::now(),
        });
        Ok(())
    }

    /// Empty the spot, returning whoever was in it. No-op when already empty.
    pub fn release(&mut self) -> Option<Vehicle> {
        self.occupant.take().map(|occupancy| occupancy.vehicle)
    }
}
