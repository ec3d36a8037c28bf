//! Vehicle identity records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of vehicle a spot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Passenger car.
    Car,
    /// Truck or other oversized vehicle.
    Truck,
    /// Motorcycle or scooter.
    Motorcycle,
}

impl Category {
    /// All categories in the order a level lays out its spot blocks.
    pub const ALL: [Category; 3] = [Category::Motorcycle, Category::Car, Category::Truck];

    /// Short lowercase label, matching the serialised form.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Car => "car",
            Category::Truck => "truck",
            Category::Motorcycle => "motorcycle",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Car => "CAR",
            Category::Truck => "TRUCK",
            Category::Motorcycle => "MOTORCYCLE",
        };
        f.write_str(label)
    }
}

/// A vehicle presented at the lot. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    plate: String,
    category: Category,
}

impl Vehicle {
    /// Build a vehicle with an explicit category.
    pub fn new(plate: impl Into<String>, category: Category) -> Self {
        Self {
            plate: plate.into(),
            category,
        }
    }

    /// Shorthand for a [`Category::Car`] vehicle.
    pub fn car(plate: impl Into<String>) -> Self {
        Self::new(plate, Category::Car)
    }

    /// Shorthand for a [`Category::Truck`] vehicle.
    pub fn truck(plate: impl Into<String>) -> Self {
        Self::new(plate, Category::Truck)
    }

    /// Shorthand for a [`Category::Motorcycle`] vehicle.
    pub fn motorcycle(plate: impl Into<String>) -> Self {
        Self::new(plate, Category::Motorcycle)
    }

    /// License plate; the vehicle's identity for plate-based release.
    pub fn plate(&self) -> &str {
        &self.plate
    }

    /// Category used for spot matching.
    pub fn category(&self) -> Category {
        self.category
    }
}
