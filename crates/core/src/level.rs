//! A single floor of spots, laid out by category at construction.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error};

use crate::{
    error::LotError,
    spot::ParkingSpot,
    vehicle::{Category, Vehicle},
};

/// Default share of spots reserved for motorcycles.
pub const DEFAULT_MOTORCYCLE_SHARE: f64 = 0.50;
/// Default share of spots reserved for cars.
pub const DEFAULT_CAR_SHARE: f64 = 0.40;

/// Fractions of a level given to motorcycles and cars; trucks get the rest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotMix {
    motorcycle: f64,
    car: f64,
}

impl Default for SpotMix {
    fn default() -> Self {
        Self {
            motorcycle: DEFAULT_MOTORCYCLE_SHARE,
            car: DEFAULT_CAR_SHARE,
        }
    }
}

impl SpotMix {
    /// Validate and build a mix.
    pub fn new(motorcycle: f64, car: f64) -> Result<Self, LotError> {
        let in_range = |value: f64| value.is_finite() && (0.0..=1.0).contains(&value);
        if !in_range(motorcycle) || !in_range(car) || motorcycle + car > 1.0 {
            return Err(LotError::InvalidMix { motorcycle, car });
        }
        Ok(Self { motorcycle, car })
    }

    /// Motorcycle fraction.
    pub fn motorcycle(&self) -> f64 {
        self.motorcycle
    }

    /// Car fraction.
    pub fn car(&self) -> f64 {
        self.car
    }

    /// Split `total` into `(motorcycle, car, truck)` counts by truncation.
    pub fn split(&self, total: usize) -> (usize, usize, usize) {
        let motorcycle = ((total as f64 * self.motorcycle) as usize).min(total);
        let car = ((total as f64 * self.car) as usize).min(total - motorcycle);
        (motorcycle, car, total - motorcycle - car)
    }
}

/// Read-only view of one spot, used for availability displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpotReport {
    /// Floor of the owning level.
    pub floor: i32,
    /// 1-based spot index.
    pub index: usize,
    /// Category the spot accepts.
    pub category: Category,
    /// Whether a vehicle is parked here.
    pub occupied: bool,
    /// Occupant plate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate: Option<String>,
    /// When the occupant was parked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<DateTime<Utc>>,
}

impl fmt::Display for SpotReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.plate.as_deref() {
            Some(plate) => write!(
                f,
                "Spot {}: Occupied by: {} ({plate})",
                self.index, self.category
            ),
            None => write!(f, "Spot {}: Available for: {}", self.index, self.category),
        }
    }
}

/// A floor of the lot.
///
/// Spots are numbered from 1 in three contiguous blocks: motorcycles, then
/// cars, then trucks. Layout never changes after construction; only
/// occupancy does.
#[derive(Debug, Clone)]
pub struct Level {
    floor: i32,
    spots: Vec<ParkingSpot>,
}

impl Level {
    /// Build a level with the default 50/40/10 mix.
    pub fn new(floor: i32, total: usize) -> Self {
        Self::with_mix(floor, total, SpotMix::default())
    }

    /// Build a level with a custom mix.
    pub fn with_mix(floor: i32, total: usize, mix: SpotMix) -> Self {
        let (motorcycles, cars, trucks) = mix.split(total);
        let categories = std::iter::repeat(Category::Motorcycle)
            .take(motorcycles)
            .chain(std::iter::repeat(Category::Car).take(cars))
            .chain(std::iter::repeat(Category::Truck).take(trucks));
        let spots = categories
            .enumerate()
            .map(|(offset, category)| ParkingSpot::new(offset + 1, category))
            .collect();
        debug!(floor, motorcycles, cars, trucks, "level laid out");
        Self { floor, spots }
    }

    /// Floor number.
    pub fn floor(&self) -> i32 {
        self.floor
    }

    /// Spots in index order.
    pub fn spots(&self) -> &[ParkingSpot] {
        &self.spots
    }

    /// Spot by its 1-based index.
    pub fn spot(&self, index: usize) -> Option<&ParkingSpot> {
        index
            .checked_sub(1)
            .and_then(|position| self.spots.get(position))
    }

    /// Number of spots.
    pub fn len(&self) -> usize {
        self.spots.len()
    }

    /// True for a level built with zero spots.
    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    /// Number of spots of `category`, free or not.
    pub fn capacity(&self, category: Category) -> usize {
        self.spots
            .iter()
            .filter(|spot| spot.category() == category)
            .count()
    }

    /// Number of free spots of `category`.
    pub fn available(&self, category: Category) -> usize {
        self.spots
            .iter()
            .filter(|spot| spot.category() == category && spot.is_available())
            .count()
    }

    /// Park in the first free spot of the vehicle's category.
    pub fn park(&mut self, vehicle: &Vehicle) -> bool {
        self.park_indexed(vehicle).is_some()
    }

    /// Like [`Level::park`], returning the index of the claimed spot.
    pub fn park_indexed(&mut self, vehicle: &Vehicle) -> Option<usize> {
        let floor = self.floor;
        for spot in self.spots.iter_mut().filter(|spot| spot.accepts(vehicle)) {
            match spot.assign(vehicle) {
                Ok(()) => return Some(spot.index()),
                Err(err) => error!(floor, %err, "eligible spot refused vehicle"),
            }
        }
        None
    }

    /// Release the first occupied spot of the vehicle's category.
    ///
    /// Matches on category alone, so the released occupant may be a
    /// different vehicle of the same kind. See [`Level::unpark_plate`].
    pub fn unpark(&mut self, vehicle: &Vehicle) -> bool {
        self.unpark_indexed(vehicle).is_some()
    }

    /// Like [`Level::unpark`], returning the spot index and released vehicle.
    pub fn unpark_indexed(&mut self, vehicle: &Vehicle) -> Option<(usize, Vehicle)> {
        let category = vehicle.category();
        self.release_where(|spot| !spot.is_available() && spot.category() == category)
    }

    /// Release the spot holding `plate`.
    pub fn unpark_plate(&mut self, plate: &str) -> bool {
        self.release_plate(plate).is_some()
    }

    /// Like [`Level::unpark_plate`], returning the spot index and released vehicle.
    pub fn release_plate(&mut self, plate: &str) -> Option<(usize, Vehicle)> {
        self.release_where(|spot| spot.holds(plate))
    }

    /// Index of the spot holding `plate`.
    pub fn locate(&self, plate: &str) -> Option<usize> {
        self.spots
            .iter()
            .find(|spot| spot.holds(plate))
            .map(ParkingSpot::index)
    }

    /// Snapshot of every spot in index order.
    pub fn report(&self) -> Vec<SpotReport> {
        self.spots
            .iter()
            .map(|spot| SpotReport {
                floor: self.floor,
                index: spot.index(),
                category: spot.category(),
                occupied: !spot.is_available(),
                plate: spot.occupant().map(|vehicle| vehicle.plate().to_string()),
                since: spot.occupied_since(),
            })
            .collect()
    }

    fn release_where<F>(&mut self, predicate: F) -> Option<(usize, Vehicle)>
    where
        F: Fn(&ParkingSpot) -> bool,
    {
        let spot = self.spots.iter_mut().find(|spot| predicate(spot))?;
        let vehicle = spot.release()?;
        Some((spot.index(), vehicle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories(level: &Level) -> Vec<Category> {
        level.spots().iter().map(ParkingSpot::category).collect()
    }

    #[test]
    fn partitions_ten_spots() {
        let level = Level::new(1, 10);
        assert_eq!(level.len(), 10);
        let cats = categories(&level);
        assert!(cats[..5].iter().all(|c| *c == Category::Motorcycle));
        assert!(cats[5..9].iter().all(|c| *c == Category::Car));
        assert_eq!(cats[9], Category::Truck);
        let indices: Vec<usize> = level.spots().iter().map(ParkingSpot::index).collect();
        assert_eq!(indices, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn partition_counts_truncate() {
        for total in 0..=137 {
            let level = Level::new(1, total);
            let motorcycles = (total as f64 * 0.5) as usize;
            let cars = (total as f64 * 0.4) as usize;
            assert_eq!(level.len(), total);
            assert_eq!(level.capacity(Category::Motorcycle), motorcycles, "total {total}");
            assert_eq!(level.capacity(Category::Car), cars, "total {total}");
            assert_eq!(
                level.capacity(Category::Truck),
                total - motorcycles - cars,
                "total {total}"
            );
        }
    }

    #[test]
    fn small_levels() {
        assert!(Level::new(1, 0).is_empty());
        assert_eq!(categories(&Level::new(1, 1)), vec![Category::Truck]);
        assert_eq!(
            categories(&Level::new(1, 3)),
            vec![Category::Motorcycle, Category::Car, Category::Truck]
        );
    }

    #[test]
    fn custom_mix() {
        let mix = SpotMix::new(0.0, 1.0).unwrap();
        assert_eq!(mix.motorcycle(), 0.0);
        assert_eq!(mix.car(), 1.0);
        let level = Level::with_mix(2, 4, mix);
        assert_eq!(level.capacity(Category::Car), 4);
        assert_eq!(level.capacity(Category::Truck), 0);
    }

    #[test]
    fn rejects_bad_mix() {
        assert!(SpotMix::new(0.7, 0.4).is_err());
        assert!(SpotMix::new(-0.1, 0.4).is_err());
        assert!(SpotMix::new(f64::NAN, 0.4).is_err());
        assert!(SpotMix::new(0.5, 0.5).is_ok());
    }

    #[test]
    fn first_fit_parking() {
        let mut level = Level::new(1, 10);
        assert_eq!(level.park_indexed(&Vehicle::car("C1")), Some(6));
        assert_eq!(level.park_indexed(&Vehicle::car("C2")), Some(7));
        assert_eq!(level.park_indexed(&Vehicle::truck("T1")), Some(10));
        assert!(!level.park(&Vehicle::truck("T2")));
        assert_eq!(level.available(Category::Car), 2);
    }

    #[test]
    fn unpark_frees_lowest_of_category() {
        let mut level = Level::new(1, 10);
        level.park(&Vehicle::car("C1"));
        level.park(&Vehicle::car("C2"));

        let (index, released) = level.unpark_indexed(&Vehicle::car("C2")).unwrap();
        assert_eq!(index, 6);
        assert_eq!(released.plate(), "C1");
        assert!(level.spot(6).unwrap().is_available());
        assert!(level.spot(7).unwrap().holds("C2"));
    }

    #[test]
    fn unpark_by_plate() {
        let mut level = Level::new(1, 10);
        level.park(&Vehicle::car("C1"));
        level.park(&Vehicle::car("C2"));

        assert_eq!(level.locate("C2"), Some(7));
        assert!(level.unpark_plate("C2"));
        assert!(level.spot(6).unwrap().holds("C1"));
        assert!(!level.unpark_plate("C2"));
    }

    #[test]
    fn unpark_without_match() {
        let mut level = Level::new(1, 10);
        level.park(&Vehicle::car("C1"));
        assert!(!level.unpark(&Vehicle::motorcycle("M1")));
        assert_eq!(level.available(Category::Car), 3);
    }

    #[test]
    fn report_lines() {
        let mut level = Level::new(3, 10);
        level.park(&Vehicle::car("ABC123"));
        let report = level.report();
        assert_eq!(report.len(), 10);
        assert_eq!(report[0].to_string(), "Spot 1: Available for: MOTORCYCLE");
        assert_eq!(report[5].to_string(), "Spot 6: Occupied by: CAR (ABC123)");
        assert!(report[5].occupied);
        assert_eq!(report[5].floor, 3);
        assert_eq!(report[5].plate.as_deref(), Some("ABC123"));
    }
}
