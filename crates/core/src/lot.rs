//! Top-level coordinator over an ordered list of levels.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    error::LotError,
    level::{Level, SpotMix, SpotReport},
    vehicle::{Category, Vehicle},
};

/// How [`ParkingLot::unpark`] chooses the spot to free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleasePolicy {
    /// Free the first occupied spot of the vehicle's category, whoever is in it.
    #[default]
    Category,
    /// Free only the spot holding the vehicle's plate.
    Plate,
}

/// Position of a spot within the lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpotLocation {
    /// Floor number of the level.
    pub floor: i32,
    /// 1-based spot index within the level.
    pub index: usize,
}

impl fmt::Display for SpotLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "level {} spot {}", self.floor, self.index)
    }
}

/// The lot. Levels are tried in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct ParkingLot {
    levels: Vec<Level>,
    policy: ReleasePolicy,
}

impl ParkingLot {
    /// Create an empty lot.
    pub fn new(policy: ReleasePolicy) -> Self {
        Self {
            levels: Vec::new(),
            policy,
        }
    }

    /// Lay out every configured level with the configured mix.
    pub fn from_config(config: &AppConfig) -> Result<Self, LotError> {
        let mix = SpotMix::new(config.mix.motorcycle, config.mix.car)?;
        info!(
            motorcycle = mix.motorcycle(),
            car = mix.car(),
            "spot mix configured"
        );
        let mut lot = Self::new(config.release_policy);
        for level in &config.levels {
            lot.add_level(Level::with_mix(level.floor, level.spots, mix));
        }
        Ok(lot)
    }

    /// Active release policy.
    pub fn policy(&self) -> ReleasePolicy {
        self.policy
    }

    /// Append a level; it is tried after every existing one.
    pub fn add_level(&mut self, level: Level) {
        info!(floor = level.floor(), spots = level.len(), "level added");
        self.levels.push(level);
    }

    /// Levels in insertion order.
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// First level with the given floor number.
    pub fn level(&self, floor: i32) -> Option<&Level> {
        self.levels.iter().find(|level| level.floor() == floor)
    }

    /// Free spots of `category` across all levels.
    pub fn available(&self, category: Category) -> usize {
        self.levels.iter().map(|level| level.available(category)).sum()
    }

    /// Total number of spots across all levels.
    pub fn capacity(&self) -> usize {
        self.levels.iter().map(Level::len).sum()
    }

    /// Park `vehicle`; false when no level has a free spot of its category.
    pub fn park(&mut self, vehicle: &Vehicle) -> bool {
        self.allocate(vehicle).is_some()
    }

    /// Park in the lowest eligible spot of the first level that has one.
    pub fn allocate(&mut self, vehicle: &Vehicle) -> Option<SpotLocation> {
        let location = self.levels.iter_mut().find_map(|level| {
            level.park_indexed(vehicle).map(|index| SpotLocation {
                floor: level.floor(),
                index,
            })
        });
        match location {
            Some(location) => {
                info!(plate = vehicle.plate(), %location, "vehicle parked");
            }
            None => {
                warn!(
                    plate = vehicle.plate(),
                    category = %vehicle.category(),
                    "could not park vehicle"
                );
            }
        }
        location
    }

    /// Unpark per the release policy; false when nothing matched.
    pub fn unpark(&mut self, vehicle: &Vehicle) -> bool {
        self.release(vehicle).is_some()
    }

    /// Free a spot for `vehicle` according to the lot's [`ReleasePolicy`].
    pub fn release(&mut self, vehicle: &Vehicle) -> Option<SpotLocation> {
        let released = match self.policy {
            ReleasePolicy::Category => self.release_first(|level| level.unpark_indexed(vehicle)),
            ReleasePolicy::Plate => {
                self.release_first(|level| level.release_plate(vehicle.plate()))
            }
        };
        self.log_release(vehicle.plate(), released.as_ref());
        released.map(|(location, _)| location)
    }

    /// Free the spot holding `plate`, regardless of policy.
    pub fn release_plate(&mut self, plate: &str) -> Option<(SpotLocation, Vehicle)> {
        let released = self.release_first(|level| level.release_plate(plate));
        self.log_release(plate, released.as_ref());
        released
    }

    /// Where `plate` is parked, if anywhere.
    pub fn locate(&self, plate: &str) -> Option<SpotLocation> {
        self.levels.iter().find_map(|level| {
            level.locate(plate).map(|index| SpotLocation {
                floor: level.floor(),
                index,
            })
        })
    }

    /// Every level's report, in level order.
    pub fn report(&self) -> Vec<SpotReport> {
        self.levels.iter().flat_map(Level::report).collect()
    }

    /// Human-readable availability listing.
    pub fn render_report(&self) -> String {
        self.to_string()
    }

    /// Report as a pretty-printed JSON array.
    pub fn report_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.report())
    }

    fn release_first<F>(&mut self, mut release: F) -> Option<(SpotLocation, Vehicle)>
    where
        F: FnMut(&mut Level) -> Option<(usize, Vehicle)>,
    {
        self.levels.iter_mut().find_map(|level| {
            release(level).map(|(index, vehicle)| {
                let location = SpotLocation {
                    floor: level.floor(),
                    index,
                };
                (location, vehicle)
            })
        })
    }

    fn log_release(&self, requested: &str, released: Option<&(SpotLocation, Vehicle)>) {
        match released {
            Some((location, vehicle)) => info!(
                requested,
                released = vehicle.plate(),
                %location,
                "vehicle unparked"
            ),
            None => warn!(requested, "no parked vehicle to release"),
        }
    }
}

impl fmt::Display for ParkingLot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for level in &self.levels {
            writeln!(f, "Level {} Availability:", level.floor())?;
            for line in level.report() {
                writeln!(f, "{line}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_level_lot(policy: ReleasePolicy) -> ParkingLot {
        let mut lot = ParkingLot::new(policy);
        lot.add_level(Level::new(1, 10));
        lot.add_level(Level::new(2, 10));
        lot
    }

    #[test]
    fn fills_levels_in_order() {
        let mut lot = two_level_lot(ReleasePolicy::Category);
        assert_eq!(
            lot.allocate(&Vehicle::truck("T1")),
            Some(SpotLocation { floor: 1, index: 10 })
        );
        assert_eq!(
            lot.allocate(&Vehicle::truck("T2")),
            Some(SpotLocation { floor: 2, index: 10 })
        );
        assert_eq!(lot.allocate(&Vehicle::truck("T3")), None);
        assert_eq!(lot.available(Category::Truck), 0);
    }

    #[test]
    fn full_lot_mutates_nothing() {
        let mut lot = two_level_lot(ReleasePolicy::Category);
        lot.park(&Vehicle::truck("T1"));
        lot.park(&Vehicle::truck("T2"));
        let before = lot.report();
        assert!(!lot.park(&Vehicle::truck("T3")));
        assert_eq!(lot.report(), before);
    }

    #[test]
    fn empty_lot_rejects() {
        let mut lot = ParkingLot::default();
        assert!(!lot.park(&Vehicle::car("C1")));
        assert!(!lot.unpark(&Vehicle::car("C1")));
        assert!(lot.report().is_empty());
    }

    #[test]
    fn category_policy_frees_lowest_spot() {
        let mut lot = two_level_lot(ReleasePolicy::Category);
        lot.park(&Vehicle::car("C1"));
        lot.park(&Vehicle::car("C2"));
        assert_eq!(
            lot.release(&Vehicle::car("C2")),
            Some(SpotLocation { floor: 1, index: 6 })
        );
        assert_eq!(lot.locate("C1"), None);
        assert_eq!(lot.locate("C2"), Some(SpotLocation { floor: 1, index: 7 }));
    }

    #[test]
    fn plate_policy_frees_exact_vehicle() {
        let mut lot = two_level_lot(ReleasePolicy::Plate);
        lot.park(&Vehicle::car("C1"));
        lot.park(&Vehicle::car("C2"));
        assert_eq!(
            lot.release(&Vehicle::car("C2")),
            Some(SpotLocation { floor: 1, index: 7 })
        );
        assert_eq!(lot.locate("C1"), Some(SpotLocation { floor: 1, index: 6 }));
        assert!(!lot.unpark(&Vehicle::car("NOPE")));
    }

    #[test]
    fn release_plate_returns_vehicle() {
        let mut lot = two_level_lot(ReleasePolicy::Category);
        lot.park(&Vehicle::motorcycle("M1"));
        let (location, vehicle) = lot.release_plate("M1").unwrap();
        assert_eq!(location, SpotLocation { floor: 1, index: 1 });
        assert_eq!(vehicle, Vehicle::motorcycle("M1"));
        assert!(lot.release_plate("M1").is_none());
    }

    #[test]
    fn renders_reports() {
        let mut lot = two_level_lot(ReleasePolicy::Category);
        lot.park(&Vehicle::car("ABC123"));
        let text = lot.render_report();
        assert!(text.starts_with("Level 1 Availability:\nSpot 1: Available for: MOTORCYCLE\n"));
        assert!(text.contains("Spot 6: Occupied by: CAR (ABC123)"));
        assert!(text.contains("Level 2 Availability:"));
        assert_eq!(text.lines().count(), 22);
        assert_eq!(format!("{lot}"), text);
        assert_eq!(ParkingLot::default().render_report(), "");

        let json: serde_json::Value = serde_json::from_str(&lot.report_json().unwrap()).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(20));
        assert_eq!(json[5]["plate"], "ABC123");
        assert_eq!(json[5]["category"], "car");
        assert_eq!(json[10]["floor"], 2);
    }
}
