#![warn(clippy::all, missing_docs)]

//! Core model for the parking lot simulator.
//!
//! A [`ParkingLot`] owns an ordered list of [`Level`]s, each a fixed
//! layout of [`ParkingSpot`]s typed by vehicle [`Category`]. Requests are
//! served first-fit: levels in insertion order, then spots in index order.

pub mod config;
pub mod error;
pub mod level;
pub mod lot;
pub mod spot;
pub mod vehicle;

pub use crate::config::AppConfig;
pub use error::LotError;
pub use level::{Level, SpotMix, SpotReport};
pub use lot::{ParkingLot, ReleasePolicy, SpotLocation};
pub use spot::{ParkingSpot, SpotError};
pub use vehicle::{Category, Vehicle};
