//! Scripted walkthrough: park one vehicle of each kind, report, unpark, report.

use anyhow::{Context, Result};
use parklot_core::{config::ReportFormat, ParkingLot, Vehicle};

pub fn run(lot: &mut ParkingLot, format: ReportFormat) -> Result<()> {
    let car = Vehicle::car("ABC123");
    let truck = Vehicle::truck("XYZ789");
    let motorcycle = Vehicle::motorcycle("M1234");

    lot.park(&car);
    lot.park(&truck);
    lot.park(&motorcycle);
    print!("{}", render(lot, format)?);

    lot.unpark(&motorcycle);
    print!("{}", render(lot, format)?);

    Ok(())
}

pub fn render(lot: &ParkingLot, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(lot.render_report()),
        ReportFormat::Json => lot
            .report_json()
            .map(|mut json| {
                json.push('\n');
                json
            })
            .context("failed to serialize availability report"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parklot_core::{AppConfig, Category, SpotLocation};

    #[test]
    fn demo_leaves_car_and_truck_parked() -> Result<()> {
        let mut lot = ParkingLot::from_config(&AppConfig::default())?;
        run(&mut lot, ReportFormat::Text)?;

        assert_eq!(lot.locate("ABC123"), Some(SpotLocation { floor: 1, index: 51 }));
        assert_eq!(lot.locate("XYZ789"), Some(SpotLocation { floor: 1, index: 91 }));
        assert_eq!(lot.locate("M1234"), None);
        assert_eq!(lot.available(Category::Motorcycle), 90);
        Ok(())
    }

    #[test]
    fn json_report_is_an_array() -> Result<()> {
        let mut lot = ParkingLot::from_config(&AppConfig::default())?;
        lot.park(&Vehicle::car("ABC123"));
        let rendered = render(&lot, ReportFormat::Json)?;
        let value: serde_json::Value = serde_json::from_str(&rendered)?;
        assert_eq!(value.as_array().map(Vec::len), Some(180));
        Ok(())
    }
}
