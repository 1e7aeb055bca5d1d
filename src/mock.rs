//! Placeholder weather shown before the first live report arrives, and kept
//! on screen when the forecast provider cannot be reached.

use crate::models::{CurrentWeather, DailyForecastEntry, IconKey, WeatherReport};
use chrono::{Duration, NaiveDate};

const CONDITIONS: [(IconKey, &str); 5] = [
    (IconKey::Clear, "Clear Sky"),
    (IconKey::PartlyCloudy, "Partly Cloudy"),
    (IconKey::Cloudy, "Cloudy"),
    (IconKey::Rainy, "Rainy"),
    (IconKey::Thunderstorm, "Thunderstorm"),
];

pub fn placeholder_current() -> CurrentWeather {
    CurrentWeather {
        temperature: 22,
        condition_label: "Partly Cloudy".to_string(),
        icon: IconKey::PartlyCloudy,
        sunrise: "06:32".to_string(),
        sunset: "18:48".to_string(),
        location_label: "Home Town".to_string(),
    }
}

/// Seven days starting at `today`, sunrise creeping later and sunset earlier
/// by a minute a day.
pub fn placeholder_forecast(today: NaiveDate) -> Vec<DailyForecastEntry> {
    (0..7u32)
        .map(|i| {
            let date = today + Duration::days(i64::from(i));
            let (icon, label) = CONDITIONS[(i as usize * 2) % CONDITIONS.len()];
            let sunrise = 392 + i;
            let sunset = 1128 - i;
            DailyForecastEntry {
                date_label: date.format("%b %-d").to_string(),
                day_name: date.format("%a").to_string(),
                high: 21 + (i % 4) as i32,
                low: 11 + (i % 3) as i32,
                condition_label: label.to_string(),
                icon,
                sunrise: format!("{:02}:{:02}", sunrise / 60, sunrise % 60),
                sunset: format!("{:02}:{:02}", sunset / 60, sunset % 60),
            }
        })
        .collect()
}

pub fn placeholder_report(today: NaiveDate) -> WeatherReport {
    WeatherReport {
        current: placeholder_current(),
        forecast: placeholder_forecast(today),
    }
}
