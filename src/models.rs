use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Approximate device position in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPosition {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Finite and inside the latitude/longitude ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// The weather symbols the display knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconKey {
    Clear,
    PartlyCloudy,
    Cloudy,
    Rainy,
    Thunderstorm,
}

impl IconKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            IconKey::Clear => "clear",
            IconKey::PartlyCloudy => "partly-cloudy",
            IconKey::Cloudy => "cloudy",
            IconKey::Rainy => "rainy",
            IconKey::Thunderstorm => "thunderstorm",
        }
    }

    /// Single-cell glyph for compact layouts.
    pub fn glyph(&self) -> &'static str {
        match self {
            IconKey::Clear => "☀",
            IconKey::PartlyCloudy => "⛅",
            IconKey::Cloudy => "☁",
            IconKey::Rainy => "☂",
            IconKey::Thunderstorm => "⚡",
        }
    }

    /// Three-line ASCII rendering used on the weather cards.
    pub fn art(&self) -> [&'static str; 3] {
        match self {
            IconKey::Clear => ["  \\ | /  ", " -- O -- ", "  / | \\  "],
            IconKey::PartlyCloudy => ["  \\ _    ", " -( __)  ", " (___._) "],
            IconKey::Cloudy => ["   .--.  ", " .(    ). ", "(___.__)_)"],
            IconKey::Rainy => ["   .--.  ", " (___.__)", "  ' ' ' '"],
            IconKey::Thunderstorm => ["   .--.  ", " (___.__)", "   /_/   "],
        }
    }
}

impl std::fmt::Display for IconKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display vocabulary for one provider weather code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherCondition {
    pub icon: IconKey,
    pub label: &'static str,
}

const UNKNOWN_CONDITION: WeatherCondition = WeatherCondition {
    icon: IconKey::PartlyCloudy,
    label: "Unknown",
};

// Inclusive upper bounds over WMO codes, scanned in order. Snow folds onto
// the rain icon; only the label tells them apart.
const CODE_TABLE: [(i64, IconKey, &str); 8] = [
    (0, IconKey::Clear, "Clear Sky"),
    (3, IconKey::PartlyCloudy, "Partly Cloudy"),
    (48, IconKey::Cloudy, "Cloudy"),
    (67, IconKey::Rainy, "Rainy"),
    (77, IconKey::Rainy, "Snow"),
    (82, IconKey::Rainy, "Rain Showers"),
    (86, IconKey::Rainy, "Snow Showers"),
    (99, IconKey::Thunderstorm, "Thunderstorm"),
];

/// Maps a WMO weather interpretation code to an icon and label.
///
/// Total over `i64`: negative and out-of-range codes come back as
/// partly-cloudy / "Unknown".
pub fn map_weather_code(code: i64) -> WeatherCondition {
    if code < 0 {
        return UNKNOWN_CONDITION;
    }
    CODE_TABLE
        .iter()
        .find(|(upper, _, _)| code <= *upper)
        .map(|&(_, icon, label)| WeatherCondition { icon, label })
        .unwrap_or(UNKNOWN_CONDITION)
}

/// Codes arrive as JSON numbers; rounding up keeps the inclusive bounds
/// intact for fractional values. Anything negative or non-finite becomes
/// the unknown sentinel `-1`.
pub fn code_from_provider(value: f64) -> i64 {
    if value.is_finite() && value >= 0.0 {
        value.ceil() as i64
    } else {
        -1
    }
}

/// Formats an ISO 8601 timestamp as zero-padded 24h "HH:MM" on the
/// timestamp's own wall clock. No timezone conversion is applied.
pub fn format_clock_time(iso: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(iso) {
        return dt.format("%H:%M").to_string();
    }
    // RFC 3339 insists on seconds; ISO 8601 allows an offset without them.
    if let Ok(dt) = DateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M%#z") {
        return dt.format("%H:%M").to_string();
    }
    iso.parse::<NaiveDateTime>()
        .or_else(|_| NaiveDateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M"))
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_else(|_| "--:--".to_string())
}

/// Splits a provider calendar date into ("Jun 1", "Sat").
pub fn date_labels(date: &str) -> (String, String) {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => (d.format("%b %-d").to_string(), d.format("%a").to_string()),
        Err(_) => (date.to_string(), String::new()),
    }
}

/// Rounds half up, so -2.5 becomes -2 and 2.5 becomes 3.
pub fn round_temperature(celsius: f64) -> i32 {
    (celsius + 0.5).floor() as i32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub temperature: i32,
    pub condition_label: String,
    pub icon: IconKey,
    pub sunrise: String,
    pub sunset: String,
    pub location_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastEntry {
    pub date_label: String,
    pub day_name: String,
    pub high: i32,
    pub low: i32,
    pub condition_label: String,
    pub icon: IconKey,
    pub sunrise: String,
    pub sunset: String,
}

/// One complete result of the weather pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub current: CurrentWeather,
    pub forecast: Vec<DailyForecastEntry>,
}

// Open-Meteo forecast payload, only the fields we read.
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub current_weather: CurrentWeatherBlock,
    pub daily: DailyBlock,
}

#[derive(Debug, Deserialize)]
pub struct CurrentWeatherBlock {
    pub temperature: f64,
    pub weathercode: f64,
    #[serde(default)]
    pub windspeed: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct DailyBlock {
    pub time: Vec<String>,
    pub temperature_2m_max: Vec<f64>,
    pub temperature_2m_min: Vec<f64>,
    pub weathercode: Vec<f64>,
    pub sunrise: Vec<String>,
    pub sunset: Vec<String>,
}

// Nominatim reverse lookup payload.
#[derive(Debug, Default, Deserialize)]
pub struct ReverseGeocodeResponse {
    pub address: Option<GeocodeAddress>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GeocodeAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub municipality: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
}
