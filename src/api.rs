use crate::config::ApiConfig;
use crate::error::FetchError;
use crate::models::{
    code_from_provider, date_labels, format_clock_time, map_weather_code, round_temperature,
    CurrentWeather, DailyForecastEntry, ForecastResponse, GeoPosition, ReverseGeocodeResponse,
    WeatherReport,
};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const FORECAST_DAYS: usize = 7;
pub const FALLBACK_LOCATION_LABEL: &str = "Current Location";

const DAILY_FIELDS: &str = "temperature_2m_max,temperature_2m_min,weathercode,sunrise,sunset";

/// Client for the forecast and reverse-geocoding providers.
pub struct WeatherProvider {
    client: Client,
    forecast_url: String,
    geocode_url: String,
}

impl WeatherProvider {
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            forecast_url: config.forecast_url.clone(),
            geocode_url: config.geocode_url.clone(),
        })
    }

    /// Runs the whole pipeline for one position: forecast first, then the
    /// best-effort place name. No retries. The geocoder is only asked once
    /// the forecast has normalized cleanly.
    pub async fn fetch_weather(&self, pos: GeoPosition) -> Result<WeatherReport, FetchError> {
        let forecast = self.fetch_forecast(pos).await?;
        let mut report = normalize(forecast, String::new())?;
        report.current.location_label = self.location_label(pos).await;

        info!(
            "Weather updated for {} - {}°C, {} forecast days",
            report.current.location_label,
            report.current.temperature,
            report.forecast.len()
        );
        Ok(report)
    }

    pub async fn fetch_forecast(&self, pos: GeoPosition) -> Result<ForecastResponse, FetchError> {
        let days = FORECAST_DAYS.to_string();
        let query = [
            ("latitude", pos.latitude.to_string()),
            ("longitude", pos.longitude.to_string()),
            ("current_weather", "true".to_string()),
            ("daily", DAILY_FIELDS.to_string()),
            ("temperature_unit", "celsius".to_string()),
            ("timezone", "auto".to_string()),
            ("forecast_days", days),
        ];

        let res = self
            .client
            .get(&self.forecast_url)
            .query(&query)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            warn!("Forecast provider returned {}", status);
            return Err(FetchError::Status(status));
        }

        let body = res.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Reverse geocodes `pos` into "City, CC".
    pub async fn reverse_geocode(&self, pos: GeoPosition) -> Result<String, FetchError> {
        let res = self
            .client
            .get(&self.geocode_url)
            .query(&[
                ("lat", pos.latitude.to_string()),
                ("lon", pos.longitude.to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = res.bytes().await?;
        let parsed: ReverseGeocodeResponse = serde_json::from_slice(&body)?;
        debug!("Geocoding response address: {:?}", parsed.address);
        Ok(place_label(&parsed))
    }

    /// Place name for display. Any geocoding failure becomes
    /// [`FALLBACK_LOCATION_LABEL`].
    pub async fn location_label(&self, pos: GeoPosition) -> String {
        match self.reverse_geocode(pos).await {
            Ok(label) => label,
            Err(e) => {
                warn!("Failed to get location name: {}", e);
                FALLBACK_LOCATION_LABEL.to_string()
            }
        }
    }
}

/// Picks the most specific locality and tags it with the country code.
pub fn place_label(response: &ReverseGeocodeResponse) -> String {
    let Some(addr) = &response.address else {
        return FALLBACK_LOCATION_LABEL.to_string();
    };

    let present = |field: &Option<String>| -> Option<String> {
        field
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let locality = [
        &addr.city,
        &addr.town,
        &addr.village,
        &addr.municipality,
        &addr.county,
        &addr.state,
        &addr.region,
    ]
    .into_iter()
    .find_map(present);

    match (locality, present(&addr.country_code)) {
        (Some(place), Some(code)) => format!("{}, {}", place, code.to_uppercase()),
        (Some(place), None) => place,
        (None, _) => present(&addr.country).unwrap_or_else(|| FALLBACK_LOCATION_LABEL.to_string()),
    }
}

/// Turns a raw forecast payload into the display model.
///
/// The current block takes its sunrise and sunset from the first daily
/// entry. Daily arrays are zipped in provider order and truncated to the
/// shortest one.
pub fn normalize(res: ForecastResponse, location_label: String) -> Result<WeatherReport, FetchError> {
    let daily = res.daily;

    let (first_sunrise, first_sunset) = match (daily.sunrise.first(), daily.sunset.first()) {
        (Some(rise), Some(set)) => (format_clock_time(rise), format_clock_time(set)),
        _ => {
            return Err(FetchError::MalformedResponse(
                "daily sunrise/sunset arrays are empty".to_string(),
            ))
        }
    };

    let now = map_weather_code(code_from_provider(res.current_weather.weathercode));
    let current = CurrentWeather {
        temperature: round_temperature(res.current_weather.temperature),
        condition_label: now.label.to_string(),
        icon: now.icon,
        sunrise: first_sunrise,
        sunset: first_sunset,
        location_label,
    };

    let forecast: Vec<DailyForecastEntry> = daily
        .time
        .iter()
        .zip(&daily.temperature_2m_max)
        .zip(&daily.temperature_2m_min)
        .zip(&daily.weathercode)
        .zip(daily.sunrise.iter().zip(&daily.sunset))
        .map(|((((date, &high), &low), &code), (rise, set))| {
            let (date_label, day_name) = date_labels(date);
            let condition = map_weather_code(code_from_provider(code));
            DailyForecastEntry {
                date_label,
                day_name,
                high: round_temperature(high),
                low: round_temperature(low),
                condition_label: condition.label.to_string(),
                icon: condition.icon,
                sunrise: format_clock_time(rise),
                sunset: format_clock_time(set),
            }
        })
        .collect();

    if forecast.len() != daily.time.len() {
        warn!(
            "Daily arrays have uneven lengths; keeping {} of {} days",
            forecast.len(),
            daily.time.len()
        );
    }

    Ok(WeatherReport { current, forecast })
}
