use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Location block returned on every weather payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub tz_id: String,
    #[serde(default)]
    pub localtime_epoch: i64,
    /// Local wall-clock time at the location, `YYYY-MM-DD HH:MM`.
    #[serde(default)]
    pub localtime: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    #[serde(default)]
    pub icon: String,
}

/// Pollutant concentrations plus the US EPA index (1 = good .. 6 = hazardous).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQuality {
    #[serde(default)]
    pub co: f64,
    #[serde(default)]
    pub no2: f64,
    #[serde(default)]
    pub o3: f64,
    #[serde(default)]
    pub pm2_5: f64,
    #[serde(default)]
    pub pm10: f64,
    #[serde(rename = "us-epa-index", default)]
    pub us_epa_index: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Current {
    pub temp_c: f64,
    pub feelslike_c: f64,
    pub humidity: u8,
    pub wind_kph: f64,
    #[serde(default)]
    pub pressure_mb: f64,
    #[serde(default)]
    pub precip_mm: f64,
    #[serde(default)]
    pub uv: f64,
    pub condition: Condition,
    #[serde(default)]
    pub last_updated_epoch: Option<i64>,
    #[serde(default)]
    pub air_quality: Option<AirQuality>,
}

/// Aggregates for one forecast day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    pub maxtemp_c: f64,
    pub mintemp_c: f64,
    #[serde(default)]
    pub avghumidity: f64,
    #[serde(default)]
    pub daily_chance_of_rain: u8,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hour {
    pub time_epoch: i64,
    /// Local time of the slot, `YYYY-MM-DD HH:MM`.
    #[serde(default)]
    pub time: String,
    pub temp_c: f64,
    #[serde(default)]
    pub chance_of_rain: u8,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: String,
    pub date_epoch: i64,
    pub day: Day,
    #[serde(default)]
    pub hour: Vec<Hour>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Forecast {
    #[serde(default)]
    pub forecastday: Vec<ForecastDay>,
}

/// Payload shared by `/current.json` and `/forecast.json`; the forecast
/// block is absent on current-conditions responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    pub location: Location,
    pub current: Current,
    #[serde(default)]
    pub forecast: Option<Forecast>,
}

/// One entry from `/search.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchLocation {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub url: String,
}

/// A user-saved city as persisted in the favorites table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteCity {
    pub name: String,
    pub region: String,
    pub country: String,
    pub lat: f64,
    pub lon: f64,
    /// Insertion time, epoch milliseconds. Newest-first list order.
    pub timestamp: i64,
}

impl FavoriteCity {
    pub fn new(name: String, region: String, country: String, lat: f64, lon: f64) -> Self {
        Self { name, region, country, lat, lon, timestamp: Utc::now().timestamp_millis() }
    }

    pub fn from_location(location: &Location) -> Self {
        Self::new(
            location.name.clone(),
            location.region.clone(),
            location.country.clone(),
            location.lat,
            location.lon,
        )
    }

    /// `q` parameter for looking this city up again, `"lat,lon"`.
    pub fn query(&self) -> String {
        format!("{},{}", self.lat, self.lon)
    }
}
