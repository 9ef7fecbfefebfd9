//! Weather-forecast sample domain.
//!
//! The instrumented pipeline needs real routes to flow through; this is
//! the canonical forecast generator backing `GET /weatherforecast`.

use chrono::{Days, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The canonical summary table, coldest to hottest.
pub const SUMMARIES: [&str; 10] = [
    "Freezing",
    "Bracing",
    "Chilly",
    "Cool",
    "Mild",
    "Warm",
    "Balmy",
    "Hot",
    "Sweltering",
    "Scorching",
];

/// A single day's forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherForecast {
    pub date: NaiveDate,
    pub temperature_c: i32,
    pub temperature_f: i32,
    pub summary: String,
}

impl WeatherForecast {
    /// Build a forecast; Fahrenheit is derived from Celsius.
    pub fn new(date: NaiveDate, temperature_c: i32, summary: &str) -> Self {
        Self {
            date,
            temperature_c,
            temperature_f: 32 + (f64::from(temperature_c) / 0.5556) as i32,
            summary: summary.to_string(),
        }
    }
}

/// Generates sample forecasts.
#[derive(Debug, Default, Clone)]
pub struct WeatherService;

impl WeatherService {
    pub fn new() -> Self {
        Self
    }

    /// Produce `days` forecasts starting tomorrow, temperatures in
    /// -20..=55 °C with a random summary each.
    pub fn forecasts(&self, days: usize) -> Vec<WeatherForecast> {
        let mut rng = rand::thread_rng();
        let today = Utc::now().date_naive();
        (1..=days as u64)
            .map(|offset| {
                let date = today + Days::new(offset);
                let temperature_c = rng.gen_range(-20..=55);
                let summary = SUMMARIES[rng.gen_range(0..SUMMARIES.len())];
                WeatherForecast::new(date, temperature_c, summary)
            })
            .collect()
    }
}
