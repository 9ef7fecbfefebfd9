//! Application services behind the HTTP handlers.

pub mod weather;

pub use weather::{WeatherForecast, WeatherService};
