//! `get_weather` capability backed by the OpenWeather current-weather API.

use crate::tools::registry::Tool;
use crate::types::{AppError, Result};
use crate::utils::toml_config::WeatherConfig;
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    name: String,
    sys: Sys,
    main: Main,
    weather: Vec<Condition>,
    wind: Wind,
    clouds: Clouds,
    visibility: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct Sys {
    country: Option<String>,
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Main {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct Wind {
    speed: f64,
    deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct Clouds {
    all: f64,
}

pub struct WeatherTool {
    http: reqwest::Client,
    base_url: String,
    api_key_env: String,
    api_key: Option<String>,
    default_units: String,
}

impl WeatherTool {
    pub fn from_config(config: &WeatherConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key_env: config.api_key_env.clone(),
            api_key: None,
            default_units: config.default_units.clone(),
        }
    }

    /// Use a fixed key instead of reading the environment
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn api_key(&self) -> Result<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                AppError::Tool(format!(
                    "{} is not set; get a key at https://openweathermap.org/api",
                    self.api_key_env
                ))
            })
    }
}

fn clock(timestamp: Option<i64>) -> Option<String> {
    timestamp
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|t| t.format("%H:%M UTC").to_string())
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get current weather information for a city using OpenWeather"
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "The city to get weather for"
                },
                "units": {
                    "type": ["string", "null"],
                    "enum": ["metric", "imperial", null],
                    "description": "Temperature units (metric for Celsius, imperial for Fahrenheit)"
                }
            },
            "required": ["city"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let city = args
            .get("city")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::Tool("get_weather needs a 'city'".to_string()))?;
        let units = args
            .get("units")
            .and_then(Value::as_str)
            .unwrap_or(self.default_units.as_str())
            .to_string();
        let api_key = self.api_key()?;

        let response = self
            .http
            .get(format!("{}/weather", self.base_url))
            .query(&[
                ("q", city),
                ("units", units.as_str()),
                ("appid", api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Tool(format!("Error fetching weather data: {}", e)))?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(AppError::Tool(format!(
                    "City \"{}\" not found. Check the spelling and try again.",
                    city
                )))
            }
            StatusCode::UNAUTHORIZED => {
                return Err(AppError::Tool(format!(
                    "OpenWeather rejected the API key in {}",
                    self.api_key_env
                )))
            }
            status if !status.is_success() => {
                return Err(AppError::Tool(format!(
                    "Error fetching weather data: {}",
                    status
                )))
            }
            _ => {}
        }

        let data: CurrentWeather = response
            .json()
            .await
            .map_err(|e| AppError::Tool(format!("Unexpected weather payload: {}", e)))?;

        let metric = units == "metric";
        let speed_unit = if metric { "m/s" } else { "mph" };
        let visibility = data.visibility.map(|meters| {
            if metric {
                format!("{:.1} km", meters as f64 / 1000.0)
            } else {
                format!("{:.1} miles", meters as f64 * 0.000_621_371)
            }
        });

        Ok(json!({
            "city": data.name,
            "country": data.sys.country,
            "units": units,
            "temperature": data.main.temp.round(),
            "feels_like": data.main.feels_like.round(),
            "daily_range": [data.main.temp_min.round(), data.main.temp_max.round()],
            "conditions": data.weather.first().map(|c| c.description.clone()),
            "humidity_pct": data.main.humidity,
            "wind_speed": data.wind.speed,
            "wind_speed_unit": speed_unit,
            "wind_deg": data.wind.deg,
            "pressure_hpa": data.main.pressure,
            "cloud_cover_pct": data.clouds.all,
            "visibility": visibility,
            "sunrise": clock(data.sys.sunrise),
            "sunset": clock(data.sys.sunset),
        }))
    }
}
