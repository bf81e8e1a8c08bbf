use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, Hash)]
pub enum WeatherCondition {
    Sunny,
    Cloudy,
    Rainy,
}

impl WeatherCondition {
    pub const ALL: [WeatherCondition; 3] = [Self::Sunny, Self::Cloudy, Self::Rainy];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sunny => "Sunny",
            Self::Cloudy => "Cloudy",
            Self::Rainy => "Rainy",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct WeatherData {
    /// Degrees Celsius
    pub temperature: i32,
    pub condition: WeatherCondition,
}

/// Structured payload handed to the caller alongside an assistant reply.
/// Not persisted with the message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum MediaAttachment {
    Weather(WeatherData),
}

impl MediaAttachment {
    pub fn weather(temperature: i32, condition: WeatherCondition) -> Self {
        Self::Weather(WeatherData {
            temperature,
            condition,
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Weather(_) => "weather",
        }
    }
}
