//! JSON schemas for the two response shapes of the `current` endpoint.
//!
//! Every object level is closed (`additionalProperties: false`), so an
//! unexpected field fails validation just like a missing one.

use serde_json::{Value, json};
use std::{fmt, sync::LazyLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Schema {
    /// Successful current-weather body: `request`, `location`, `current`.
    CurrentWeather,
    /// Application-level failure: `success: false` plus an `error` object.
    Error,
}

impl Schema {
    pub fn name(&self) -> &'static str {
        match self {
            Schema::CurrentWeather => "current_weather",
            Schema::Error => "error_response",
        }
    }

    pub fn definition(&self) -> &'static Value {
        match self {
            Schema::CurrentWeather => &*CURRENT_WEATHER,
            Schema::Error => &*ERROR_RESPONSE,
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

static CURRENT_WEATHER: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "type": "object",
        "properties": {
            "request": {
                "type": "object",
                "properties": {
                    "type": { "type": "string" },
                    "query": { "type": "string" },
                    "language": { "type": "string" },
                    "unit": { "type": "string" }
                },
                "required": ["type", "query", "language", "unit"],
                "additionalProperties": false
            },
            "location": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "country": { "type": "string" },
                    "region": { "type": "string" },
                    "lat": { "type": "string" },
                    "lon": { "type": "string" },
                    "timezone_id": { "type": "string" },
                    "localtime": { "type": "string" },
                    "localtime_epoch": { "type": "integer" },
                    "utc_offset": { "type": "string" }
                },
                "required": [
                    "name", "country", "region", "lat", "lon", "timezone_id",
                    "localtime", "localtime_epoch", "utc_offset"
                ],
                "additionalProperties": false
            },
            "current": {
                "type": "object",
                "properties": {
                    "observation_time": { "type": "string" },
                    "temperature": { "type": "integer" },
                    "weather_code": { "type": "integer" },
                    "weather_icons": { "type": "array", "items": { "type": "string" } },
                    "weather_descriptions": { "type": "array", "items": { "type": "string" } },
                    "astro": {
                        "type": "object",
                        "properties": {
                            "sunrise": { "type": "string" },
                            "sunset": { "type": "string" },
                            "moonrise": { "type": "string" },
                            "moonset": { "type": "string" },
                            "moon_phase": { "type": "string" },
                            "moon_illumination": { "type": "integer" }
                        },
                        "required": [
                            "sunrise", "sunset", "moonrise", "moonset",
                            "moon_phase", "moon_illumination"
                        ],
                        "additionalProperties": false
                    },
                    "air_quality": {
                        "type": "object",
                        "properties": {
                            "co": { "type": "string" },
                            "no2": { "type": "string" },
                            "o3": { "type": "string" },
                            "so2": { "type": "string" },
                            "pm2_5": { "type": "string" },
                            "pm10": { "type": "string" },
                            "us-epa-index": { "type": "string" },
                            "gb-defra-index": { "type": "string" }
                        },
                        "required": [
                            "co", "no2", "o3", "so2", "pm2_5", "pm10",
                            "us-epa-index", "gb-defra-index"
                        ],
                        "additionalProperties": false
                    },
                    "wind_speed": { "type": "integer" },
                    "wind_degree": { "type": "integer" },
                    "wind_dir": { "type": "string" },
                    "pressure": { "type": "integer" },
                    "precip": { "type": "number" },
                    "humidity": { "type": "integer" },
                    "cloudcover": { "type": "integer" },
                    "feelslike": { "type": "integer" },
                    "uv_index": { "type": "integer" },
                    "visibility": { "type": "integer" },
                    "is_day": { "type": "string" }
                },
                "required": [
                    "observation_time", "temperature", "weather_code", "weather_icons",
                    "weather_descriptions", "wind_speed", "wind_degree", "wind_dir",
                    "pressure", "precip", "humidity", "cloudcover", "feelslike",
                    "uv_index", "visibility", "is_day", "astro", "air_quality"
                ],
                "additionalProperties": false
            }
        },
        "required": ["request", "location", "current"],
        "additionalProperties": false
    })
});

static ERROR_RESPONSE: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "type": "object",
        "properties": {
            "success": { "type": "boolean" },
            "error": {
                "type": "object",
                "properties": {
                    "code": { "type": "integer" },
                    "type": { "type": "string" },
                    "info": { "type": "string" }
                },
                "required": ["code", "type", "info"],
                "additionalProperties": false
            }
        },
        "required": ["success", "error"],
        "additionalProperties": false
    })
});

#[cfg(test)]
mod tests {
    use super::*;

    fn required(value: &Value) -> Vec<&str> {
        value["required"]
            .as_array()
            .expect("required must be an array")
            .iter()
            .filter_map(Value::as_str)
            .collect()
    }

    /// Walk every object node and check it is closed and its required keys are declared.
    fn assert_closed(path: &str, node: &Value) {
        if node["type"] != "object" {
            return;
        }
        assert_eq!(node["additionalProperties"], false, "{path} is not closed");

        let props = node["properties"].as_object().expect("object node without properties");
        for key in required(node) {
            assert!(props.contains_key(key), "{path}.{key} is required but not declared");
        }
        for (key, child) in props {
            assert_closed(&format!("{path}.{key}"), child);
        }
    }

    #[test]
    fn every_object_level_is_closed() {
        assert_closed("current_weather", Schema::CurrentWeather.definition());
        assert_closed("error_response", Schema::Error.definition());
    }

    #[test]
    fn current_block_requires_nested_groups() {
        let current = &Schema::CurrentWeather.definition()["properties"]["current"];
        let req = required(current);

        assert_eq!(req.len(), 18);
        assert!(req.contains(&"astro"));
        assert!(req.contains(&"air_quality"));
        assert_eq!(required(&current["properties"]["astro"]).len(), 6);
        assert_eq!(required(&current["properties"]["air_quality"]).len(), 8);
    }

    #[test]
    fn air_quality_readings_are_strings() {
        let air = &Schema::CurrentWeather.definition()["properties"]["current"]["properties"]
            ["air_quality"]["properties"];

        for (key, prop) in air.as_object().unwrap() {
            assert_eq!(prop["type"], "string", "air_quality.{key}");
        }
    }

    #[test]
    fn error_schema_requires_all_fields() {
        let schema = Schema::Error.definition();
        assert_eq!(required(schema), vec!["success", "error"]);
        assert_eq!(required(&schema["properties"]["error"]), vec!["code", "type", "info"]);
    }
}
