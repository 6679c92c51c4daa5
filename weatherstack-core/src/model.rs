use chrono::NaiveDateTime;
use reqwest::{StatusCode, header::HeaderMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::client::ClientError;

/// Unit system accepted by the `units` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Units {
    Metric,
    Scientific,
    Fahrenheit,
}

impl Units {
    /// Wire code sent to and echoed back by the service.
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "m",
            Units::Scientific => "s",
            Units::Fahrenheit => "f",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Fahrenheit, Units::Scientific]
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "m" | "metric" => Ok(Units::Metric),
            "s" | "scientific" => Ok(Units::Scientific),
            "f" | "fahrenheit" => Ok(Units::Fahrenheit),
            _ => Err(anyhow::anyhow!(
                "Unknown units '{value}'. Supported units: m (metric), s (scientific), f (fahrenheit)."
            )),
        }
    }
}

/// Parameters for one call to the `current` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentWeatherRequest {
    pub query: String,
    pub units: Option<Units>,
    pub language: Option<String>,
}

impl CurrentWeatherRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), units: None, language: None }
    }

    pub fn units(mut self, units: Units) -> Self {
        self.units = Some(units);
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Query parameters except `access_key`. `query` is always present, even when empty.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![("query", self.query.as_str())];

        if let Some(units) = self.units {
            pairs.push(("units", units.as_str()));
        }
        if let Some(language) = self.language.as_deref().filter(|l| !l.is_empty()) {
            pairs.push(("language", language));
        }

        pairs
    }
}

/// Raw response as returned by the service. Status and body are not interpreted.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl ApiResponse {
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Header value by case-insensitive name. Non UTF-8 values are returned lossily.
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> Result<Value, ClientError> {
        serde_json::from_str(&self.body).map_err(ClientError::InvalidJson)
    }
}

/// Error codes the harness checks for, with their stable type strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidAccessKey,
    MissingQuery,
    RequestFailed,
}

impl ErrorCode {
    pub fn code(&self) -> i64 {
        match self {
            ErrorCode::InvalidAccessKey => 101,
            ErrorCode::MissingQuery => 601,
            ErrorCode::RequestFailed => 615,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ErrorCode::InvalidAccessKey => "invalid_access_key",
            ErrorCode::MissingQuery => "missing_query",
            ErrorCode::RequestFailed => "request_failed",
        }
    }

    /// Text the service puts in `error.info`.
    pub fn info(&self) -> &'static str {
        match self {
            ErrorCode::InvalidAccessKey => "You have not supplied a valid API Access Key.",
            ErrorCode::MissingQuery => {
                "Please specify a valid location identifier using the query parameter."
            }
            ErrorCode::RequestFailed => {
                "Your API request failed. Please try again or contact support."
            }
        }
    }

    pub const fn all() -> &'static [ErrorCode] {
        &[ErrorCode::InvalidAccessKey, ErrorCode::MissingQuery, ErrorCode::RequestFailed]
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::all().iter().copied().find(|c| c.code() == code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.error_type())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: i64,
    #[serde(rename = "type")]
    pub kind: String,
    pub info: String,
}

/// Body returned for application-level failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub success: bool,
    pub error: ErrorDetail,
}

impl ErrorPayload {
    pub fn known_code(&self) -> Option<ErrorCode> {
        ErrorCode::from_code(self.error.code)
    }
}

#[derive(Debug, Deserialize)]
struct WsRequest {
    unit: String,
}

#[derive(Debug, Deserialize)]
struct WsLocation {
    name: String,
    country: String,
    localtime: String,
}

#[derive(Debug, Deserialize)]
struct WsCurrent {
    temperature: i64,
    #[serde(default)]
    weather_descriptions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WsSuccess {
    request: WsRequest,
    location: WsLocation,
    current: WsCurrent,
}

/// Layout of `location.localtime`, e.g. `2026-10-18 10:43`.
const LOCALTIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Human-facing subset of a successful current-weather body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentWeatherSummary {
    pub location_name: String,
    pub country: String,
    pub local_time: NaiveDateTime,
    pub temperature: i64,
    pub unit: String,
    pub condition: String,
}

impl CurrentWeatherSummary {
    pub fn from_json(body: &Value) -> Result<Self, ClientError> {
        let parsed = WsSuccess::deserialize(body).map_err(ClientError::InvalidJson)?;

        let local_time = NaiveDateTime::parse_from_str(&parsed.location.localtime, LOCALTIME_FORMAT)
            .map_err(|e| {
                ClientError::InvalidJson(serde::de::Error::custom(format!(
                    "location.localtime '{}' is not '{LOCALTIME_FORMAT}': {e}",
                    parsed.location.localtime
                )))
            })?;

        let condition = parsed
            .current
            .weather_descriptions
            .first()
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string());

        Ok(Self {
            location_name: parsed.location.name,
            country: parsed.location.country,
            local_time,
            temperature: parsed.current.temperature,
            unit: parsed.request.unit,
            condition,
        })
    }

    fn temperature_suffix(&self) -> &'static str {
        match self.unit.as_str() {
            "f" => "°F",
            "s" => "K",
            _ => "°C",
        }
    }
}

impl fmt::Display for CurrentWeatherSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}: {}{} ({}), local time {}",
            self.location_name,
            self.country,
            self.temperature,
            self.temperature_suffix(),
            self.condition,
            self.local_time.format(LOCALTIME_FORMAT),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{CONTENT_TYPE, HeaderValue};
    use serde_json::json;

    #[test]
    fn units_as_str_roundtrip() {
        for units in Units::all() {
            let parsed = Units::try_from(units.as_str()).expect("roundtrip should succeed");
            assert_eq!(*units, parsed);
        }
    }

    #[test]
    fn unknown_units_error() {
        let err = Units::try_from("kelvin").unwrap_err();
        assert!(err.to_string().contains("Unknown units"));
    }

    #[test]
    fn query_pairs_keep_empty_query_and_skip_absent_options() {
        let request = CurrentWeatherRequest::new("");
        assert_eq!(request.query_pairs(), vec![("query", "")]);
    }

    #[test]
    fn query_pairs_include_units_and_language() {
        let request = CurrentWeatherRequest::new("Tokyo").units(Units::Fahrenheit).language("de");

        assert_eq!(
            request.query_pairs(),
            vec![("query", "Tokyo"), ("units", "f"), ("language", "de")]
        );
    }

    #[test]
    fn empty_language_is_not_sent() {
        let request = CurrentWeatherRequest::new("Paris").language("");
        assert_eq!(request.query_pairs(), vec![("query", "Paris")]);
    }

    #[test]
    fn header_lookup_ignores_name_case() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json; Charset=UTF-8"));
        let response = ApiResponse { status: StatusCode::OK, headers, body: String::new() };

        assert_eq!(
            response.header("content-TYPE").as_deref(),
            Some("application/json; Charset=UTF-8")
        );
        assert_eq!(response.header("X-Missing"), None);
    }

    #[test]
    fn non_json_body_is_a_client_error() {
        let response = ApiResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: "<html>oops</html>".into(),
        };

        assert!(matches!(response.json(), Err(ClientError::InvalidJson(_))));
    }

    #[test]
    fn error_codes_pair_with_types() {
        assert_eq!(ErrorCode::from_code(101), Some(ErrorCode::InvalidAccessKey));
        assert_eq!(ErrorCode::from_code(601).map(|c| c.error_type()), Some("missing_query"));
        assert_eq!(ErrorCode::from_code(615).map(|c| c.error_type()), Some("request_failed"));
        assert_eq!(ErrorCode::from_code(404), None);
    }

    #[test]
    fn error_payload_deserializes_type_field() {
        let payload: ErrorPayload = serde_json::from_value(json!({
            "success": false,
            "error": {
                "code": 101,
                "type": "invalid_access_key",
                "info": "You have not supplied a valid API Access Key."
            }
        }))
        .unwrap();

        assert!(!payload.success);
        assert_eq!(payload.error.kind, "invalid_access_key");
        assert_eq!(payload.known_code(), Some(ErrorCode::InvalidAccessKey));
    }

    #[test]
    fn summary_formats_fahrenheit() {
        let body = json!({
            "request": { "unit": "f" },
            "location": { "name": "Tokyo", "country": "Japan", "localtime": "2023-11-14 22:13" },
            "current": { "temperature": 61, "weather_descriptions": ["Sunny"] }
        });

        let summary = CurrentWeatherSummary::from_json(&body).unwrap();

        assert_eq!(summary.to_string(), "Tokyo, Japan: 61°F (Sunny), local time 2023-11-14 22:13");
    }

    #[test]
    fn summary_rejects_malformed_local_time() {
        let body = json!({
            "request": { "unit": "m" },
            "location": { "name": "Tokyo", "country": "Japan", "localtime": "" },
            "current": { "temperature": 16, "weather_descriptions": [] }
        });

        let err = CurrentWeatherSummary::from_json(&body).unwrap_err();
        assert!(err.to_string().contains("location.localtime"), "{err}");
    }

    #[test]
    fn summary_rejects_error_payload() {
        let body = json!({ "success": false, "error": { "code": 601, "type": "missing_query", "info": "" } });
        assert!(CurrentWeatherSummary::from_json(&body).is_err());
    }
}
