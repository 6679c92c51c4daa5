//! Contract scenarios against the `current` endpoint.
//!
//! Each [`Scenario`] issues its own request(s) and runs its own checks, so
//! scenarios can run in any order or concurrently against one shared client.

use serde_json::Value;
use std::fmt;
use thiserror::Error;
use tracing::info;

use crate::{
    assertions::{
        self, AssertionError, JsonType, assert_field_contains, assert_field_equals,
        assert_field_exists, assert_field_type, assert_header_value, assert_status_code,
    },
    client::{ClientError, WeatherstackClient},
    model::{ApiResponse, CurrentWeatherRequest, ErrorCode, Units},
    schema::Schema,
};

/// Content type the service sends on every response.
pub const JSON_CONTENT_TYPE: &str = "application/json; Charset=UTF-8";

pub const SUCCESS_LOCATIONS: [&str; 3] = ["New Delhi", "New York", "London"];

pub const INVALID_LOCATIONS: [&str; 2] = ["NonExistentCity12345", "InvalidQuery@#$"];

pub const UNIT_CASES: [(&str, Units); 3] =
    [("Paris", Units::Metric), ("Tokyo", Units::Fahrenheit), ("Berlin", Units::Scientific)];

pub const INVALID_ACCESS_KEY: &str = "invalid_key_123";

/// Location queried by the invalid-key scenario.
pub const INVALID_KEY_QUERY: &str = "New York";

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Assertion(#[from] AssertionError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scenario {
    CurrentWeatherSuccess { location: String },
    InvalidAccessKey,
    InvalidLocation { location: String },
    WithUnits { query: String, units: Units },
    MissingQuery,
    RepeatedRequest { location: String },
}

impl Scenario {
    /// Every scenario in the catalogue, parameterized cases expanded.
    pub fn all() -> Vec<Scenario> {
        let mut all: Vec<Scenario> = SUCCESS_LOCATIONS
            .iter()
            .map(|l| Scenario::CurrentWeatherSuccess { location: l.to_string() })
            .collect();

        all.push(Scenario::InvalidAccessKey);
        all.extend(
            INVALID_LOCATIONS
                .iter()
                .map(|l| Scenario::InvalidLocation { location: l.to_string() }),
        );
        all.extend(
            UNIT_CASES
                .iter()
                .map(|(q, units)| Scenario::WithUnits { query: q.to_string(), units: *units }),
        );
        all.push(Scenario::MissingQuery);
        all.push(Scenario::RepeatedRequest { location: SUCCESS_LOCATIONS[2].to_string() });

        all
    }

    pub fn name(&self) -> String {
        match self {
            Scenario::CurrentWeatherSuccess { location } => {
                format!("current_weather_success[{location}]")
            }
            Scenario::InvalidAccessKey => "invalid_access_key".to_string(),
            Scenario::InvalidLocation { location } => format!("invalid_location[{location}]"),
            Scenario::WithUnits { query, units } => format!("with_units[{query}-{units}]"),
            Scenario::MissingQuery => "missing_query".to_string(),
            Scenario::RepeatedRequest { location } => format!("repeated_request[{location}]"),
        }
    }

    pub async fn run(&self, client: &WeatherstackClient) -> Result<(), ScenarioError> {
        info!(scenario = %self, "Running scenario");

        match self {
            Scenario::CurrentWeatherSuccess { location } => {
                current_weather_success(client, location).await
            }
            Scenario::InvalidAccessKey => invalid_access_key(client).await,
            Scenario::InvalidLocation { location } => invalid_location(client, location).await,
            Scenario::WithUnits { query, units } => with_units(client, query, *units).await,
            Scenario::MissingQuery => missing_query(client).await,
            Scenario::RepeatedRequest { location } => repeated_request(client, location).await,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Status 200 plus the JSON content type, then decode the body.
fn expect_json_ok(response: &ApiResponse) -> Result<Value, ScenarioError> {
    // The service answers application-level failures with 200 too.
    assert_status_code(response, 200)?;
    assert_header_value(response, "Content-Type", JSON_CONTENT_TYPE)?;
    Ok(response.json()?)
}

/// Full check of an error body against a known error code.
pub fn expect_error_payload(response: &ApiResponse, expected: ErrorCode) -> Result<(), ScenarioError> {
    let body = expect_json_ok(response)?;

    assertions::validate_schema(&body, Schema::Error)?;

    let error = &body["error"];
    assert_field_equals(&body, "success", false)?;
    assert_field_equals(error, "code", expected.code())?;
    assert_field_equals(error, "type", expected.error_type())?;
    assert_field_exists(error, "info")?;
    assert_field_contains(error, "info", expected.info())?;

    Ok(())
}

/// Success body for `location`: schema, echoed query and name, integer temperature.
pub fn expect_current_weather(response: &ApiResponse, location: &str) -> Result<(), ScenarioError> {
    let body = expect_json_ok(response)?;

    assertions::validate_schema(&body, Schema::CurrentWeather)?;

    assert_field_contains(&body["request"], "query", location)?;
    assert_field_exists(&body["location"], "name")?;
    assert_field_equals(&body["location"], "name", location)?;
    assert_field_exists(&body["current"], "temperature")?;
    assert_field_type(&body["current"], "temperature", JsonType::Integer)?;

    Ok(())
}

pub async fn current_weather_success(
    client: &WeatherstackClient,
    location: &str,
) -> Result<(), ScenarioError> {
    let response = client.get_current_weather(&CurrentWeatherRequest::new(location)).await?;
    expect_current_weather(&response, location)
}

/// Uses a separate client carrying a bad key; `client` itself is never changed.
pub async fn invalid_access_key(client: &WeatherstackClient) -> Result<(), ScenarioError> {
    let bad_client = client.with_access_key(INVALID_ACCESS_KEY);
    let response = bad_client
        .get_current_weather(&CurrentWeatherRequest::new(INVALID_KEY_QUERY))
        .await?;

    expect_error_payload(&response, ErrorCode::InvalidAccessKey)
}

pub async fn invalid_location(
    client: &WeatherstackClient,
    location: &str,
) -> Result<(), ScenarioError> {
    let response = client.get_current_weather(&CurrentWeatherRequest::new(location)).await?;
    expect_error_payload(&response, ErrorCode::RequestFailed)
}

pub async fn with_units(
    client: &WeatherstackClient,
    query: &str,
    units: Units,
) -> Result<(), ScenarioError> {
    let request = CurrentWeatherRequest::new(query).units(units);
    let response = client.get_current_weather(&request).await?;
    let body = expect_json_ok(&response)?;

    assert_field_equals(&body["request"], "unit", units.as_str())?;
    assert_field_exists(&body["current"], "temperature")?;
    assert_field_type(&body["current"], "temperature", JsonType::Integer)?;

    Ok(())
}

pub async fn missing_query(client: &WeatherstackClient) -> Result<(), ScenarioError> {
    let response = client.get_current_weather(&CurrentWeatherRequest::new("")).await?;
    expect_error_payload(&response, ErrorCode::MissingQuery)
}

/// Same request twice; both answers must conform. Live values may differ between them.
pub async fn repeated_request(
    client: &WeatherstackClient,
    location: &str,
) -> Result<(), ScenarioError> {
    let request = CurrentWeatherRequest::new(location);

    for _ in 0..2 {
        let response = client.get_current_weather(&request).await?;
        let body = expect_json_ok(&response)?;

        assertions::validate_schema(&body, Schema::CurrentWeather)?;
        assert_field_type(&body["current"], "temperature", JsonType::Integer)?;
    }

    Ok(())
}
