//! Core library for Weatherstack API contract testing.
//!
//! This crate defines:
//! - Settings loading (environment, `.env`, settings file)
//! - A thin client for the `current` endpoint
//! - JSON schemas for success and error bodies
//! - Assertions and the scenario catalogue built on top of them
//!
//! It is used by `weatherstack-cli` and by the integration tests in `tests/`.

pub mod assertions;
pub mod client;
pub mod config;
pub mod model;
pub mod scenario;
pub mod schema;

pub use assertions::{AssertionError, JsonType};
pub use client::{ClientError, WeatherstackClient};
pub use config::{Settings, SettingsError, SettingsFile};
pub use model::{
    ApiResponse, CurrentWeatherRequest, CurrentWeatherSummary, ErrorCode, ErrorPayload, Units,
};
pub use scenario::{Scenario, ScenarioError};
pub use schema::Schema;
