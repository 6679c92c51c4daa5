//! Scenarios against the real Weatherstack service.
//!
//! Ignored by default. With `BASE_URL` and `WEATHERSTACK_API_KEY` set (or a
//! `.env` file / settings file in place), run:
//!
//! ```text
//! cargo test -p weatherstack-core --test live_weatherstack -- --ignored
//! ```

use weatherstack_core::{
    Settings, Units, WeatherstackClient,
    scenario::{self, INVALID_LOCATIONS, SUCCESS_LOCATIONS, UNIT_CASES},
};

fn live_client() -> WeatherstackClient {
    let settings = Settings::load().expect("live tests need BASE_URL and WEATHERSTACK_API_KEY");
    WeatherstackClient::new(settings)
}

macro_rules! live_case {
    ($name:ident, $client:ident => $call:expr) => {
        #[tokio::test]
        #[ignore = "hits the live Weatherstack API"]
        async fn $name() {
            let $client = &live_client();
            if let Err(err) = $call.await {
                panic!("{err}");
            }
        }
    };
}

live_case!(current_weather_new_delhi, c => scenario::current_weather_success(c, SUCCESS_LOCATIONS[0]));
live_case!(current_weather_new_york, c => scenario::current_weather_success(c, SUCCESS_LOCATIONS[1]));
live_case!(current_weather_london, c => scenario::current_weather_success(c, SUCCESS_LOCATIONS[2]));

live_case!(invalid_access_key, c => scenario::invalid_access_key(c));

live_case!(invalid_location_nonexistent, c => scenario::invalid_location(c, INVALID_LOCATIONS[0]));
live_case!(invalid_location_bad_characters, c => scenario::invalid_location(c, INVALID_LOCATIONS[1]));

live_case!(units_metric_paris, c => scenario::with_units(c, UNIT_CASES[0].0, Units::Metric));
live_case!(units_fahrenheit_tokyo, c => scenario::with_units(c, UNIT_CASES[1].0, Units::Fahrenheit));
live_case!(units_scientific_berlin, c => scenario::with_units(c, UNIT_CASES[2].0, Units::Scientific));

live_case!(missing_query, c => scenario::missing_query(c));

live_case!(repeated_request_london, c => scenario::repeated_request(c, SUCCESS_LOCATIONS[2]));
