use httpmock::prelude::*;
use serde_json::json;
use wayfarer_core::{
    Config, LocationSource, Pipeline, ProviderId, flights::FLIGHTS_NOT_CONFIGURED, format,
    weather::FORECAST_UNAVAILABLE,
};

fn config_for(server: &MockServer) -> Config {
    let mut cfg = Config::default();
    for id in [ProviderId::Nominatim, ProviderId::Nws, ProviderId::OpenMeteo, ProviderId::IpApi] {
        cfg.set_provider_base_url(id, server.base_url());
    }
    cfg.set_provider_base_url(ProviderId::SerpApi, server.url("/flights"));
    cfg
}

fn open_meteo_body() -> serde_json::Value {
    json!({
        "current_weather": { "temperature": 11.0, "windspeed": 5.0, "winddirection": 90.0, "weathercode": 0 },
        "daily": {
            "time": ["2025-03-01", "2025-03-02", "2025-03-03"],
            "temperature_2m_max": [14.0, 15.0, 16.0],
            "temperature_2m_min": [4.0, 5.0, 6.0],
            "weathercode": [0, 1, 2]
        }
    })
}

#[tokio::test]
async fn place_outside_nws_coverage_falls_back_to_open_meteo() {
    let server = MockServer::start_async().await;
    let search = server
        .mock_async(|when, then| {
            when.method(GET).path("/search").query_param("q", "Turin");
            then.status(200).json_body(json!([
                { "lat": "45.0703", "lon": "7.6869", "display_name": "Torino, Piemonte, Italia" }
            ]));
        })
        .await;
    let points = server
        .mock_async(|when, then| {
            when.method(GET).path("/points/45.0703,7.6869");
            then.status(404).json_body(json!({ "title": "Data Unavailable For Requested Point" }));
        })
        .await;
    let open_meteo = server
        .mock_async(|when, then| {
            when.method(GET).path("/forecast");
            then.status(200).json_body(open_meteo_body());
        })
        .await;
    let ip = server
        .mock_async(|when, then| {
            when.method(GET).path("/json/");
            then.status(200).json_body(json!({ "status": "success", "city": "Nowhere", "lat": 0.0, "lon": 0.0 }));
        })
        .await;

    let pipeline = Pipeline::from_config(&config_for(&server)).unwrap();
    let text = pipeline.forecast_for(None, Some("Turin")).await;

    search.assert_async().await;
    points.assert_async().await;
    open_meteo.assert_async().await;
    ip.assert_hits_async(0).await;
    assert!(text.starts_with("Current Weather:"));
    assert!(text.contains("Clear sky"));
}

#[tokio::test]
async fn every_provider_down_still_yields_text() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET);
            then.status(503).body("maintenance");
        })
        .await;

    let pipeline = Pipeline::from_config(&config_for(&server)).unwrap();

    let forecast = pipeline.forecast_for(Some((39.7456, -97.0892)), None).await;
    assert_eq!(forecast, FORECAST_UNAVAILABLE);

    let unresolved = pipeline.forecast_for(None, Some("Atlantis")).await;
    assert!(unresolved.starts_with("Unable to geocode the provided location"));

    assert_eq!(pipeline.alerts("CA").await, format::ALERTS_UNAVAILABLE);
}

#[tokio::test]
async fn explicit_coordinate_resolves_offline() {
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|when, then| {
            when.path_contains("/");
            then.status(500);
        })
        .await;

    let pipeline = Pipeline::from_config(&config_for(&server)).unwrap();
    let location = pipeline.resolve(Some((48.8566, 2.3522)), Some("Turin")).await.unwrap();

    assert_eq!(location.source, LocationSource::Explicit);
    assert_eq!(location.coordinate.latitude(), 48.8566);

    let rejected = pipeline.forecast_for(Some((123.0, 7.0)), None).await;
    assert!(rejected.starts_with("Invalid coordinates"));

    any.assert_hits_async(0).await;
}

#[tokio::test]
async fn alerts_distinguish_empty_from_absent() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/alerts/active/area/CA");
            then.status(200).json_body(json!({ "type": "FeatureCollection", "features": [] }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/alerts/active/area/TX");
            then.status(200).json_body(json!({ "type": "FeatureCollection" }));
        })
        .await;

    let pipeline = Pipeline::from_config(&config_for(&server)).unwrap();

    assert_eq!(pipeline.alerts("ca").await, format::NO_ACTIVE_ALERTS);
    assert_eq!(pipeline.alerts("TX").await, format::ALERTS_UNAVAILABLE);
}

#[tokio::test]
async fn flights_are_sorted_end_to_end() {
    let server = MockServer::start_async().await;
    let offer = |number: &str, time: &str| {
        json!({
            "flights": [{
                "departure_airport": { "id": "TRN", "time": time },
                "airline": "ITA",
                "flight_number": number,
                "duration": 70
            }],
            "total_duration": 70,
            "price": 80
        })
    };
    server
        .mock_async(|when, then| {
            when.method(GET).path("/flights").query_param("api_key", "KEY");
            then.status(200).json_body(json!({
                "best_flights": [offer("AZ 2", "2025-03-01 18:30")],
                "other_flights": [offer("AZ 1", "2025-03-01 07:15")]
            }));
        })
        .await;

    let mut cfg = config_for(&server);
    cfg.set_flight_api_key("KEY".to_string());
    let pipeline = Pipeline::from_config(&cfg).unwrap();

    let date = chrono::NaiveDate::from_ymd_opt(2025, 3, 1);
    let text = pipeline.flights("trn", "fco", date).await;

    assert!(text.starts_with("--- Flights from TRN to FCO on 2025-03-01 ---"));
    assert!(text.find("AZ 1").unwrap() < text.find("AZ 2").unwrap());
}

#[tokio::test]
async fn flights_without_key_make_no_request() {
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|when, then| {
            when.path_contains("/");
            then.status(200);
        })
        .await;

    let pipeline = Pipeline::from_config(&config_for(&server)).unwrap();

    assert_eq!(pipeline.flights("TRN", "FCO", None).await, FLIGHTS_NOT_CONFIGURED);
    any.assert_hits_async(0).await;
}
