//! Integration tests for both providers against a mock HTTP server.

use apicast_core::{
    ApiError, ChatProvider, Config, Credential, ErrorReason, OpenAiSettings, OpenWeatherSettings,
    PricingTable, WeatherProvider, WeatherQuery,
    pricing::ModelPricing,
    provider::{
        chat_provider_with, openai::OpenAiProvider, openweather::OpenWeatherProvider,
        weather_provider_with,
    },
    report::{display_zone, format_report},
};
use chrono::{TimeZone, Utc};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path, query_param},
};

fn weather_provider(server: &MockServer) -> OpenWeatherProvider {
    let settings = OpenWeatherSettings { base_url: server.uri(), ..Default::default() };
    OpenWeatherProvider::new(Credential::new("OW_KEY"), settings)
}

fn chat_provider(server: &MockServer) -> OpenAiProvider {
    let settings = OpenAiSettings { base_url: format!("{}/v1", server.uri()), ..Default::default() };
    OpenAiProvider::new(Credential::new("sk-test"), settings)
}

fn kyiv_payload() -> serde_json::Value {
    serde_json::json!({
        "coord": {"lon": 30.5167, "lat": 50.4333},
        "weather": [{"id": 803, "main": "Clouds", "description": "хмарно", "icon": "04d"}],
        "main": {"temp": 18.27, "feels_like": 17.61, "temp_min": 17.0, "temp_max": 19.4,
                 "pressure": 1015, "humidity": 60},
        "visibility": 10000,
        "wind": {"speed": 4.12, "deg": 310},
        "clouds": {"all": 75},
        "dt": 1718200000,
        "sys": {"country": "UA", "sunrise": 1718158000, "sunset": 1718216900},
        "timezone": 10800,
        "name": "Kyiv",
        "cod": 200
    })
}

fn completion_payload() -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "gpt-3.5-turbo-0125",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": "Artificial intelligence is..."},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 25, "completion_tokens": 113, "total_tokens": 138}
    })
}

// ============================================================================
// Weather
// ============================================================================

#[tokio::test]
async fn weather_fetch_sends_expected_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Kyiv"))
        .and(query_param("appid", "OW_KEY"))
        .and(query_param("units", "metric"))
        .and(query_param("lang", "ua"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kyiv_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let obs = weather_provider(&server)
        .fetch(&WeatherQuery::new("Kyiv"))
        .await
        .expect("fetch should succeed");

    assert_eq!(obs.city_name(), "Kyiv");
    assert_eq!(obs.country(), "UA");
    assert_eq!(obs.description(), "хмарно");
    assert_eq!(obs.temperature(), 18.27);
    assert_eq!(obs.timezone_offset_secs(), 10800);
}

#[tokio::test]
async fn weather_report_from_mocked_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kyiv_payload()))
        .mount(&server)
        .await;

    let outcome = weather_provider(&server).fetch(&WeatherQuery::new("Київ")).await;
    let now = Utc.with_ymd_and_hms(2024, 6, 12, 9, 30, 5).single().expect("valid instant");
    let report = format_report("Київ", &outcome, now, display_zone(10800));

    assert!(report.starts_with("Погода у місті Київ (Kyiv):\n"));
    assert!(report.contains("Дата і час запиту (локальний час): 2024-06-12 12:30:05+03:00"));
    assert!(report.contains("Тривалість дня: 16:21 (г:хв)"));
    assert!(report.contains("Температура: 18.27°C (відчувається як 17.61°C)"));
    assert!(report.ends_with("Швидкість вітру: 4.12 м/с"));
}

#[tokio::test]
async fn weather_imperial_units_are_forwarded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("units", "imperial"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kyiv_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let query = WeatherQuery::new("Kyiv").with_units(apicast_core::Units::Imperial);
    let result = weather_provider(&server).fetch(&query).await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn weather_not_found_maps_to_upstream_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({"cod": "404", "message": "city not found"})),
        )
        .mount(&server)
        .await;

    let outcome = weather_provider(&server).fetch(&WeatherQuery::new("Atlantis")).await;

    let err = outcome.as_ref().unwrap_err();
    assert_eq!(err.reason(), ErrorReason::UpstreamStatus);
    assert_eq!(err.status(), Some(404));
    let message = err.to_string();
    assert!(message.contains("404"));

    let report = format_report("Atlantis", &outcome, Utc::now(), display_zone(10800));
    assert_eq!(report, message);
}

#[tokio::test]
async fn weather_missing_blocks_still_format() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"name": "Kyiv"})),
        )
        .mount(&server)
        .await;

    let outcome = weather_provider(&server).fetch(&WeatherQuery::new("Kyiv")).await;
    assert!(outcome.is_ok());

    let report = format_report("Kyiv", &outcome, Utc::now(), display_zone(10800));
    assert!(report.contains("Температура: 0.00°C (відчувається як 0.00°C)"));
    assert!(report.contains("Часова зона: UTC+00:00"));
}

#[tokio::test]
async fn weather_drifted_field_types_still_format() {
    let server = MockServer::start().await;

    let mut payload = kyiv_payload();
    payload["main"]["humidity"] = serde_json::json!("48");
    payload["wind"]["deg"] = serde_json::json!(null);
    payload["visibility"] = serde_json::json!("far");

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload))
        .mount(&server)
        .await;

    let outcome = weather_provider(&server).fetch(&WeatherQuery::new("Kyiv")).await;
    let obs = outcome.as_ref().expect("drifted fields still decode");
    assert_eq!(obs.visibility_m(), 0.0);
    assert_eq!(obs.wind_deg(), 0.0);

    let report = format_report("Kyiv", &outcome, Utc::now(), display_zone(10800));
    assert!(report.contains("Вологість: 48%"));
    assert!(report.contains("Температура: 18.27°C"));
}

#[tokio::test]
async fn weather_invalid_json_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = weather_provider(&server).fetch(&WeatherQuery::new("Kyiv")).await.unwrap_err();

    assert_eq!(err.reason(), ErrorReason::MalformedResponse);
}

#[tokio::test]
async fn weather_unreachable_server_is_transport_failure() {
    // Nothing listens on port 1.
    let settings =
        OpenWeatherSettings { base_url: "http://127.0.0.1:1".to_string(), ..Default::default() };
    let provider = OpenWeatherProvider::new(Credential::new("OW_KEY"), settings);

    let err = provider.fetch(&WeatherQuery::new("Kyiv")).await.unwrap_err();

    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn weather_factory_without_key_sends_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kyiv_payload()))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.openweather.base_url = server.uri();

    let err = weather_provider_with(&config, |_| None).unwrap_err();

    assert_eq!(err.reason(), ErrorReason::CredentialMissing);
    assert!(err.to_string().contains("OPENWEATHER_API_KEY"));
}

#[tokio::test]
async fn weather_factory_uses_looked_up_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("appid", "OW_FROM_LOOKUP"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kyiv_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.openweather.base_url = server.uri();

    let provider = weather_provider_with(&config, |name| {
        (name == "OPENWEATHER_API_KEY").then(|| "OW_FROM_LOOKUP".to_string())
    })
    .expect("key is present");
    let obs = provider.fetch(&WeatherQuery::new("Kyiv")).await.expect("fetch succeeds");

    assert_eq!(obs.city_name(), "Kyiv");
}

#[tokio::test]
async fn chat_factory_without_key_sends_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_payload()))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = Config::default();
    config.openai.base_url = format!("{}/v1", server.uri());

    let err = chat_provider_with(&config, |_| Some("   ".to_string())).unwrap_err();

    assert_eq!(err.reason(), ErrorReason::CredentialMissing);
    assert!(err.to_string().contains("OPENAI_API_KEY"));
}

// ============================================================================
// Chat completions
// ============================================================================

#[tokio::test]
async fn chat_query_returns_first_choice() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-3.5-turbo",
            "messages": [
                {"role": "system", "content": "You are a helpful assistant."},
                {"role": "user", "content": "What is artificial intelligence?"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let answer = chat_provider(&server)
        .query("What is artificial intelligence?", "gpt-3.5-turbo")
        .await
        .expect("query should succeed");

    assert_eq!(answer, "Artificial intelligence is...");
}

#[tokio::test]
async fn chat_usage_report_computes_cost() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_payload()))
        .mount(&server)
        .await;

    let report = chat_provider(&server)
        .query_with_usage("What is AI?", "gpt-3.5-turbo")
        .await
        .expect("query should succeed");

    assert_eq!(report.prompt_tokens, 25);
    assert_eq!(report.completion_tokens, 113);
    assert_eq!(report.total_tokens, 138);
    assert_eq!(report.model, "gpt-3.5-turbo");
    assert_eq!(report.total_cost_usd, ModelPricing::GPT_35_TURBO.cost_usd(25, 113));
    assert_eq!(format!("{:.6}", report.total_cost_usd), "0.000182");
}

#[tokio::test]
async fn chat_usage_uses_configured_family_pricing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({"model": "gpt-4o-mini-2024-07-18"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_payload()))
        .mount(&server)
        .await;

    let mut pricing = PricingTable::default();
    let mini = ModelPricing { prompt_per_million: 0.15, completion_per_million: 0.6 };
    pricing.set("gpt-4o-mini", mini);
    let settings =
        OpenAiSettings { base_url: format!("{}/v1", server.uri()), pricing, ..Default::default() };
    let provider = OpenAiProvider::new(Credential::new("sk-test"), settings);

    let report = provider
        .query_with_usage("What is AI?", "gpt-4o-mini-2024-07-18")
        .await
        .expect("query should succeed");

    assert_eq!(report.total_cost_usd, mini.cost_usd(25, 113));
}

#[tokio::test]
async fn chat_missing_usage_is_malformed_for_usage_only() {
    let server = MockServer::start().await;

    let mut payload = completion_payload();
    payload.as_object_mut().expect("object payload").remove("usage");

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload))
        .mount(&server)
        .await;

    let provider = chat_provider(&server);

    assert!(provider.query("hi", "gpt-3.5-turbo").await.is_ok());

    let err = provider.query_with_usage("hi", "gpt-3.5-turbo").await.unwrap_err();
    assert_eq!(err.reason(), ErrorReason::MalformedResponse);
}

#[tokio::test]
async fn chat_unauthorized_maps_to_upstream_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
        })))
        .mount(&server)
        .await;

    let err = chat_provider(&server).query("hi", "gpt-3.5-turbo").await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(err.to_string().contains("Incorrect API key"));
}
