use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::{
    config::OpenWeatherSettings,
    credential::Credential,
    error::ApiError,
    model::{WeatherObservation, WeatherQuery},
};

use super::{WeatherProvider, truncate_body};

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    credential: Credential,
    settings: OpenWeatherSettings,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(credential: Credential, settings: OpenWeatherSettings) -> Self {
        Self { credential, settings, http: Client::new() }
    }

    fn current_weather_url(&self) -> String {
        format!("{}/weather", self.settings.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip(self, query), fields(city = %query.city, units = %query.units))]
    async fn fetch(&self, query: &WeatherQuery) -> Result<WeatherObservation, ApiError> {
        let url = self.current_weather_url();
        debug!(%url, "requesting current weather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", query.city.as_str()),
                ("appid", self.credential.expose()),
                ("units", query.units.as_str()),
                ("lang", query.lang.as_str()),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "OpenWeather returned an error status");
            return Err(ApiError::UpstreamStatus {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        // Shape is not validated beyond JSON decoding; formatting applies defaults.
        let observation: WeatherObservation = serde_json::from_str(&body)?;
        debug!(name = observation.city_name(), "current weather received");

        Ok(observation)
    }
}
