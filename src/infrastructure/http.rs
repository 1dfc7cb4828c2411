use gloo_net::http::Request;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::domain::{
    errors::{AppError, NetworkResult},
    histogram::PeerPrediction,
    logging::{LogComponent, get_logger},
    market_data::PriceSample,
};

/// HTTP клиент для игрового REST API
#[derive(Debug, Clone, Default)]
pub struct GameHttpClient {
    config: ApiConfig,
}

/// Wire shape of one history point; `time` may arrive fractional.
#[derive(Debug, Deserialize)]
struct HistoryTick {
    time: f64,
    price: f64,
}

impl GameHttpClient {
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> NetworkResult<T> {
        let response = Request::get(url)
            .send()
            .await
            .map_err(|e| AppError::NetworkError(format!("request to {url} failed: {e:?}")))?;

        if !response.ok() {
            return Err(AppError::NetworkError(format!(
                "HTTP error: {} - {}",
                response.status(),
                response.status_text()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AppError::DecodeError(format!("bad body from {url}: {e:?}")))
    }

    /// Последние ~5 минут цены по активу, отсортированные по времени
    pub async fn fetch_price_history(&self, asset: &str) -> NetworkResult<Vec<PriceSample>> {
        let url = self.config.price_history_url(asset);
        let ticks: Vec<HistoryTick> = self.get_json(&url).await?;

        let mut samples: Vec<PriceSample> = ticks
            .into_iter()
            .filter(|t| t.time.is_finite() && t.price.is_finite())
            .map(|t| PriceSample::new(t.time.floor() as i64, t.price))
            .collect();
        samples.sort_by_key(|s| s.time);

        get_logger().info(
            LogComponent::Infrastructure("GameHttp"),
            &format!("📈 loaded {} history samples for {}", samples.len(), asset),
        );
        Ok(samples)
    }

    /// Прогнозы всех игроков (вход для гистограммы)
    pub async fn fetch_peer_predictions(&self, game_id: &str) -> NetworkResult<Vec<PeerPrediction>> {
        self.get_json(&self.config.game_predictions_url(game_id)).await
    }
}
