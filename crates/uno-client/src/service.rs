//! Game service client.

use crate::config::ClientConfig;
use crate::protocol::{DrawRequest, ErrorBody, PlayRequest, StartResponse};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uno_core::{Color, GameSnapshot, ServiceError, LOCAL_SEAT_ID};
use uuid::Uuid;

/// The remote game service. It owns the deck, validates every move and
/// computes automated seats' moves.
#[async_trait]
pub trait GameService: Send + Sync {
    async fn start(&self) -> Result<Uuid, ServiceError>;

    async fn get_state(&self, game: Uuid) -> Result<GameSnapshot, ServiceError>;

    async fn play(
        &self,
        game: Uuid,
        card_indices: Vec<usize>,
        declared_color: Option<Color>,
    ) -> Result<GameSnapshot, ServiceError>;

    async fn draw(&self, game: Uuid) -> Result<GameSnapshot, ServiceError>;

    async fn process_automated_turn(&self, game: Uuid) -> Result<GameSnapshot, ServiceError>;
}

/// JSON-over-HTTP implementation
pub struct HttpGameService {
    client: Client,
    base_url: String,
}

impl HttpGameService {
    pub fn new(config: &ClientConfig) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: config.service_url.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.json::<ErrorBody>().await.unwrap_or_default();
            warn!(%status, reason = ?body.message, "Service rejected request");
            return Err(ServiceError::Rejected {
                reason: body.message,
            });
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

fn transport(err: reqwest::Error) -> ServiceError {
    ServiceError::Transport(err.to_string())
}

#[async_trait]
impl GameService for HttpGameService {
    async fn start(&self) -> Result<Uuid, ServiceError> {
        let response = self
            .client
            .post(self.url("/start"))
            .send()
            .await
            .map_err(transport)?;
        let reply: StartResponse = Self::decode(response).await?;
        debug!(game = %reply.game_id, "Game started");
        Ok(reply.game_id)
    }

    async fn get_state(&self, game: Uuid) -> Result<GameSnapshot, ServiceError> {
        let response = self
            .client
            .get(self.url(&format!("/{}/state", game)))
            .send()
            .await
            .map_err(transport)?;
        Self::decode(response).await
    }

    async fn play(
        &self,
        game: Uuid,
        card_indices: Vec<usize>,
        declared_color: Option<Color>,
    ) -> Result<GameSnapshot, ServiceError> {
        let body = PlayRequest {
            player_id: LOCAL_SEAT_ID.to_string(),
            card_indices,
            declared_color,
        };
        let response = self
            .client
            .post(self.url(&format!("/{}/actions/play", game)))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        Self::decode(response).await
    }

    async fn draw(&self, game: Uuid) -> Result<GameSnapshot, ServiceError> {
        let body = DrawRequest {
            player_id: LOCAL_SEAT_ID.to_string(),
        };
        let response = self
            .client
            .post(self.url(&format!("/{}/actions/draw", game)))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        Self::decode(response).await
    }

    async fn process_automated_turn(&self, game: Uuid) -> Result<GameSnapshot, ServiceError> {
        let response = self
            .client
            .post(self.url(&format!("/{}/actions/cpu-turn", game)))
            .send()
            .await
            .map_err(transport)?;
        Self::decode(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        let config = ClientConfig {
            service_url: "http://table:8080/api/games".to_string(),
            ..ClientConfig::default()
        };
        let service = HttpGameService::new(&config).unwrap();
        let game = Uuid::nil();

        assert_eq!(service.url("/start"), "http://table:8080/api/games/start");
        assert_eq!(
            service.url(&format!("/{}/actions/cpu-turn", game)),
            "http://table:8080/api/games/00000000-0000-0000-0000-000000000000/actions/cpu-turn"
        );
    }
}
