//! HTTP protocol messages for the UNO game service.

use serde::{Deserialize, Serialize};
use uno_core::Color;
use uuid::Uuid;

/// Reply to `POST /start`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub game_id: Uuid,
}

/// Body of `POST /{id}/actions/play`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayRequest {
    pub player_id: String,
    /// Clicked card first, companions after it
    pub card_indices: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_color: Option<Color>,
}

/// Body of `POST /{id}/actions/draw`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawRequest {
    pub player_id: String,
}

/// Error body the service sends with a non-success status
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_request_shape() {
        let body = PlayRequest {
            player_id: "0".to_string(),
            card_indices: vec![2, 0],
            declared_color: Some(Color::Green),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"playerId": "0", "cardIndices": [2, 0], "declaredColor": "GREEN"})
        );
    }

    #[test]
    fn test_play_request_omits_missing_color() {
        let body = PlayRequest {
            player_id: "0".to_string(),
            card_indices: vec![1],
            declared_color: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("declaredColor").is_none());
    }

    #[test]
    fn test_start_response() {
        let reply: StartResponse =
            serde_json::from_str(r#"{"gameId":"6f1c1d3e-2b9a-4c55-9a59-0f7d7a1c2b3d"}"#).unwrap();
        assert_eq!(
            reply.game_id.to_string(),
            "6f1c1d3e-2b9a-4c55-9a59-0f7d7a1c2b3d"
        );
    }

    #[test]
    fn test_error_body_tolerates_other_fields() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"status":400,"error":"Bad Request"}"#).unwrap();
        assert!(body.message.is_none());

        let body: ErrorBody = serde_json::from_str(r#"{"message":"Not your turn"}"#).unwrap();
        assert_eq!(body.message.as_deref(), Some("Not your turn"));
    }
}
