//! HTTP API response DTOs.

use serde::Deserialize;

use super::string_or_number;

/// `GET /threads/<id>/`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ThreadResponse {
    #[serde(deserialize_with = "string_or_number::required")]
    pub id: String,
    #[serde(default)]
    pub participants: Vec<ParticipantResponse>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParticipantResponse {
    #[serde(deserialize_with = "string_or_number::required")]
    pub id: String,
    pub username: String,
}

/// `POST /threads/<id>/connection-token/`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}
