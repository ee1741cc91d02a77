use serde::{Deserialize, Serialize};

/// Body of `POST /get-answer`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AskRequest {
    pub query: String,
}

/// Body returned by `POST /get-answer`.
///
/// The backend sends `null` for `top_anchor_id` and `score` when it found no
/// relevant section, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AskResponse {
    pub answer: Option<String>,
    pub top_anchor_id: Option<String>,
    pub score: Option<f64>,
}

/// Body returned by `GET /ingest-data`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IngestResponse {
    pub message: Option<String>,
}
