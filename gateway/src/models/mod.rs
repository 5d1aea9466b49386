use serde::{Deserialize, Serialize};

/// Query string of `GET /increment`. `val` stays textual so a missing or
/// malformed value can be reported as a 400 with our own error body.
#[derive(Debug, Default, Deserialize)]
pub struct IncrementQuery {
    pub val: Option<String>,
}

/// Body of a successful `GET /increment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncrementResponse {
    #[serde(rename = "Val")]
    pub val: i64,
}
