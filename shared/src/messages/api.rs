use serde::{Deserialize, Serialize};

/// Body returned by `POST /api/generate` and `POST /api/config`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AckResponse {
    pub fn accepted() -> Self {
        Self { success: true, ..Self::default() }
    }

    /// Best available explanation for a refused request
    pub fn reason(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "request was not accepted".to_string())
    }
}

/// Error body sent alongside 4xx/5xx responses, e.g. `{"error": "Job already running"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub error: String,
}
