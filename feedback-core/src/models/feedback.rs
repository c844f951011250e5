use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Number;
use uuid::Uuid;

/// A single piece of feedback left through the widget.
///
/// Records are append-only: they are written once by a create call and
/// never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    /// Always non-empty for stored records.
    pub message: String,
    /// Any JSON number, kept exactly as submitted.
    pub rating: Option<Number>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a feedback record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateFeedbackInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: String,
    pub rating: Option<Number>,
}
