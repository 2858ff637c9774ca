use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Producer-supplied lead qualification, a numeric overall score plus
/// whatever sub-fields the scoring model emits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeadScore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub meeting_type: Option<String>,
}

/// One conversational exchange: what the user said and what the assistant
/// answered, with the scoring snapshot at that point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationEvent {
    pub session_id: String,
    pub user_message: String,
    pub ai_response: String,
    #[serde(default)]
    pub lead_score: LeadScore,
    #[serde(default)]
    pub contact_info: ContactInfo,
    pub timestamp: DateTime<Utc>,
}

/// A completed call booking forwarded by the booking endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingEvent {
    pub session_id: String,
    #[serde(default)]
    pub contact_info: ContactInfo,
    #[serde(default)]
    pub booking_info: BookingInfo,
    #[serde(default)]
    pub lead_score: LeadScore,
    pub timestamp: DateTime<Utc>,
}
