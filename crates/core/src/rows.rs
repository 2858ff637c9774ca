//! Fixed sink targets and the pure event-to-row mapping.
//!
//! Rows are ordered tuples of JSON primitives in the shape the spreadsheet
//! API expects. The mapping is total: missing optional sub-fields degrade
//! to `""` or `0`, never to an error.

use serde_json::Value;

use crate::events::{BookingEvent, ConversationEvent, LeadScore};

pub const CONVERSATION_TAG: &str = "conversation";
pub const BOOKING_TAG: &str = "call_booked";

/// The two fixed destinations within the spreadsheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Conversations,
    Bookings,
}

impl Target {
    pub const ALL: [Target; 2] = [Target::Conversations, Target::Bookings];

    pub fn sheet_name(&self) -> &'static str {
        match self {
            Target::Conversations => "Conversations",
            Target::Bookings => "Bookings",
        }
    }

    /// First-row range the header is written to (overwrite, not append).
    pub fn header_range(&self) -> &'static str {
        match self {
            Target::Conversations => "Conversations!A1:H1",
            Target::Bookings => "Bookings!A1:L1",
        }
    }

    /// Column range data rows are appended under.
    pub fn append_range(&self) -> &'static str {
        match self {
            Target::Conversations => "Conversations!A:H",
            Target::Bookings => "Bookings!A:L",
        }
    }

    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            Target::Conversations => &[
                "Timestamp",
                "Session ID",
                "User Message",
                "AI Response",
                "Lead Score",
                "Contact Info",
                "Score",
                "Event Type",
            ],
            Target::Bookings => &[
                "Timestamp",
                "Session ID",
                "Name",
                "Email",
                "Phone",
                "Company",
                "Title",
                "Date",
                "Time",
                "Meeting Type",
                "Lead Score",
                "Event Type",
            ],
        }
    }

    pub fn header_row(&self) -> Vec<Value> {
        self.headers().iter().map(|h| Value::from(*h)).collect()
    }
}

/// Map a conversation event to its 8-column row.
pub fn conversation_row(event: &ConversationEvent) -> Vec<Value> {
    vec![
        Value::from(event.timestamp.to_rfc3339()),
        Value::from(event.session_id.as_str()),
        Value::from(event.user_message.as_str()),
        Value::from(event.ai_response.as_str()),
        Value::from(json_text(&event.lead_score)),
        Value::from(json_text(&event.contact_info)),
        overall_value(&event.lead_score),
        Value::from(CONVERSATION_TAG),
    ]
}

/// Map a booking event to its 12-column row.
pub fn booking_row(event: &BookingEvent) -> Vec<Value> {
    let contact = &event.contact_info;
    vec![
        Value::from(event.timestamp.to_rfc3339()),
        Value::from(event.session_id.as_str()),
        text_or_empty(&contact.name),
        text_or_empty(&contact.email),
        text_or_empty(&contact.phone),
        text_or_empty(&contact.company),
        text_or_empty(&contact.title),
        text_or_empty(&event.booking_info.date),
        text_or_empty(&event.booking_info.time),
        text_or_empty(&event.booking_info.meeting_type),
        overall_value(&event.lead_score),
        Value::from(BOOKING_TAG),
    ]
}

fn text_or_empty(field: &Option<String>) -> Value {
    Value::from(field.as_deref().unwrap_or(""))
}

fn overall_value(score: &LeadScore) -> Value {
    Value::from(score.overall.filter(|v| v.is_finite()).unwrap_or(0.0))
}

fn json_text<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}
