//! Validation step shared with the booking endpoint.
//!
//! The endpoint rejects incomplete requests with a client error before the
//! sink is ever called; a request that passes validation becomes a
//! [`BookingEvent`] carrying the fixed booking lead score.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::{BookingEvent, BookingInfo, ContactInfo, LeadScore};

/// Every completed booking is recorded with this overall score.
pub const FIXED_BOOKING_SCORE: f64 = 8.0;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum IntakeError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

/// A booking request as received by the endpoint, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingRequest {
    pub session_id: String,
    #[serde(default)]
    pub contact_info: ContactInfo,
    #[serde(default)]
    pub booking_info: BookingInfo,
}

/// Validate a booking request and turn it into a loggable event.
///
/// Requires contact name, contact email, booking date and booking time to
/// be present and non-empty.
pub fn accept_booking(
    request: BookingRequest,
    now: DateTime<Utc>,
) -> Result<BookingEvent, IntakeError> {
    require(&request.contact_info.name, "contactInfo.name")?;
    require(&request.contact_info.email, "contactInfo.email")?;
    require(&request.booking_info.date, "bookingInfo.date")?;
    require(&request.booking_info.time, "bookingInfo.time")?;

    Ok(BookingEvent {
        session_id: request.session_id,
        contact_info: request.contact_info,
        booking_info: request.booking_info,
        lead_score: LeadScore {
            overall: Some(FIXED_BOOKING_SCORE),
            extra: Default::default(),
        },
        timestamp: now,
    })
}

fn require(field: &Option<String>, name: &'static str) -> Result<(), IntakeError> {
    match field {
        Some(value) if !value.trim().is_empty() => Ok(()),
        _ => Err(IntakeError::MissingField(name)),
    }
}
