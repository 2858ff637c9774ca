pub mod booking;
pub mod config;
pub mod credentials;
pub mod error;
pub mod events;
pub mod rows;
pub mod sheets;
pub mod sink;
pub mod store;

pub use booking::{BookingRequest, IntakeError, accept_booking};
pub use config::SinkConfig;
pub use credentials::{ServiceAccountKey, resolve_credentials};
pub use error::{Result, SinkError};
pub use events::{BookingEvent, BookingInfo, ContactInfo, ConversationEvent, LeadScore};
pub use rows::Target;
pub use sheets::SheetsClient;
pub use sink::SheetLogger;
pub use store::{SpreadsheetStore, StoreError};
