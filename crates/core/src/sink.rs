//! The log sink itself: initialization and the two append operations.
//!
//! Every public operation returns unconditionally. A logging side-effect
//! must never abort the caller's primary flow, so external failures are
//! converted to log lines at this boundary and swallowed. Delivery is
//! at-most-once, best-effort.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::config::SinkConfig;
use crate::credentials::resolve_credentials;
use crate::events::{BookingEvent, ConversationEvent};
use crate::rows::{Target, booking_row, conversation_row};
use crate::sheets::SheetsClient;
use crate::store::{SpreadsheetStore, StoreError};

/// Best-effort sink appending conversation and booking rows to the
/// configured spreadsheet.
///
/// Cheap to clone; clones share the store client and its token cache, so
/// callers may `tokio::spawn` appends for fire-and-forget dispatch. There
/// is no ordering guarantee between in-flight appends.
#[derive(Clone)]
pub struct SheetLogger {
    spreadsheet_id: Option<Arc<str>>,
    store: Option<Arc<dyn SpreadsheetStore>>,
}

impl SheetLogger {
    /// Build the sink from explicit configuration, resolving the credential
    /// secret once. Missing configuration degrades the sink to a no-op.
    pub fn new(config: SinkConfig) -> Self {
        if config.spreadsheet_id.is_none() {
            warn!("No spreadsheet id configured, sheet logging disabled");
        }
        let store = resolve_credentials(config.credential_secret.as_deref())
            .map(|key| Arc::new(SheetsClient::new(key)) as Arc<dyn SpreadsheetStore>);
        Self {
            spreadsheet_id: config.spreadsheet_id.map(Into::into),
            store,
        }
    }

    /// Build the sink over a custom store implementation.
    pub fn with_store(spreadsheet_id: Option<String>, store: Arc<dyn SpreadsheetStore>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.map(Into::into),
            store: Some(store),
        }
    }

    fn target(&self, operation: &str) -> Option<(&str, &Arc<dyn SpreadsheetStore>)> {
        match (self.spreadsheet_id.as_deref(), &self.store) {
            (Some(id), Some(store)) => Some((id, store)),
            _ => {
                warn!(operation, "Sheet logging unconfigured, skipping");
                None
            }
        }
    }

    /// Ensure both sheets exist with their fixed header rows.
    ///
    /// Safe to run repeatedly: an existing sheet is treated as success and
    /// headers are installed by overwriting the first row, so a re-run
    /// produces identical headers rather than duplicates. Headers are
    /// attempted even when sheet creation failed, since the sheet may
    /// pre-exist from an earlier run. Never raises; meant to be invoked
    /// once at startup without awaiting it from request-serving paths.
    pub async fn initialize(&self) {
        let Some((id, store)) = self.target("initialize") else {
            return;
        };
        for target in Target::ALL {
            let sheet = target.sheet_name();
            match store.add_sheet(id, sheet).await {
                Ok(()) => debug!(sheet, "Created sheet"),
                Err(StoreError::SheetExists { .. }) => debug!(sheet, "Sheet already present"),
                Err(err) => {
                    warn!(sheet, error = %err, "Sheet creation failed, still attempting header write")
                }
            }
            log_dropped(
                "header install",
                store
                    .overwrite_row(id, target.header_range(), target.header_row())
                    .await,
            );
        }
    }

    /// Record one conversational exchange. Never raises.
    pub async fn append_conversation(&self, event: ConversationEvent) {
        let Some((id, store)) = self.target("conversation append") else {
            return;
        };
        log_dropped(
            "conversation append",
            store
                .append_row(
                    id,
                    Target::Conversations.append_range(),
                    conversation_row(&event),
                )
                .await,
        );
    }

    /// Record one completed call booking. Never raises.
    pub async fn append_booking(&self, event: BookingEvent) {
        let Some((id, store)) = self.target("booking append") else {
            return;
        };
        log_dropped(
            "booking append",
            store
                .append_row(id, Target::Bookings.append_range(), booking_row(&event))
                .await,
        );
    }
}

/// The single place the no-raise policy lives: failures become an error
/// log line and nothing else.
fn log_dropped(operation: &str, result: Result<(), StoreError>) {
    if let Err(err) = result {
        error!(operation, error = %err, "Sheet write dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{BookingInfo, ContactInfo, LeadScore};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use serde_json::{Value, json};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Append { range: String, row: Vec<Value> },
        Overwrite { range: String, row: Vec<Value> },
        AddSheet { title: String },
    }

    /// Fake store recording every call; optionally fails everything or
    /// reports sheets as pre-existing.
    #[derive(Default)]
    struct RecordingStore {
        calls: Mutex<Vec<Call>>,
        fail_all: bool,
        sheets_exist: bool,
    }

    impl RecordingStore {
        fn failing() -> Self {
            Self {
                fail_all: true,
                ..Default::default()
            }
        }

        fn with_existing_sheets() -> Self {
            Self {
                sheets_exist: true,
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }

        fn maybe_fail(&self) -> Result<(), StoreError> {
            if self.fail_all {
                Err(StoreError::Api {
                    status: 429,
                    message: "Quota exceeded".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl SpreadsheetStore for RecordingStore {
        async fn append_row(
            &self,
            _spreadsheet_id: &str,
            range: &str,
            row: Vec<Value>,
        ) -> Result<(), StoreError> {
            self.record(Call::Append {
                range: range.to_string(),
                row,
            });
            self.maybe_fail()
        }

        async fn overwrite_row(
            &self,
            _spreadsheet_id: &str,
            range: &str,
            row: Vec<Value>,
        ) -> Result<(), StoreError> {
            self.record(Call::Overwrite {
                range: range.to_string(),
                row,
            });
            self.maybe_fail()
        }

        async fn add_sheet(&self, _spreadsheet_id: &str, title: &str) -> Result<(), StoreError> {
            self.record(Call::AddSheet {
                title: title.to_string(),
            });
            if self.sheets_exist {
                return Err(StoreError::SheetExists {
                    title: title.to_string(),
                });
            }
            self.maybe_fail()
        }
    }

    fn sample_booking() -> BookingEvent {
        BookingEvent {
            session_id: "s1".into(),
            contact_info: ContactInfo {
                name: Some("Jane".into()),
                email: Some("j@x.com".into()),
                ..Default::default()
            },
            booking_info: BookingInfo {
                date: Some("2024-05-01".into()),
                time: Some("10:00".into()),
                meeting_type: Some("demo".into()),
            },
            lead_score: LeadScore {
                overall: Some(8.0),
                extra: Default::default(),
            },
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        }
    }

    fn sample_conversation() -> ConversationEvent {
        ConversationEvent {
            session_id: "s1".into(),
            user_message: "hello".into(),
            ai_response: "hi".into(),
            lead_score: LeadScore::default(),
            contact_info: ContactInfo::default(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn unconfigured_spreadsheet_issues_no_calls() {
        let store = Arc::new(RecordingStore::default());
        let logger = SheetLogger::with_store(None, store.clone());

        logger.initialize().await;
        logger.append_conversation(sample_conversation()).await;
        logger.append_booking(sample_booking()).await;

        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_credentials_degrade_to_noop() {
        let logger = SheetLogger::new(SinkConfig {
            spreadsheet_id: Some("sheet-1".into()),
            credential_secret: None,
        });
        logger.initialize().await;
        logger.append_conversation(sample_conversation()).await;
    }

    #[tokio::test]
    async fn booking_append_issues_exactly_one_rpc_with_fixed_row() {
        let store = Arc::new(RecordingStore::default());
        let logger = SheetLogger::with_store(Some("sheet-1".into()), store.clone());

        let event = sample_booking();
        let timestamp = event.timestamp.to_rfc3339();
        logger.append_booking(event).await;

        assert_eq!(
            store.calls(),
            vec![Call::Append {
                range: "Bookings!A:L".into(),
                row: vec![
                    json!(timestamp),
                    json!("s1"),
                    json!("Jane"),
                    json!("j@x.com"),
                    json!(""),
                    json!(""),
                    json!(""),
                    json!("2024-05-01"),
                    json!("10:00"),
                    json!("demo"),
                    json!(8.0),
                    json!("call_booked"),
                ],
            }]
        );
    }

    #[tokio::test]
    async fn conversation_append_targets_conversations_range() {
        let store = Arc::new(RecordingStore::default());
        let logger = SheetLogger::with_store(Some("sheet-1".into()), store.clone());

        logger.append_conversation(sample_conversation()).await;

        let calls = store.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            Call::Append { range, row } => {
                assert_eq!(range, "Conversations!A:H");
                assert_eq!(row.len(), 8);
            }
            other => panic!("unexpected call: {other:?}"),
        }
    }

    #[tokio::test]
    async fn failures_never_reach_the_caller() {
        let store = Arc::new(RecordingStore::failing());
        let logger = SheetLogger::with_store(Some("sheet-1".into()), store.clone());

        logger.initialize().await;
        logger.append_conversation(sample_conversation()).await;
        logger.append_booking(sample_booking()).await;

        // Every operation was attempted despite the store failing each one.
        assert_eq!(store.calls().len(), 6);
    }

    #[tokio::test]
    async fn initialize_creates_sheets_and_overwrites_headers() {
        let store = Arc::new(RecordingStore::default());
        let logger = SheetLogger::with_store(Some("sheet-1".into()), store.clone());

        logger.initialize().await;

        assert_eq!(
            store.calls(),
            vec![
                Call::AddSheet {
                    title: "Conversations".into()
                },
                Call::Overwrite {
                    range: "Conversations!A1:H1".into(),
                    row: Target::Conversations.header_row(),
                },
                Call::AddSheet {
                    title: "Bookings".into()
                },
                Call::Overwrite {
                    range: "Bookings!A1:L1".into(),
                    row: Target::Bookings.header_row(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn initialize_is_idempotent_against_existing_sheets() {
        let store = Arc::new(RecordingStore::with_existing_sheets());
        let logger = SheetLogger::with_store(Some("sheet-1".into()), store.clone());

        logger.initialize().await;
        logger.initialize().await;

        let header_writes: Vec<_> = store
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Overwrite { .. }))
            .collect();
        // Both runs overwrite the same fixed ranges with identical rows.
        assert_eq!(header_writes.len(), 4);
        assert_eq!(header_writes[0], header_writes[2]);
        assert_eq!(header_writes[1], header_writes[3]);
    }
}
