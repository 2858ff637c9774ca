use serde::{Deserialize, Serialize};

/// Environment variable carrying the target spreadsheet id.
pub const SPREADSHEET_ID_VAR: &str = "SHEETLOG_SPREADSHEET_ID";

/// Environment variable carrying the service-account secret, either raw
/// JSON or base64-wrapped JSON.
pub const SERVICE_ACCOUNT_KEY_VAR: &str = "GOOGLE_SERVICE_ACCOUNT_KEY";

/// Configuration for the log sink.
///
/// Both fields are optional: a missing spreadsheet id or secret degrades the
/// sink to a no-op rather than failing construction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SinkConfig {
    pub spreadsheet_id: Option<String>,
    pub credential_secret: Option<String>,
}

impl SinkConfig {
    /// Read configuration from the process environment.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_env() -> Self {
        Self {
            spreadsheet_id: non_empty_var(SPREADSHEET_ID_VAR),
            credential_secret: non_empty_var(SERVICE_ACCOUNT_KEY_VAR),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
