//! Google Sheets v4 REST implementation of [`SpreadsheetStore`].
//!
//! Authenticates with the OAuth2 JWT-bearer grant: an RS256-signed
//! assertion built from the service-account key is exchanged at the key's
//! token endpoint for a short-lived bearer token, cached until shortly
//! before expiry. Token refresh is the auth layer's concern; callers just
//! share one client.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tracing::debug;

use crate::credentials::ServiceAccountKey;
use crate::store::{SpreadsheetStore, StoreError};

const SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const TOKEN_LIFETIME_SECS: i64 = 3600;
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    TOKEN_LIFETIME_SECS
}

struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// REST client for the hosted spreadsheet service.
pub struct SheetsClient {
    http: reqwest::Client,
    key: ServiceAccountKey,
    token: Mutex<Option<CachedToken>>,
}

impl SheetsClient {
    pub fn new(key: ServiceAccountKey) -> Self {
        Self {
            http: reqwest::Client::new(),
            key,
            token: Mutex::new(None),
        }
    }

    async fn bearer_token(&self) -> Result<String, StoreError> {
        let mut cached = self.token.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref() {
            if token.is_fresh(now) {
                return Ok(token.access_token.clone());
            }
        }

        let token = self.exchange_assertion(now).await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    async fn exchange_assertion(&self, now: DateTime<Utc>) -> Result<CachedToken, StoreError> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + TOKEN_LIFETIME_SECS,
        };
        let signing_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &signing_key)?;

        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Auth {
                reason: format!("token endpoint returned {status}: {message}"),
            });
        }

        let token: TokenResponse = response.json().await?;
        debug!("Obtained spreadsheet access token");
        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}

#[async_trait]
impl SpreadsheetStore for SheetsClient {
    async fn append_row(
        &self,
        spreadsheet_id: &str,
        range: &str,
        row: Vec<Value>,
    ) -> Result<(), StoreError> {
        let token = self.bearer_token().await?;
        let url = format!("{SHEETS_ENDPOINT}/{spreadsheet_id}/values/{range}:append");
        let response = self
            .http
            .post(&url)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .bearer_auth(&token)
            .json(&json!({ "values": [row] }))
            .send()
            .await?;
        expect_success(response).await
    }

    async fn overwrite_row(
        &self,
        spreadsheet_id: &str,
        range: &str,
        row: Vec<Value>,
    ) -> Result<(), StoreError> {
        let token = self.bearer_token().await?;
        let url = format!("{SHEETS_ENDPOINT}/{spreadsheet_id}/values/{range}");
        let response = self
            .http
            .put(&url)
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(&token)
            .json(&json!({ "range": range, "values": [row] }))
            .send()
            .await?;
        expect_success(response).await
    }

    async fn add_sheet(&self, spreadsheet_id: &str, title: &str) -> Result<(), StoreError> {
        let token = self.bearer_token().await?;
        let url = format!("{SHEETS_ENDPOINT}/{spreadsheet_id}:batchUpdate");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&json!({
                "requests": [{ "addSheet": { "properties": { "title": title } } }]
            }))
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }
        let status = response.status().as_u16();
        let message = read_error_message(response).await;
        Err(classify_add_sheet_failure(status, message, title))
    }
}

async fn expect_success(response: reqwest::Response) -> Result<(), StoreError> {
    if response.status().is_success() {
        return Ok(());
    }
    let status = response.status().as_u16();
    let message = read_error_message(response).await;
    Err(StoreError::Api { status, message })
}

/// Pull the human-readable message out of a Sheets error body, falling back
/// to the raw text.
async fn read_error_message(response: reqwest::Response) -> String {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|body| {
            body.get("error")?
                .get("message")?
                .as_str()
                .map(str::to_string)
        })
        .unwrap_or(text)
}

fn classify_add_sheet_failure(status: u16, message: String, title: &str) -> StoreError {
    // The service reports a duplicate sheet as a plain 400 with a message
    // like: A sheet with the name "Bookings" already exists.
    if status == 400 && message.contains("already exists") {
        StoreError::SheetExists {
            title: title.to_string(),
        }
    } else {
        StoreError::Api { status, message }
    }
}
