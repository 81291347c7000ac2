//! The persisted OAuth2 token and the machinery that keeps it fresh.

pub mod manager;
pub mod store;

use oauth2::TokenResponse as _;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::{Duration, OffsetDateTime};

use crate::error::Result;
use crate::oauth::TokenResponse;
use crate::utils::date_format::epoch_seconds_option;
use crate::utils::serde_helpers::string_or_list;

pub use manager::{LogNotifier, ReauthorizationNotifier, TokenManager, TokenSink, TokenSource};
pub use store::{
    CredentialStore, Document, FileCredentialStore, MemoryCredentialStore, StoreError, ID_FIELD,
    TOKEN_KEY,
};

/// An access token closer than this to expiry is treated as already expired.
pub const EXPIRY_LEEWAY: Duration = Duration::seconds(60);

fn bearer() -> String {
    "Bearer".to_string()
}

/// The token record as it sits in the credential store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, with = "epoch_seconds_option", skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default = "bearer")]
    pub token_type: String,
    #[serde(default, deserialize_with = "string_or_list", skip_serializing_if = "Vec::is_empty")]
    pub scope: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    /// Fields written by other tools sharing the record, kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Token {
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_at: OffsetDateTime,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at: Some(expires_at),
            expires_in: None,
            token_type: bearer(),
            scope: Vec::new(),
            id_token: None,
            extra: Map::new(),
        }
    }

    /// True when the access token is set and stays valid for longer than [`EXPIRY_LEEWAY`].
    #[must_use]
    pub fn is_access_token_valid(&self) -> bool {
        self.is_access_token_valid_at(OffsetDateTime::now_utc())
    }

    #[must_use]
    pub fn is_access_token_valid_at(&self, now: OffsetDateTime) -> bool {
        match self.expires_at {
            Some(expires_at) => !self.access_token.is_empty() && expires_at - EXPIRY_LEEWAY > now,
            None => false,
        }
    }

    /// The token that replaces this one after a refresh.
    ///
    /// Xero may or may not rotate the refresh token; whatever the response leaves out
    /// is carried over from `self`.
    #[must_use]
    pub fn refreshed(&self, response: &TokenResponse) -> Self {
        let now = OffsetDateTime::now_utc();
        let expires_in = response.expires_in().map(|d| d.as_secs());
        Self {
            access_token: response.access_token().secret().clone(),
            refresh_token: response
                .refresh_token()
                .map(|t| t.secret().clone())
                .or_else(|| self.refresh_token.clone()),
            expires_at: expires_in
                .and_then(|secs| i64::try_from(secs).ok())
                .and_then(|secs| now.checked_add(Duration::seconds(secs))),
            expires_in,
            token_type: self.token_type.clone(),
            scope: response.scope().map_or_else(
                || self.scope.clone(),
                |s| s.split_whitespace().map(str::to_owned).collect(),
            ),
            id_token: response
                .id_token()
                .map(str::to_owned)
                .or_else(|| self.id_token.clone()),
            extra: self.extra.clone(),
        }
    }

    /// Reads a stored record, dropping the store's identity field.
    pub fn from_document(mut document: Document) -> Result<Self> {
        document.remove(ID_FIELD);
        Ok(serde_json::from_value(Value::Object(document))?)
    }

    pub fn to_document(&self) -> Result<Document> {
        Ok(serde_json::from_value(serde_json::to_value(self)?)?)
    }
}
