use std::fmt;
use std::time::Duration;

use miette::Diagnostic;
use oauth2::HttpClientError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_error::SpanTrace;

use crate::token::store::StoreError;

/// Error body returned by the OAuth2 token endpoint, e.g. `{"error": "invalid_grant"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuth2ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl oauth2::ErrorResponse for OAuth2ErrorResponse {}

impl fmt::Display for OAuth2ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error_description {
            Some(description) => write!(f, "{}: {description}", self.error),
            None => write!(f, "{}", self.error),
        }
    }
}

pub type OAuth2RequestError =
    oauth2::RequestTokenError<HttpClientError<reqwest::Error>, OAuth2ErrorResponse>;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "Type")]
#[allow(clippy::module_name_repetitions)]
pub enum ErrorType {
    ValidationException {
        #[serde(default, rename = "Elements")]
        elements: Vec<ValidationExceptionElement>,
    },
    PostDataInvalidException,
    QueryParseException,
    ObjectNotFoundException,
    OrganisationOfflineException,
    UnauthorisedException,
    NoDataProcessedException,
    UnsupportedMediaTypeException,
    MethodNotAllowedException,
    InternalServerException,
    NotImplementedException,
    NotAvailableException,
    RateLimitExceededException,
    SystemUnavailableException,
    #[serde(other)]
    Other,
}

impl ErrorType {
    fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ValidationException { .. } => Some("One or more submitted objects failed validation"),
            Self::PostDataInvalidException => Some("The request body could not be read"),
            Self::QueryParseException => Some("The query string could not be parsed"),
            Self::ObjectNotFoundException => Some("The referenced object does not exist"),
            Self::OrganisationOfflineException => Some("The organisation is temporarily offline"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[allow(clippy::module_name_repetitions)]
pub struct ValidationError {
    pub message: String,
}

/// One rejected object inside a `ValidationException`. The object itself is kept as
/// raw JSON since it can be any entity type.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ValidationExceptionElement {
    #[serde(default)]
    pub validation_errors: Vec<ValidationError>,
    #[serde(flatten)]
    pub object: serde_json::Map<String, serde_json::Value>,
}

/// The error document Xero sends back with a `400 Bad Request`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Response {
    #[serde(default)]
    pub error_number: u64,
    #[serde(default)]
    pub message: String,
    #[serde(flatten)]
    pub error: ErrorType,
}

impl Response {
    /// Every validation message carried by the response, in document order.
    #[must_use]
    pub fn validation_messages(&self) -> Vec<&str> {
        match &self.error {
            ErrorType::ValidationException { elements } => elements
                .iter()
                .flat_map(|element| element.validation_errors.iter())
                .map(|error| error.message.as_str())
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Xero API Error ({}): {}", self.error_number, self.message)?;
        if let Some(hint) = self.error.hint() {
            write!(f, " ({hint})")?;
        }
        for message in self.validation_messages() {
            write!(f, "\n  - {message}")?;
        }
        Ok(())
    }
}

/// A request the API refused as malformed or invalid.
#[derive(Debug)]
pub struct Rejection {
    pub url: String,
    /// Parsed error document, when the body was one.
    pub response: Option<Response>,
    pub response_body: String,
    pub span_trace: SpanTrace,
}

impl Rejection {
    #[must_use]
    pub fn new(url: impl Into<String>, response_body: String) -> Self {
        Self {
            url: url.into(),
            response: serde_json::from_str(&response_body).ok(),
            response_body,
            span_trace: SpanTrace::capture(),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.response {
            Some(response) => write!(f, "{response} (url: {})", self.url),
            None => write!(f, "bad request: {} (url: {})", self.response_body, self.url),
        }
    }
}

/// Errors that can occur when interacting with the Xero API.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("error making request: {0:?}")]
    #[diagnostic(
        code(xero_adapter::request_error),
        help("Check your network connection and Xero API availability")
    )]
    Request(#[source] reqwest::Error),

    #[error("error decoding response: {0:?}")]
    #[diagnostic(
        code(xero_adapter::deserialization_error),
        help("The API returned data in an unexpected format")
    )]
    DeserializationError(#[source] serde_json::Error, Option<String>),

    #[error("object not found: {entity} (url: {url})")]
    #[diagnostic(
        code(xero_adapter::not_found),
        help("Verify that the {entity} exists and that you have permission to access it")
    )]
    NotFound {
        entity: String,
        url: String,
        status_code: reqwest::StatusCode,
        response_body: Option<String>,
    },

    #[error("endpoint could not be parsed as a URL")]
    #[diagnostic(
        code(xero_adapter::invalid_endpoint),
        help("Check that the API endpoint URL is correctly formatted")
    )]
    InvalidEndpoint,

    /// The API rejected the request as invalid, such as a `ValidationException`.
    #[error("request rejected: {0}")]
    #[diagnostic(
        code(xero_adapter::bad_request),
        help("Review the validation errors returned by the Xero API")
    )]
    BadRequest(Box<Rejection>),

    /// The bearer token was not accepted.
    #[error("unauthorized (url: {url})")]
    #[diagnostic(
        code(xero_adapter::unauthorized),
        help("The access token was rejected; it will be refreshed from the stored refresh token")
    )]
    Unauthorized {
        url: String,
        response_body: Option<String>,
    },

    #[error("forbidden (url: {url})")]
    #[diagnostic(
        code(xero_adapter::forbidden),
        help("Check the granted scopes and the tenant identifier")
    )]
    Forbidden {
        url: String,
        response_body: Option<String>,
    },

    /// Rate limit exceeded (HTTP 429 Too Many Requests)
    #[error("rate limit exceeded: retry after {retry_after:?}")]
    #[diagnostic(
        code(xero_adapter::rate_limit_exceeded),
        help("The Xero API rate limit has been exceeded. Wait and retry, or throttle requests.")
    )]
    RateLimitExceeded {
        retry_after: Option<Duration>,
        status_code: reqwest::StatusCode,
        url: String,
        response_body: Option<String>,
    },

    #[error("unexpected status {status_code} (url: {url})")]
    #[diagnostic(code(xero_adapter::unexpected_status))]
    UnexpectedStatus {
        status_code: reqwest::StatusCode,
        url: String,
        response_body: Option<String>,
    },

    /// A transport-level failure talking to the token endpoint. Safe to retry.
    #[error("oauth2 error: {0:?}")]
    #[diagnostic(
        code(xero_adapter::oauth2_error),
        help("Verify your OAuth2 configuration and credentials")
    )]
    OAuth2(OAuth2RequestError),

    /// The stored credentials cannot be refreshed; a human must authorize the app again.
    #[error("xero needs to be reauthorized: {reason}")]
    #[diagnostic(
        code(xero_adapter::reauthorization_required),
        help("Complete the OAuth2 authorization flow again so a new token is stored")
    )]
    ReauthorizationRequired { reason: String },

    /// No token was on file when the adapter was constructed.
    #[error("xero client is unavailable because no token is stored")]
    #[diagnostic(
        code(xero_adapter::client_unavailable),
        help("Authorize the app and store a token, then construct the adapter again")
    )]
    ClientUnavailable,

    #[error("{operation} is not supported for {entity}")]
    #[diagnostic(code(xero_adapter::unsupported))]
    Unsupported {
        operation: &'static str,
        entity: &'static str,
    },

    #[error("credential store error: {0}")]
    #[diagnostic(code(xero_adapter::credential_store))]
    CredentialStore(#[from] StoreError),

    #[error("invalid configuration for {name}: {reason}")]
    #[diagnostic(
        code(xero_adapter::configuration),
        help("Check the XERO_* environment variables")
    )]
    Configuration { name: &'static str, reason: String },
}

impl Error {
    /// The span trace captured when a request was rejected.
    #[must_use]
    pub fn span_trace(&self) -> Option<&SpanTrace> {
        match self {
            Self::BadRequest(rejection) => Some(&rejection.span_trace),
            _ => None,
        }
    }

    /// True when only a human completing the authorization flow can fix this.
    #[must_use]
    pub fn needs_reauthorization(&self) -> bool {
        matches!(self, Self::ReauthorizationRequired { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::DeserializationError(e, None)
    }
}

impl From<OAuth2RequestError> for Error {
    fn from(e: OAuth2RequestError) -> Self {
        match e {
            oauth2::RequestTokenError::ServerResponse(response) => Self::ReauthorizationRequired {
                reason: response.to_string(),
            },
            other => Self::OAuth2(other),
        }
    }
}

/// Type alias for results from this crate.
///
/// This is already a Miette diagnostic result due to the implementation of
/// the Diagnostic trait for the Error type.
pub type Result<O> = std::result::Result<O, Error>;
