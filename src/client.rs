use core::fmt;
use std::future::Future;

use reqwest::{header, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use time::OffsetDateTime;
use url::Url;

use crate::config::Config;
use crate::endpoints::XeroEndpoint;
use crate::entities::{
    contact::Contact, invoice::Invoice, item::Item, manual_journal::ManualJournal,
    payment::Payment, repeating_invoice::RepeatingInvoice,
};
use crate::error::{Error, Rejection, Result};
use crate::oauth::{self, KeyPair};
use crate::report::{OrganisationsApi, ReportsApi};
use crate::resource::ResourceApi;
use crate::token::{Token, TokenSink, TokenSource};
use crate::utils::date_format;

// Rate limiting headers used by the Xero API
/// Header containing number of remaining daily API calls
const HEADER_DAY_LIMIT_REMAINING: &str = "X-DayLimit-Remaining";
/// Header containing number of remaining per-minute API calls
const HEADER_MIN_LIMIT_REMAINING: &str = "X-MinLimit-Remaining";
/// Header containing number of remaining app-wide per-minute API calls
const HEADER_APP_MIN_LIMIT_REMAINING: &str = "X-AppMinLimit-Remaining";
/// Header identifying which rate limit was hit when a 429 is returned
const HEADER_RATE_LIMIT_PROBLEM: &str = "X-Rate-Limit-Problem";
const HEADER_TENANT_ID: &str = "Xero-tenant-id";
const HEADER_IF_MODIFIED_SINCE: &str = "If-Modified-Since";

/// Information about the remaining API rate limits
///
/// Xero applies several rate limits to API usage:
/// - Daily limit: 5000 calls per day per tenant
/// - Minute limit: 60 calls per minute per tenant
/// - App minute limit: 10,000 calls per minute across all tenants
#[derive(Debug, Clone, Default)]
pub struct RateLimitInfo {
    pub day_limit_remaining: Option<u32>,
    pub minute_limit_remaining: Option<u32>,
    pub app_minute_limit_remaining: Option<u32>,
}

impl RateLimitInfo {
    fn from_response_headers(headers: &header::HeaderMap) -> Self {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u32>().ok())
        };
        Self {
            day_limit_remaining: read(HEADER_DAY_LIMIT_REMAINING),
            minute_limit_remaining: read(HEADER_MIN_LIMIT_REMAINING),
            app_minute_limit_remaining: read(HEADER_APP_MIN_LIMIT_REMAINING),
        }
    }

    /// Returns true if any of the limits are close to being exhausted
    #[must_use]
    pub fn is_near_limit(&self) -> bool {
        self.day_limit_remaining.is_some_and(|v| v < 100)
            || self.minute_limit_remaining.is_some_and(|v| v < 10)
            || self.app_minute_limit_remaining.is_some_and(|v| v < 100)
    }

    fn log_if_near_limit(&self) {
        if self.is_near_limit() {
            warn!(
                day = ?self.day_limit_remaining,
                minute = ?self.minute_limit_remaining,
                app_minute = ?self.app_minute_limit_remaining,
                "approaching Xero API rate limits"
            );
        }
    }
}

/// A request against the accounting API, before authorization is attached.
#[derive(Debug, Clone)]
pub(crate) struct ApiRequest<'a> {
    pub method: Method,
    pub endpoint: XeroEndpoint,
    pub query: Vec<(&'static str, String)>,
    pub modified_since: Option<OffsetDateTime>,
    pub body: Option<&'a Value>,
}

impl<'a> ApiRequest<'a> {
    pub fn new(method: Method, endpoint: XeroEndpoint) -> Self {
        Self {
            method,
            endpoint,
            query: Vec::new(),
            modified_since: None,
            body: None,
        }
    }

    pub fn query(mut self, name: &'static str, value: impl ToString) -> Self {
        self.query.push((name, value.to_string()));
        self
    }

    pub fn modified_since(mut self, since: Option<OffsetDateTime>) -> Self {
        self.modified_since = since;
        self
    }

    pub fn body(mut self, body: &'a Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// The client used for interacting with the Xero accounting API on behalf of one tenant.
///
/// The client never caches credentials: each call reads the current token through its
/// [`TokenSource`], and a refreshed token is written back through its [`TokenSink`],
/// so every process sharing the credential store sees the same token.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    oauth_http: reqwest::Client,
    key_pair: KeyPair,
    token_url: Url,
    api_url: Url,
    tenant_id: String,
    unitdp: Option<u8>,
    token_source: TokenSource,
    token_sink: TokenSink,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_url", &self.api_url.as_str())
            .field("token_url", &self.token_url.as_str())
            .field("tenant_id", &self.tenant_id)
            .field("unitdp", &self.unitdp)
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn new(config: &Config, token_source: TokenSource, token_sink: TokenSink) -> Result<Self> {
        // The token endpoint must not follow redirects (oauth2 SSRF guidance).
        let oauth_http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            oauth_http,
            key_pair: config.key_pair.clone(),
            token_url: config.token_url.clone(),
            api_url: config.api_url.clone(),
            tenant_id: config.tenant_id.clone(),
            unitdp: config.unitdp,
            token_source,
            token_sink,
        })
    }

    #[must_use]
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub(crate) fn unitdp(&self) -> Option<u8> {
        self.unitdp
    }

    fn current_token(&self) -> Result<Token> {
        (self.token_source)()?.ok_or_else(|| Error::ReauthorizationRequired {
            reason: "no token is stored".to_string(),
        })
    }

    /// Exchanges the stored refresh token for a new token and persists it.
    #[instrument(skip(self))]
    pub async fn refresh_access_token(&self) -> Result<Token> {
        let previous = self.current_token()?;
        let token = oauth::refresh(&self.oauth_http, &self.key_pair, &self.token_url, &previous).await?;
        (self.token_sink)(Some(&token))?;
        info!(expires_at = ?token.expires_at, "stored refreshed token");
        Ok(token)
    }

    async fn bearer_token(&self) -> Result<String> {
        let token = self.current_token()?;
        if token.is_access_token_valid() {
            return Ok(token.access_token);
        }
        debug!(expires_at = ?token.expires_at, "access token expired, refreshing");
        Ok(self.refresh_access_token().await?.access_token)
    }

    /// Runs `request_fn` with a valid bearer token. If the API still answers
    /// `401 Unauthorized`, the token is refreshed once and the request re-sent once.
    async fn execute_authorized<T, F, Fut>(&self, request_fn: F) -> Result<T>
    where
        F: Fn(String) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let access_token = self.bearer_token().await?;
        match request_fn(access_token).await {
            Err(Error::Unauthorized { url, .. }) => {
                warn!(%url, "access token rejected, forcing a refresh");
                let token = self.refresh_access_token().await?;
                request_fn(token.access_token).await
            }
            result => result,
        }
    }

    fn build_request(&self, method: Method, url: Url, access_token: &str) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(access_token)
            .header(HEADER_TENANT_ID, &self.tenant_id)
            .header(header::ACCEPT, "application/json")
    }

    /// Sends `request` and decodes the JSON answer into `R`.
    #[instrument(skip(self, request), fields(method = %request.method, endpoint = %request.endpoint))]
    pub(crate) async fn send<R: DeserializeOwned>(&self, request: ApiRequest<'_>) -> Result<R> {
        let url = request.endpoint.to_url(&self.api_url)?;
        let modified_since = request
            .modified_since
            .map(date_format::if_modified_since)
            .transpose()
            .map_err(|e| Error::Configuration {
                name: HEADER_IF_MODIFIED_SINCE,
                reason: e.to_string(),
            })?;
        let (request, url, modified_since) = (&request, &url, modified_since.as_deref());

        self.execute_authorized(|access_token| async move {
            trace!(query = ?request.query, "sending request");
            let mut builder = self
                .build_request(request.method.clone(), url.clone(), &access_token)
                .query(&request.query);
            if let Some(since) = modified_since {
                builder = builder.header(HEADER_IF_MODIFIED_SINCE, since);
            }
            if let Some(body) = request.body {
                builder = builder.json(body);
            }
            let response = builder.send().await?;
            Self::handle_response(response).await
        })
        .await
    }

    #[instrument(skip(response))]
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let url = response.url().to_string();
        let entity_type = std::any::type_name::<T>()
            .rsplit("::")
            .next()
            .unwrap_or("Unknown")
            .to_string();
        debug!(%url, %status, entity_type, "received response");

        let rate_limit_info = RateLimitInfo::from_response_headers(response.headers());
        rate_limit_info.log_if_near_limit();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let rate_limit_problem = response
                .headers()
                .get(HEADER_RATE_LIMIT_PROBLEM)
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .map(std::time::Duration::from_secs);
            warn!(%url, ?rate_limit_problem, ?retry_after, "rate limit exceeded");

            let text = response.text().await.unwrap_or_default();
            return Err(Error::RateLimitExceeded {
                retry_after,
                status_code: status,
                url,
                response_body: Some(text),
            });
        }

        let text = response.text().await?;
        trace!("response text:\n{text}");

        match status {
            s if s.is_success() => {
                // DELETE answers with an empty body.
                let body = if text.trim().is_empty() { "null" } else { text.as_str() };
                serde_json::from_str(body).map_err(|e| {
                    error!(
                        column = e.column(),
                        near = %text.chars().skip(e.column().saturating_sub(30)).take(100).collect::<String>(),
                        "failed to deserialize response: {e}"
                    );
                    Error::DeserializationError(e, Some(text))
                })
            }
            StatusCode::NOT_FOUND => Err(Error::NotFound {
                entity: entity_type,
                url,
                status_code: status,
                response_body: Some(text),
            }),
            StatusCode::BAD_REQUEST => Err(Error::BadRequest(Box::new(Rejection::new(url, text)))),
            StatusCode::UNAUTHORIZED => Err(Error::Unauthorized {
                url,
                response_body: Some(text),
            }),
            StatusCode::FORBIDDEN => Err(Error::Forbidden {
                url,
                response_body: Some(text),
            }),
            _ => {
                error!(%url, "unexpected status code: {status}");
                Err(Error::UnexpectedStatus {
                    status_code: status,
                    url,
                    response_body: Some(text),
                })
            }
        }
    }

    #[must_use]
    pub fn invoices(&self) -> ResourceApi<'_, Invoice> {
        ResourceApi::new(self)
    }

    #[must_use]
    pub fn items(&self) -> ResourceApi<'_, Item> {
        ResourceApi::new(self)
    }

    #[must_use]
    pub fn payments(&self) -> ResourceApi<'_, Payment> {
        ResourceApi::new(self)
    }

    #[must_use]
    pub fn manual_journals(&self) -> ResourceApi<'_, ManualJournal> {
        ResourceApi::new(self)
    }

    #[must_use]
    pub fn repeating_invoices(&self) -> ResourceApi<'_, RepeatingInvoice> {
        ResourceApi::new(self)
    }

    #[must_use]
    pub fn contacts(&self) -> ResourceApi<'_, Contact> {
        ResourceApi::new(self)
    }

    #[must_use]
    pub fn organisations(&self) -> OrganisationsApi<'_> {
        OrganisationsApi::new(self)
    }

    #[must_use]
    pub fn reports(&self) -> ReportsApi<'_> {
        ReportsApi::new(self)
    }
}
