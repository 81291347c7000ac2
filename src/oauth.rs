use std::time::Duration;

use oauth2::{
    AuthUrl, CsrfToken, EndpointNotSet, EndpointSet, RedirectUrl, RefreshToken,
    StandardRevocableToken, TokenResponse as _, TokenUrl,
    basic::{BasicTokenIntrospectionResponse, BasicTokenType},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{self, Error, Result};
use crate::scope::Scope;
use crate::token::Token;

pub const XERO_AUTH_URL: &str = "https://login.xero.com/identity/connect/authorize";
pub const XERO_TOKEN_URL: &str = "https://identity.xero.com/connect/token";

/// Stores the OAuth 2 client ID and client secret.
#[derive(Debug, Clone)]
pub struct KeyPair(
    pub(crate) oauth2::ClientId,
    pub(crate) Option<oauth2::ClientSecret>,
);

impl KeyPair {
    /// Creates a new `KeyPair` from the provided `client_id` and `client_secret` strings.
    #[must_use]
    pub fn new(client_id: String, client_secret: Option<String>) -> Self {
        Self(
            oauth2::ClientId::new(client_id),
            client_secret.map(oauth2::ClientSecret::new),
        )
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        self.0.as_str()
    }
}

/// An oauth2 client that can only talk to the token endpoint.
pub type OAuthClient = oauth2::Client<
    error::OAuth2ErrorResponse,
    TokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    error::OAuth2ErrorResponse,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

type AuthorizeClient = oauth2::Client<
    error::OAuth2ErrorResponse,
    TokenResponse,
    BasicTokenIntrospectionResponse,
    StandardRevocableToken,
    error::OAuth2ErrorResponse,
    EndpointSet,
>;

/// Xero's token endpoint response. `scope` comes back as one space-separated string.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    access_token: oauth2::AccessToken,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_in: Option<u64>,
    token_type: BasicTokenType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<RefreshToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
}

impl TokenResponse {
    #[must_use]
    pub fn id_token(&self) -> Option<&str> {
        self.id_token.as_deref()
    }

    #[must_use]
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }
}

impl oauth2::TokenResponse for TokenResponse {
    type TokenType = BasicTokenType;

    fn access_token(&self) -> &oauth2::AccessToken {
        &self.access_token
    }

    fn token_type(&self) -> &BasicTokenType {
        &self.token_type
    }

    fn expires_in(&self) -> Option<Duration> {
        self.expires_in.map(Duration::from_secs)
    }

    fn refresh_token(&self) -> Option<&RefreshToken> {
        self.refresh_token.as_ref()
    }

    fn scopes(&self) -> Option<&Vec<oauth2::Scope>> {
        None
    }
}

pub(crate) fn oauth_client(key_pair: &KeyPair, token_url: &Url) -> OAuthClient {
    let client = oauth2::Client::new(key_pair.0.clone()).set_token_uri(TokenUrl::from_url(token_url.clone()));
    match &key_pair.1 {
        Some(secret) => client.set_client_secret(secret.clone()),
        None => client,
    }
}

/// Builds the URL a human opens to grant the app access again.
pub fn authorize_url(key_pair: &KeyPair, redirect_url: &Url, scope: &Scope) -> Result<Url> {
    let auth_url = AuthUrl::new(XERO_AUTH_URL.to_string()).map_err(|_| Error::InvalidEndpoint)?;
    let client: AuthorizeClient = oauth2::Client::new(key_pair.0.clone())
        .set_auth_uri(auth_url)
        .set_redirect_uri(RedirectUrl::from_url(redirect_url.clone()));
    let (url, _csrf) = client
        .authorize_url(CsrfToken::new_random)
        .add_scopes(scope.as_oauth2_scopes().iter().cloned())
        .url();
    Ok(url)
}

/// Exchanges the refresh token in `previous` for a new token.
///
/// A rejection from the token endpoint (`invalid_grant` and friends) means the grant
/// is gone and maps to [`Error::ReauthorizationRequired`]; transport failures stay
/// [`Error::OAuth2`].
#[instrument(skip_all, fields(token_url = %token_url))]
pub(crate) async fn refresh(
    http: &reqwest::Client,
    key_pair: &KeyPair,
    token_url: &Url,
    previous: &Token,
) -> Result<Token> {
    let Some(refresh_token) = previous.refresh_token.as_deref() else {
        return Err(Error::ReauthorizationRequired {
            reason: "stored token has no refresh token".to_string(),
        });
    };

    let response = oauth_client(key_pair, token_url)
        .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
        .request_async(http)
        .await?;

    debug!(
        expires_in = ?response.expires_in(),
        rotated = response.refresh_token().is_some(),
        "refreshed access token"
    );
    Ok(previous.refreshed(&response))
}
