use std::fmt;
use std::sync::Arc;

use crate::client::Client;
use crate::config::Config;
use crate::error::{Error, Result};

use super::store::{CredentialStore, TOKEN_KEY};
use super::Token;

/// Reads the current token. Called by the client before every request.
pub type TokenSource = Arc<dyn Fn() -> Result<Option<Token>> + Send + Sync>;

/// Persists a refreshed token, or deletes the stored one when given `None`.
pub type TokenSink = Arc<dyn Fn(Option<&Token>) -> Result<()> + Send + Sync>;

/// Tells a human that the app must be authorized again.
pub trait ReauthorizationNotifier: Send + Sync {
    fn notify(&self, authorization_url: Option<&str>);
}

/// Emits the notice as an error-level log event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl ReauthorizationNotifier for LogNotifier {
    fn notify(&self, authorization_url: Option<&str>) {
        match authorization_url {
            Some(url) => error!(authorization_url = url, "NEED TO REAUTHORIZE XERO: {url}"),
            None => error!("NEED TO REAUTHORIZE XERO: no authorization url is configured"),
        }
    }
}

fn load_from(store: &dyn CredentialStore) -> Result<Option<Token>> {
    store.find(TOKEN_KEY)?.map(Token::from_document).transpose()
}

fn save_to(store: &dyn CredentialStore, token: Option<&Token>) -> Result<()> {
    match token {
        Some(token) => store.replace(TOKEN_KEY, token.to_document()?)?,
        None => store.delete(TOKEN_KEY)?,
    }
    Ok(())
}

/// Owns the stored token's lifecycle and hands out clients wired to it.
#[derive(Clone)]
pub struct TokenManager {
    store: Arc<dyn CredentialStore>,
    config: Config,
    notifier: Arc<dyn ReauthorizationNotifier>,
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    #[must_use]
    pub fn new(config: Config, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            store,
            config,
            notifier: Arc::new(LogNotifier),
        }
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn ReauthorizationNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[instrument(skip(self))]
    pub fn load_token(&self) -> Result<Option<Token>> {
        load_from(self.store.as_ref())
    }

    #[instrument(skip_all, fields(present = token.is_some()))]
    pub fn save_token(&self, token: Option<&Token>) -> Result<()> {
        save_to(self.store.as_ref(), token)
    }

    #[must_use]
    pub fn token_source(&self) -> TokenSource {
        let store = Arc::clone(&self.store);
        Arc::new(move || load_from(store.as_ref()))
    }

    #[must_use]
    pub fn token_sink(&self) -> TokenSink {
        let store = Arc::clone(&self.store);
        Arc::new(move |token: Option<&Token>| save_to(store.as_ref(), token))
    }

    pub fn notify_to_reauthorize(&self) {
        let url = self.config.authorization_url();
        self.notifier.notify(url.as_deref());
    }

    /// Builds a client for the stored token.
    ///
    /// Returns `Ok(None)` after sending one re-authorization notice when nothing is
    /// stored. An expired access token is refreshed before the client is returned.
    #[instrument(skip(self), fields(tenant_id = %self.config.tenant_id))]
    pub async fn initialize_client(&self) -> Result<Option<Client>> {
        let Some(token) = self.load_token()? else {
            warn!("no token is stored, the client is unavailable");
            self.notify_to_reauthorize();
            return Ok(None);
        };

        let client = Client::new(&self.config, self.token_source(), self.token_sink())?;
        if !token.is_access_token_valid() {
            info!(expires_at = ?token.expires_at, "stored access token is expired, refreshing");
            match client.refresh_access_token().await {
                Ok(_) => {}
                Err(e @ Error::ReauthorizationRequired { .. }) => {
                    self.notify_to_reauthorize();
                    return Err(e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(Some(client))
    }
}
