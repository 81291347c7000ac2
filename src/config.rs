//! Adapter configuration, normally read from `XERO_*` environment variables.

use url::Url;

use crate::endpoints::BASE_URL;
use crate::error::{Error, Result};
use crate::oauth::{self, KeyPair, XERO_TOKEN_URL};
use crate::scope::Scope;

pub const ENV_CLIENT_ID: &str = "XERO_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "XERO_CLIENT_SECRET";
pub const ENV_SCOPES: &str = "XERO_SCOPES";
pub const ENV_TENANT_ID: &str = "XERO_TENANT_ID";
pub const ENV_OAUTH2_URL: &str = "XERO_OAUTH2_URL";
pub const ENV_REDIRECT_URL: &str = "XERO_REDIRECT_URL";
pub const ENV_API_URL: &str = "XERO_API_URL";
pub const ENV_TOKEN_URL: &str = "XERO_TOKEN_URL";

/// Decimal places requested for unit amounts on invoices and items.
pub const DEFAULT_UNITDP: u8 = 4;

#[derive(Debug, Clone)]
pub struct Config {
    pub key_pair: KeyPair,
    pub scopes: Scope,
    /// Organisation every call is made against, sent as `Xero-tenant-id`.
    pub tenant_id: String,
    /// The URL announced when a human has to authorize the app again.
    pub reauthorization_url: Option<String>,
    /// Used to build an authorization URL when `reauthorization_url` is unset.
    pub redirect_url: Option<Url>,
    pub api_url: Url,
    pub token_url: Url,
    pub unitdp: Option<u8>,
}

impl Config {
    /// Configuration pointing at Xero production with the default accounting scopes.
    pub fn new(key_pair: KeyPair, tenant_id: impl Into<String>) -> Result<Self> {
        Ok(Self {
            key_pair,
            scopes: Scope::accounting_defaults(),
            tenant_id: tenant_id.into(),
            reauthorization_url: None,
            redirect_url: None,
            api_url: parse_url(ENV_API_URL, BASE_URL)?,
            token_url: parse_url(ENV_TOKEN_URL, XERO_TOKEN_URL)?,
            unitdp: Some(DEFAULT_UNITDP),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to its value.
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let required = |name: &'static str| {
            get(name).ok_or_else(|| Error::Configuration {
                name,
                reason: "not set".to_string(),
            })
        };

        let key_pair = KeyPair::new(required(ENV_CLIENT_ID)?, get(ENV_CLIENT_SECRET));
        let mut config = Self::new(key_pair, required(ENV_TENANT_ID)?)?;

        if let Some(scopes) = get(ENV_SCOPES) {
            config.scopes = Scope::from_list(&scopes);
        }
        config.reauthorization_url = get(ENV_OAUTH2_URL);
        if let Some(redirect) = get(ENV_REDIRECT_URL) {
            config.redirect_url = Some(parse_url(ENV_REDIRECT_URL, &redirect)?);
        }
        if let Some(api_url) = get(ENV_API_URL) {
            config = config.with_api_url(parse_url(ENV_API_URL, &api_url)?);
        }
        if let Some(token_url) = get(ENV_TOKEN_URL) {
            config.token_url = parse_url(ENV_TOKEN_URL, &token_url)?;
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_scopes(mut self, scopes: Scope) -> Self {
        self.scopes = scopes;
        self
    }

    #[must_use]
    pub fn with_reauthorization_url(mut self, url: impl Into<String>) -> Self {
        self.reauthorization_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_redirect_url(mut self, url: Url) -> Self {
        self.redirect_url = Some(url);
        self
    }

    /// Points the client at another API root. A trailing slash is added if missing so
    /// that collection paths join underneath it.
    #[must_use]
    pub fn with_api_url(mut self, mut url: Url) -> Self {
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.api_url = url;
        self
    }

    #[must_use]
    pub fn with_token_url(mut self, url: Url) -> Self {
        self.token_url = url;
        self
    }

    #[must_use]
    pub fn with_unitdp(mut self, unitdp: Option<u8>) -> Self {
        self.unitdp = unitdp;
        self
    }

    /// The URL to send a human to when the stored grant can no longer be refreshed.
    #[must_use]
    pub fn authorization_url(&self) -> Option<String> {
        if let Some(url) = &self.reauthorization_url {
            return Some(url.clone());
        }
        let redirect = self.redirect_url.as_ref()?;
        match oauth::authorize_url(&self.key_pair, redirect, &self.scopes) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                warn!("could not build an authorization url: {e}");
                None
            }
        }
    }
}

fn parse_url(name: &'static str, value: &str) -> Result<Url> {
    Url::parse(value).map_err(|e| Error::Configuration {
        name,
        reason: format!("'{value}' is not a valid url: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ScopeType;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn reads_required_and_optional_variables() {
        let config = Config::from_lookup(lookup(&[
            (ENV_CLIENT_ID, "client"),
            (ENV_CLIENT_SECRET, "secret"),
            (ENV_TENANT_ID, "tenant"),
            (ENV_SCOPES, "offline_access,accounting.transactions"),
            (ENV_OAUTH2_URL, "https://example.test/reauthorize"),
            (ENV_API_URL, "http://localhost:9000/api.xro/2.0"),
        ]))
        .unwrap();

        assert_eq!(config.key_pair.client_id(), "client");
        assert_eq!(config.tenant_id, "tenant");
        assert!(config.scopes.contains(ScopeType::OfflineAccess));
        assert_eq!(config.api_url.as_str(), "http://localhost:9000/api.xro/2.0/");
        assert_eq!(config.token_url.as_str(), XERO_TOKEN_URL);
        assert_eq!(config.unitdp, Some(DEFAULT_UNITDP));
        assert_eq!(
            config.authorization_url().as_deref(),
            Some("https://example.test/reauthorize")
        );
    }

    #[test]
    fn missing_tenant_is_a_configuration_error() {
        let result = Config::from_lookup(lookup(&[(ENV_CLIENT_ID, "client"), (ENV_TENANT_ID, " ")]));
        assert!(matches!(
            result,
            Err(Error::Configuration { name: ENV_TENANT_ID, .. })
        ));
    }

    #[test]
    fn builds_authorization_url_from_redirect() {
        let config = Config::from_lookup(lookup(&[
            (ENV_CLIENT_ID, "client"),
            (ENV_TENANT_ID, "tenant"),
            (ENV_REDIRECT_URL, "https://example.test/callback"),
        ]))
        .unwrap();

        let url = config.authorization_url().unwrap();
        assert!(url.starts_with(oauth::XERO_AUTH_URL));
        assert!(url.contains("client_id=client"));
    }
}
