use std::sync::Arc;

use crate::client::Client;
use crate::config::Config;
use crate::entities::{Contact, Invoice, Item, ManualJournal, Payment, RepeatingInvoice};
use crate::error::{Error, Result};
use crate::report::{OrganisationsApi, ReportsApi};
use crate::resource::ResourceApi;
use crate::token::{CredentialStore, ReauthorizationNotifier, TokenManager};

/// One tenant's Xero connection: configuration, credential store and client together.
///
/// When no token is stored the adapter still constructs, but every resource accessor
/// returns [`Error::ClientUnavailable`] until a token is saved and the adapter is
/// rebuilt.
///
/// ```ignore
/// let store = Arc::new(FileCredentialStore::new("/var/lib/xero"));
/// let adapter = XeroAdapter::from_env(store).await?;
/// let drafts = adapter
///     .invoices()?
///     .list(&Filter::new().with_where("Status==\"DRAFT\""))
///     .await?;
/// ```
#[derive(Debug)]
pub struct XeroAdapter {
    manager: TokenManager,
    client: Option<Client>,
}

impl XeroAdapter {
    pub async fn connect(config: Config, store: Arc<dyn CredentialStore>) -> Result<Self> {
        Self::from_manager(TokenManager::new(config, store)).await
    }

    pub async fn connect_with_notifier(
        config: Config,
        store: Arc<dyn CredentialStore>,
        notifier: Arc<dyn ReauthorizationNotifier>,
    ) -> Result<Self> {
        Self::from_manager(TokenManager::new(config, store).with_notifier(notifier)).await
    }

    /// Reads [`Config`] from the `XERO_*` environment variables.
    pub async fn from_env(store: Arc<dyn CredentialStore>) -> Result<Self> {
        Self::connect(Config::from_env()?, store).await
    }

    async fn from_manager(manager: TokenManager) -> Result<Self> {
        let client = manager.initialize_client().await?;
        Ok(Self { manager, client })
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }

    pub fn client(&self) -> Result<&Client> {
        self.client.as_ref().ok_or(Error::ClientUnavailable)
    }

    #[must_use]
    pub fn token_manager(&self) -> &TokenManager {
        &self.manager
    }

    pub fn invoices(&self) -> Result<ResourceApi<'_, Invoice>> {
        Ok(self.client()?.invoices())
    }

    pub fn items(&self) -> Result<ResourceApi<'_, Item>> {
        Ok(self.client()?.items())
    }

    pub fn payments(&self) -> Result<ResourceApi<'_, Payment>> {
        Ok(self.client()?.payments())
    }

    pub fn manual_journals(&self) -> Result<ResourceApi<'_, ManualJournal>> {
        Ok(self.client()?.manual_journals())
    }

    pub fn repeating_invoices(&self) -> Result<ResourceApi<'_, RepeatingInvoice>> {
        Ok(self.client()?.repeating_invoices())
    }

    pub fn contacts(&self) -> Result<ResourceApi<'_, Contact>> {
        Ok(self.client()?.contacts())
    }

    pub fn organisations(&self) -> Result<OrganisationsApi<'_>> {
        Ok(self.client()?.organisations())
    }

    pub fn reports(&self) -> Result<ReportsApi<'_>> {
        Ok(self.client()?.reports())
    }
}
