use std::fmt;
use url::Url;
use uuid::Uuid;

use crate::error::{Error, Result};

pub const BASE_URL: &str = "https://api.xero.com/api.xro/2.0/";

/// A typed representation of the accounting API endpoints this crate calls.
///
/// Endpoints are relative; [`XeroEndpoint::to_url`] resolves them against the
/// configured API root so tests can point the client at a mock server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XeroEndpoint {
    Contacts,
    Contact(Uuid),
    Invoices,
    Invoice(Uuid),
    Items,
    Item(Uuid),
    ManualJournals,
    ManualJournal(Uuid),
    Payments,
    Payment(Uuid),
    RepeatingInvoices,
    RepeatingInvoice(Uuid),
    Organisations,
    BalanceSheet,
    TrialBalance,
}

impl XeroEndpoint {
    /// The path relative to the API root.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Contacts => "Contacts".to_string(),
            Self::Contact(id) => format!("Contacts/{id}"),
            Self::Invoices => "Invoices".to_string(),
            Self::Invoice(id) => format!("Invoices/{id}"),
            Self::Items => "Items".to_string(),
            Self::Item(id) => format!("Items/{id}"),
            Self::ManualJournals => "ManualJournals".to_string(),
            Self::ManualJournal(id) => format!("ManualJournals/{id}"),
            Self::Payments => "Payments".to_string(),
            Self::Payment(id) => format!("Payments/{id}"),
            Self::RepeatingInvoices => "RepeatingInvoices".to_string(),
            Self::RepeatingInvoice(id) => format!("RepeatingInvoices/{id}"),
            Self::Organisations => "Organisations".to_string(),
            Self::BalanceSheet => "Reports/BalanceSheet".to_string(),
            Self::TrialBalance => "Reports/TrialBalance".to_string(),
        }
    }

    /// Resolves the endpoint against `base`, which must end in a slash.
    pub fn to_url(&self, base: &Url) -> Result<Url> {
        base.join(&self.path()).map_err(|_| Error::InvalidEndpoint)
    }
}

impl fmt::Display for XeroEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
